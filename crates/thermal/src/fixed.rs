//! Static thermometer with fixed readings or fixed failures

use contracts::{ContractError, TemperatureChannel, TemperatureSensor};

/// Thermometer returning the same values on every read
///
/// A `None` channel fails on every read.
#[derive(Debug, Clone)]
pub struct StaticThermometer {
    id: String,
    ambient_c: Option<f64>,
    object_c: Option<f64>,
    reads: usize,
}

impl StaticThermometer {
    pub fn new(ambient_c: Option<f64>, object_c: Option<f64>) -> Self {
        Self {
            id: "static".to_string(),
            ambient_c,
            object_c,
            reads: 0,
        }
    }

    /// Both channels succeed
    pub fn reading(ambient_c: f64, object_c: f64) -> Self {
        Self::new(Some(ambient_c), Some(object_c))
    }

    /// Both channels fail
    pub fn failing() -> Self {
        Self::new(None, None)
    }

    /// Total number of channel reads performed
    pub fn reads(&self) -> usize {
        self.reads
    }

    fn read(&mut self, channel: TemperatureChannel, value: Option<f64>) -> Result<f64, ContractError> {
        self.reads += 1;
        value.ok_or_else(|| ContractError::sensor_read(&self.id, channel, "no acknowledge"))
    }
}

impl TemperatureSensor for StaticThermometer {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_ambient(&mut self) -> Result<f64, ContractError> {
        self.read(TemperatureChannel::Ambient, self.ambient_c)
    }

    fn read_object(&mut self) -> Result<f64, ContractError> {
        self.read(TemperatureChannel::Object, self.object_c)
    }
}
