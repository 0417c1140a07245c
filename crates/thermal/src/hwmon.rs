//! Linux hwmon thermometer
//!
//! The kernel driver exposes each channel as a `temp*_input` attribute holding
//! an integer in millidegrees Celsius.

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{checked_reading, ContractError, SensorConfig, TemperatureChannel, TemperatureSensor};
use tracing::trace;

/// Thermometer backed by two hwmon attribute files
#[derive(Debug, Clone)]
pub struct HwmonThermometer {
    id: String,
    ambient_path: PathBuf,
    object_path: PathBuf,
}

impl HwmonThermometer {
    pub fn new(id: impl Into<String>, ambient_path: PathBuf, object_path: PathBuf) -> Self {
        Self {
            id: id.into(),
            ambient_path,
            object_path,
        }
    }

    pub fn from_config(config: &SensorConfig) -> Self {
        Self::new(
            config.id.clone(),
            config.ambient_path.clone(),
            config.object_path.clone(),
        )
    }

    fn read_channel(&self, channel: TemperatureChannel, path: &Path) -> Result<f64, ContractError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ContractError::sensor_read(&self.id, channel, format!("{}: {e}", path.display()))
        })?;
        let millidegrees: i64 = raw.trim().parse().map_err(|e| {
            ContractError::sensor_read(&self.id, channel, format!("invalid value {:?}: {e}", raw.trim()))
        })?;
        let celsius = millidegrees as f64 / 1000.0;
        trace!(sensor_id = %self.id, %channel, celsius, "hwmon read");
        checked_reading(&self.id, channel, celsius)
    }
}

impl TemperatureSensor for HwmonThermometer {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_ambient(&mut self) -> Result<f64, ContractError> {
        self.read_channel(TemperatureChannel::Ambient, &self.ambient_path)
    }

    fn read_object(&mut self) -> Result<f64, ContractError> {
        self.read_channel(TemperatureChannel::Object, &self.object_path)
    }
}
