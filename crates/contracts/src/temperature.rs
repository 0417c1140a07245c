//! TemperatureSensor trait and TemperatureSample
//!
//! The thermometer driver is an opaque capability: each read returns a finite
//! reading in degrees Celsius or fails. No retries happen below the caller.

use serde::{Deserialize, Serialize};

use crate::{ContractError, TemperatureChannel};

/// Infrared thermometer
pub trait TemperatureSensor: Send {
    /// Sensor ID (used for logging/metrics)
    fn id(&self) -> &str;

    /// Die/ambient temperature (°C)
    fn read_ambient(&mut self) -> Result<f64, ContractError>;

    /// Target/object temperature (°C)
    fn read_object(&mut self) -> Result<f64, ContractError>;
}

impl<T: TemperatureSensor + ?Sized> TemperatureSensor for Box<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn read_ambient(&mut self) -> Result<f64, ContractError> {
        (**self).read_ambient()
    }

    fn read_object(&mut self) -> Result<f64, ContractError> {
        (**self).read_object()
    }
}

/// Reject NaN and infinities so they never pass as a valid reading
pub fn checked_reading(
    sensor_id: &str,
    channel: TemperatureChannel,
    value: f64,
) -> Result<f64, ContractError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ContractError::sensor_read(
            sensor_id,
            channel,
            format!("non-finite reading {value}"),
        ))
    }
}

/// One pair of temperature reads
///
/// Each field is `None` when its read failed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureSample {
    pub ambient_c: Option<f64>,
    pub object_c: Option<f64>,
}

impl TemperatureSample {
    /// Read both channels independently
    ///
    /// A failure on one channel does not prevent reading the other.
    pub fn read_from<S: TemperatureSensor + ?Sized>(sensor: &mut S) -> Self {
        Self {
            ambient_c: finite(sensor.read_ambient()),
            object_c: finite(sensor.read_object()),
        }
    }

    /// Channels that produced no reading
    pub fn failed_channels(&self) -> impl Iterator<Item = TemperatureChannel> {
        let ambient = self.ambient_c.is_none().then_some(TemperatureChannel::Ambient);
        let object = self.object_c.is_none().then_some(TemperatureChannel::Object);
        ambient.into_iter().chain(object)
    }
}

fn finite(reading: Result<f64, ContractError>) -> Option<f64> {
    reading.ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky {
        ambient: Result<f64, ()>,
        object: Result<f64, ()>,
    }

    impl TemperatureSensor for Flaky {
        fn id(&self) -> &str {
            "flaky"
        }

        fn read_ambient(&mut self) -> Result<f64, ContractError> {
            self.ambient.map_err(|_| {
                ContractError::sensor_read("flaky", TemperatureChannel::Ambient, "bus error")
            })
        }

        fn read_object(&mut self) -> Result<f64, ContractError> {
            self.object.map_err(|_| {
                ContractError::sensor_read("flaky", TemperatureChannel::Object, "bus error")
            })
        }
    }

    #[test]
    fn test_one_channel_failure_keeps_other() {
        let mut sensor = Flaky {
            ambient: Err(()),
            object: Ok(31.5),
        };
        let sample = TemperatureSample::read_from(&mut sensor);
        assert_eq!(sample.ambient_c, None);
        assert_eq!(sample.object_c, Some(31.5));
        let failed: Vec<_> = sample.failed_channels().collect();
        assert_eq!(failed, vec![TemperatureChannel::Ambient]);
    }

    #[test]
    fn test_nan_is_not_a_reading() {
        let mut sensor = Flaky {
            ambient: Ok(f64::NAN),
            object: Ok(f64::INFINITY),
        };
        let sample = TemperatureSample::read_from(&mut sensor);
        assert_eq!(sample, TemperatureSample::default());
    }

    #[test]
    fn test_checked_reading() {
        assert_eq!(
            checked_reading("ir0", TemperatureChannel::Ambient, 21.0).unwrap(),
            21.0
        );
        assert!(checked_reading("ir0", TemperatureChannel::Ambient, f64::NAN).is_err());
    }
}
