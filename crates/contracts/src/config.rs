//! LoggerConfig - Config Loader output
//!
//! Describes the complete logger configuration: the acquisition task, the
//! position source, the thermometer and the initial runtime parameters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::ContractError;

/// Lowest accepted sample rate (Hz)
pub const MIN_SAMPLE_RATE_HZ: u32 = 1;

/// Highest accepted sample rate (Hz)
pub const MAX_SAMPLE_RATE_HZ: u32 = 30;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete logger configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoggerConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Acquisition task settings
    #[serde(default)]
    #[validate(nested)]
    pub task: TaskConfig,

    /// Where position samples come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Thermometer settings
    #[serde(default)]
    #[validate(nested)]
    pub sensor: SensorConfig,

    /// Initial runtime parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

/// Acquisition task configuration
///
/// Immutable once the task is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TaskConfig {
    /// Output file
    pub destination: PathBuf,

    /// Requested position update rate (Hz)
    #[validate(range(min = 1, max = 30))]
    pub sample_rate_hz: u32,

    /// Echo every record to the console
    pub verbose: bool,

    /// Use simulated backends
    pub simulate: bool,

    /// Bounded wait of one poll (ms)
    #[validate(range(min = 1))]
    pub poll_timeout_ms: u64,

    /// Pause after a poll error (ms), shorter than the poll timeout
    pub poll_error_backoff_ms: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("data/out.txt"),
            sample_rate_hz: 2,
            verbose: false,
            simulate: false,
            poll_timeout_ms: 1000,
            poll_error_backoff_ms: 50,
        }
    }
}

impl TaskConfig {
    /// Subscriber interval hint: `1000 / sample_rate_hz` milliseconds
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.sample_rate_hz.max(1)))
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn poll_error_backoff(&self) -> Duration {
        Duration::from_millis(self.poll_error_backoff_ms)
    }

    /// Validate field ranges and cross-field rules
    ///
    /// # Errors
    /// Returns the first violated rule as `ConfigValidation`.
    pub fn check(&self) -> Result<(), ContractError> {
        if !(MIN_SAMPLE_RATE_HZ..=MAX_SAMPLE_RATE_HZ).contains(&self.sample_rate_hz) {
            return Err(ContractError::config_validation(
                "task.sample_rate_hz",
                format!(
                    "sample_rate_hz must be within {MIN_SAMPLE_RATE_HZ}..={MAX_SAMPLE_RATE_HZ}, got {}",
                    self.sample_rate_hz
                ),
            ));
        }

        self.validate()
            .map_err(|e| ContractError::config_validation("task", e.to_string()))?;

        if self.destination.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                "task.destination",
                "destination cannot be empty",
            ));
        }

        if self.poll_error_backoff_ms >= self.poll_timeout_ms {
            return Err(ContractError::config_validation(
                "task.poll_error_backoff_ms",
                format!(
                    "poll_error_backoff_ms ({}) must be < poll_timeout_ms ({})",
                    self.poll_error_backoff_ms, self.poll_timeout_ms
                ),
            ));
        }

        Ok(())
    }
}

/// Position source selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Lawnmower survey pattern generated in-process
    Simulated(SimulatedVehicleConfig),

    /// Positions replayed from a previously recorded CSV file
    Replay(ReplayConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Simulated(SimulatedVehicleConfig::default())
    }
}

/// Simulated vehicle settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedVehicleConfig {
    /// Publish rate (Hz)
    pub publish_hz: f64,
    /// Ground speed (m/s)
    pub speed_mps: f64,
    /// Survey area width along x (m)
    pub width_m: f64,
    /// Survey area height along y (m)
    pub height_m: f64,
    /// Distance between two passes (m)
    pub row_spacing_m: f64,
}

impl Default for SimulatedVehicleConfig {
    fn default() -> Self {
        Self {
            publish_hz: 50.0,
            speed_mps: 5.0,
            width_m: 400.0,
            height_m: 400.0,
            row_spacing_m: 20.0,
        }
    }
}

/// Track replay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Recorded CSV file (`time,x,y[,...]`)
    pub path: PathBuf,

    /// Speed multiplier (1.0 = original pace)
    #[serde(default = "default_replay_speed")]
    pub speed: f64,

    /// Restart from the first row when the file ends
    #[serde(default)]
    pub loop_playback: bool,
}

fn default_replay_speed() -> f64 {
    1.0
}

/// Thermometer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SensorConfig {
    /// Sensor ID
    #[validate(length(min = 1))]
    pub id: String,

    /// hwmon file holding the ambient temperature (millidegrees)
    pub ambient_path: PathBuf,

    /// hwmon file holding the object temperature (millidegrees)
    pub object_path: PathBuf,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            id: "ir0".to_string(),
            ambient_path: PathBuf::from("/sys/class/hwmon/hwmon0/temp1_input"),
            object_path: PathBuf::from("/sys/class/hwmon/hwmon0/temp2_input"),
        }
    }
}

/// Runtime-tunable parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}
