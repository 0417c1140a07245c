//! Configuration validation
//!
//! Rules:
//! - task: sample rate within 1..=30, backoff shorter than poll timeout
//! - sensor: id not empty
//! - source: strictly positive rates, speeds and dimensions
//! - parameters: names not empty

use contracts::{ContractError, LoggerConfig, ReplayConfig, SimulatedVehicleConfig, SourceConfig};
use validator::Validate;

/// Validate a LoggerConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &LoggerConfig) -> Result<(), ContractError> {
    config.task.check()?;
    validate_sensor(config)?;
    validate_source(&config.source)?;
    validate_parameters(config)?;
    Ok(())
}

/// Validate thermometer settings
fn validate_sensor(config: &LoggerConfig) -> Result<(), ContractError> {
    config
        .sensor
        .validate()
        .map_err(|e| ContractError::config_validation("sensor", e.to_string()))
}

/// Validate position source settings
fn validate_source(source: &SourceConfig) -> Result<(), ContractError> {
    match source {
        SourceConfig::Simulated(sim) => validate_simulated(sim),
        SourceConfig::Replay(replay) => validate_replay(replay),
    }
}

fn validate_simulated(sim: &SimulatedVehicleConfig) -> Result<(), ContractError> {
    let fields = [
        ("source.publish_hz", sim.publish_hz),
        ("source.speed_mps", sim.speed_mps),
        ("source.width_m", sim.width_m),
        ("source.height_m", sim.height_m),
        ("source.row_spacing_m", sim.row_spacing_m),
    ];
    for (field, value) in fields {
        if !(value.is_finite() && value > 0.0) {
            return Err(ContractError::config_validation(
                field,
                format!("must be > 0, got {value}"),
            ));
        }
    }
    Ok(())
}

fn validate_replay(replay: &ReplayConfig) -> Result<(), ContractError> {
    if replay.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "source.path",
            "replay path cannot be empty",
        ));
    }
    if !(replay.speed.is_finite() && replay.speed > 0.0) {
        return Err(ContractError::config_validation(
            "source.speed",
            format!("speed must be > 0, got {}", replay.speed),
        ));
    }
    Ok(())
}

/// Validate initial parameter names
fn validate_parameters(config: &LoggerConfig) -> Result<(), ContractError> {
    if config.parameters.keys().any(|name| name.trim().is_empty()) {
        return Err(ContractError::config_validation(
            "parameters",
            "parameter name cannot be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ParamValue, TaskConfig};
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&LoggerConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let config = LoggerConfig {
            task: TaskConfig {
                sample_rate_hz: 31,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("sample_rate_hz"));
    }

    #[test]
    fn test_empty_sensor_id_rejected() {
        let mut config = LoggerConfig::default();
        config.sensor.id.clear();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { ref field, .. } if field == "sensor"));
    }

    #[test]
    fn test_zero_publish_rate_rejected() {
        let config = LoggerConfig {
            source: SourceConfig::Simulated(SimulatedVehicleConfig {
                publish_hz: 0.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("source.publish_hz"));
    }

    #[test]
    fn test_replay_speed_rejected() {
        let config = LoggerConfig {
            source: SourceConfig::Replay(ReplayConfig {
                path: PathBuf::from("track.csv"),
                speed: -1.0,
                loop_playback: false,
            }),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blank_parameter_name_rejected() {
        let mut config = LoggerConfig::default();
        config
            .parameters
            .insert("  ".to_string(), ParamValue::Int(1));
        assert!(validate(&config).is_err());
    }
}
