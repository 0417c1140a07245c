//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{LoggerConfig, SourceConfig};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    destination: String,
    sample_rate_hz: u32,
    interval_ms: u64,
    source: String,
    sensor_id: String,
    simulate: bool,
    parameter_count: usize,
}

impl From<&LoggerConfig> for ConfigSummary {
    fn from(config: &LoggerConfig) -> Self {
        let source = match &config.source {
            SourceConfig::Simulated(_) => "simulated".to_string(),
            SourceConfig::Replay(replay) => format!("replay ({})", replay.path.display()),
        };
        Self {
            version: format!("{:?}", config.version),
            destination: config.task.destination.display().to_string(),
            sample_rate_hz: config.task.sample_rate_hz,
            interval_ms: config.task.update_interval().as_millis() as u64,
            source,
            sensor_id: config.sensor.id.clone(),
            simulate: config.task.simulate,
            parameter_count: config.parameters.len(),
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary::from(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Non-fatal issues
fn collect_warnings(config: &LoggerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.task.simulate {
        warnings.push("task.simulate is set - temperatures are dummy values".to_string());
    } else {
        for path in [&config.sensor.ambient_path, &config.sensor.object_path] {
            if !path.exists() {
                warnings.push(format!(
                    "Sensor file {} does not exist - readings will be written as 0.0",
                    path.display()
                ));
            }
        }
    }

    if let SourceConfig::Replay(replay) = &config.source {
        if !replay.path.exists() {
            warnings.push(format!(
                "Replay track {} does not exist",
                replay.path.display()
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Destination: {}", summary.destination);
            println!(
                "  Frequency: {} Hz ({} ms interval)",
                summary.sample_rate_hz, summary.interval_ms
            );
            println!("  Source: {}", summary.source);
            println!("  Sensor: {}", summary.sensor_id);
            println!("  Parameters: {}", summary.parameter_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
