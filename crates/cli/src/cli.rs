//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use contracts::{MAX_SAMPLE_RATE_HZ, MIN_SAMPLE_RATE_HZ};

/// Thermal Logger - vehicle position and infrared temperature logger
#[derive(Parser, Debug)]
#[command(
    name = "thermal-logger",
    author,
    version,
    about = "Vehicle position and infrared temperature logger",
    long_about = "Waits for vehicle local position updates, pairs each one with an \n\
                  ambient and object temperature reading and appends the result \n\
                  to a CSV file."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "THERMAL_LOGGER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "THERMAL_LOGGER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start logging
    Start(StartArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `start` command
#[derive(Parser, Debug, Clone, Default)]
pub struct StartArgs {
    /// Configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "THERMAL_LOGGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file name inside the data directory
    #[arg(short, long, env = "THERMAL_LOGGER_NAME")]
    pub name: Option<String>,

    /// Directory holding output files
    #[arg(long, env = "THERMAL_LOGGER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Position update frequency in Hz
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_SAMPLE_RATE_HZ)..=i64::from(MAX_SAMPLE_RATE_HZ)),
        env = "THERMAL_LOGGER_FREQUENCY"
    )]
    pub frequency: Option<u32>,

    /// Echo every record to the console
    #[arg(short = 'l', long = "log")]
    pub log: bool,

    /// Use dummy values instead of the thermometer
    #[arg(short, long)]
    pub dummy: bool,

    /// Replay positions from a recorded CSV file instead of the configured source
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = original pace)
    #[arg(long, default_value = "1.0", requires = "replay")]
    pub replay_speed: f64,

    /// Restart the replay when the file ends
    #[arg(long, requires = "replay")]
    pub replay_loop: bool,

    /// Stop after this many seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "THERMAL_LOGGER_DURATION")]
    pub duration: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "THERMAL_LOGGER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_flags() {
        let cli = Cli::try_parse_from([
            "thermal-logger",
            "start",
            "-n",
            "survey.txt",
            "-f",
            "10",
            "-l",
            "-d",
        ])
        .unwrap();

        let Commands::Start(args) = cli.command else {
            panic!("expected start");
        };
        assert_eq!(args.name.as_deref(), Some("survey.txt"));
        assert_eq!(args.frequency, Some(10));
        assert!(args.log);
        assert!(args.dummy);
        assert_eq!(args.duration, 0);
    }

    #[test]
    fn test_frequency_out_of_range() {
        for freq in ["0", "31"] {
            assert!(Cli::try_parse_from(["thermal-logger", "start", "-f", freq]).is_err());
        }
    }

    #[test]
    fn test_unknown_command_is_usage_error() {
        let err = Cli::try_parse_from(["thermal-logger", "frobnicate"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn test_replay_options_require_replay() {
        assert!(Cli::try_parse_from(["thermal-logger", "start", "--replay-loop"]).is_err());
    }
}
