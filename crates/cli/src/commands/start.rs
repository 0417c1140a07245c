//! `start` command implementation.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use contracts::{LoggerConfig, ReplayConfig, SourceConfig};

use crate::cli::StartArgs;
use crate::session::{Session, SessionConfig};

/// Directory used when neither `--data-dir` nor a config destination is given
pub const DEFAULT_DATA_DIR: &str = "data";

/// File name used when `--name` is omitted
pub const DEFAULT_FILE_NAME: &str = "out.txt";

/// Execute the `start` command
pub async fn run_start(args: &StartArgs) -> Result<()> {
    let logger = resolve_config(args)?;

    print_startup(&logger);

    let session = Session::new(SessionConfig {
        logger,
        duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    tokio::spawn(cancel_on_shutdown_signal(session.cancel_token()));

    info!("Starting acquisition...");
    let stats = session.run().await?;

    info!(
        records = stats.records_written,
        duration_secs = stats.duration.as_secs_f64(),
        rate = format!("{:.2}", stats.record_rate()),
        "Logging completed"
    );
    stats.print_summary();

    Ok(())
}

/// Merge the optional config file with command-line overrides
pub fn resolve_config(args: &StartArgs) -> Result<LoggerConfig> {
    let mut logger = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => LoggerConfig::default(),
    };

    if args.name.is_some() || args.data_dir.is_some() {
        logger.task.destination = destination(args);
    }
    if let Some(frequency) = args.frequency {
        logger.task.sample_rate_hz = frequency;
    }
    if args.log {
        logger.task.verbose = true;
    }
    if args.dummy {
        logger.task.simulate = true;
    }
    if let Some(path) = &args.replay {
        logger.source = SourceConfig::Replay(ReplayConfig {
            path: path.clone(),
            speed: args.replay_speed,
            loop_playback: args.replay_loop,
        });
    }

    config_loader::ConfigLoader::validate(&logger).context("Invalid configuration")?;
    Ok(logger)
}

fn destination(args: &StartArgs) -> PathBuf {
    let dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    dir.join(args.name.as_deref().unwrap_or(DEFAULT_FILE_NAME))
}

fn print_startup(logger: &LoggerConfig) {
    println!("Data file: {}", logger.task.destination.display());
    println!("Logging: {}", if logger.task.verbose { "on" } else { "off" });
    println!("Frequency: {} Hz", logger.task.sample_rate_hz);
    if logger.task.simulate {
        println!("Using dummy values");
    }
}

/// Cancel `cancel` on Ctrl+C or SIGTERM
async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, stopping acquisition...");
    cancel.cancel();
}
