//! Simulated Survey Example
//!
//! Runs the logger for a few seconds against the simulated vehicle and
//! thermometer, then prints the run statistics.
//!
//! Run with: cargo run -p demos --bin simulated_survey [config.toml]

use std::time::Duration;

use acquisition::AcquisitionTask;
use config_loader::ConfigLoader;
use contracts::{LoggerConfig, SourceConfig};
use ingestion::{PositionTopic, SimulatedVehicle, VEHICLE_POSITION_TOPIC};
use observability::ObservabilityConfig;
use params::ParameterStore;
use thermal::SimulatedThermometer;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig::default())?;

    tracing::info!("Starting simulated survey demo");

    let config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading logger config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        let mut config = LoggerConfig::default();
        config.task.destination = "data/demo.txt".into();
        config.task.sample_rate_hz = 5;
        config.task.verbose = true;
        config
    };

    let SourceConfig::Simulated(vehicle) = config.source.clone() else {
        return Err("this demo only drives the simulated source".into());
    };

    let params = ParameterStore::with_values(config.parameters.clone());
    let topic = PositionTopic::new(VEHICLE_POSITION_TOPIC);
    let mut task = AcquisitionTask::open(
        config.task.clone(),
        topic.subscribe(),
        SimulatedThermometer::with_defaults(&config.sensor.id),
        params.subscribe(),
    )?;

    let cancel = CancellationToken::new();
    let publisher = SimulatedVehicle::new(topic, vehicle).spawn(cancel.clone());

    // Nudge a parameter halfway through to show it reaching the task
    let tuner = {
        let params = params.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            params.set("emissivity", 0.9);
            tokio::time::sleep(Duration::from_secs(2)).await;
            cancel.cancel();
        })
    };

    let stats = task.run(cancel).await?;
    tuner.await?;
    publisher.await?;

    tracing::info!(
        records = stats.records_written,
        destination = %config.task.destination.display(),
        "Demo finished"
    );
    stats.print_summary();

    Ok(())
}
