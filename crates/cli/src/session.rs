//! Session - wires the position publisher, thermometer and acquisition task.

use std::time::Duration;

use acquisition::{AcquisitionStats, AcquisitionTask};
use anyhow::{Context, Result};
use contracts::{LoggerConfig, SourceConfig, TemperatureSensor};
use ingestion::{PositionTopic, SimulatedVehicle, TrackReplay, VEHICLE_POSITION_TOPIC};
use params::ParameterStore;
use thermal::{HwmonThermometer, SimulatedThermometer};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Resolved logger configuration
    pub logger: LoggerConfig,

    /// Stop after this long (None = until interrupted)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// One logging session from start-up to the final summary
pub struct Session {
    config: SessionConfig,
    params: ParameterStore,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let params = ParameterStore::with_values(config.logger.parameters.clone());
        Self {
            config,
            params,
            cancel: CancellationToken::new(),
        }
    }

    #[cfg(test)]
    fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    /// Token that stops the session when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until cancelled, the duration elapses or the publisher ends
    ///
    /// A destination that cannot be opened aborts before anything is
    /// published.
    pub async fn run(self) -> Result<AcquisitionStats> {
        let logger = &self.config.logger;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics(port)?;
        }

        let topic = PositionTopic::new(VEHICLE_POSITION_TOPIC);
        let sensor = build_sensor(logger);

        let mut task = AcquisitionTask::open(
            logger.task.clone(),
            topic.subscribe(),
            sensor,
            self.params.subscribe(),
        )
        .with_context(|| {
            format!(
                "Failed to start logging to {}",
                logger.task.destination.display()
            )
        })?;

        let publisher = spawn_publisher(&logger.source, topic, self.cancel.clone())?;
        let watcher = spawn_publisher_watcher(publisher, self.cancel.clone());

        if let Some(duration) = self.config.duration {
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(duration) => {
                        info!(secs = duration.as_secs(), "Duration elapsed, stopping");
                        cancel.cancel();
                    }
                }
            });
        }

        let result = task.run(self.cancel.clone()).await;

        self.cancel.cancel();
        if let Err(e) = watcher.await {
            warn!(error = %e, "Position publisher did not shut down cleanly");
        }

        result.context("Acquisition failed")
    }
}

/// Simulated thermometer in dummy mode, kernel hwmon otherwise
fn build_sensor(logger: &LoggerConfig) -> Box<dyn TemperatureSensor> {
    if logger.task.simulate {
        info!(sensor_id = %logger.sensor.id, "Using simulated thermometer");
        Box::new(SimulatedThermometer::with_defaults(&logger.sensor.id))
    } else {
        info!(
            sensor_id = %logger.sensor.id,
            ambient = %logger.sensor.ambient_path.display(),
            object = %logger.sensor.object_path.display(),
            "Using hwmon thermometer"
        );
        Box::new(HwmonThermometer::from_config(&logger.sensor))
    }
}

fn spawn_publisher(
    source: &SourceConfig,
    topic: PositionTopic,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>> {
    match source {
        SourceConfig::Simulated(vehicle) => {
            info!(
                width_m = vehicle.width_m,
                height_m = vehicle.height_m,
                row_spacing_m = vehicle.row_spacing_m,
                "Publishing simulated lawnmower survey"
            );
            Ok(SimulatedVehicle::new(topic, vehicle.clone()).spawn(cancel))
        }
        SourceConfig::Replay(replay) => {
            let track = TrackReplay::from_config(replay).with_context(|| {
                format!("Failed to load replay track {}", replay.path.display())
            })?;
            info!(
                path = %replay.path.display(),
                samples = track.len(),
                speed = replay.speed,
                loop_playback = replay.loop_playback,
                "Replaying recorded track"
            );
            Ok(track.spawn(topic, cancel))
        }
    }
}

/// Stop the session once the publisher is gone
fn spawn_publisher_watcher(publisher: JoinHandle<()>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = publisher.await {
            warn!(error = %e, "Position publisher panicked");
        }
        if !cancel.is_cancelled() {
            info!("Position publisher finished, stopping");
            cancel.cancel();
        }
    })
}
