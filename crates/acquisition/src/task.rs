//! AcquisitionTask - poll, read, assemble, append

use std::time::Instant;

use contracts::{
    PollOutcome, PositionSample, PositionSource, Record, RecordSink, TaskConfig,
    TemperatureSample, TemperatureSensor,
};
use observability::metrics;
use params::{ParameterSnapshot, ParameterSubscription};
use recorder::CsvRecordSink;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{AcquisitionError, AcquisitionStats, Result, TaskState};

/// Name given to the CSV sink opened by `AcquisitionTask::open`
pub const CSV_SINK_NAME: &str = "csv";

/// Console echo of one record
pub fn console_line(record: &Record) -> String {
    format!(
        "Time: {}, X: {:.8}, Y: {:.8}, Ambient Temp: {:.4}, Obj Temp: {:.4}",
        record.timestamp, record.x, record.y, record.ambient_c, record.object_c
    )
}

/// Periodic position + temperature logger
///
/// Owns its position subscription, thermometer and sink exclusively. The
/// only suspension points of `run` are the bounded poll and the back-off
/// after a failed poll.
pub struct AcquisitionTask<P, T, S = CsvRecordSink> {
    config: TaskConfig,
    source: P,
    sensor: T,
    sink: S,
    params: ParameterSubscription,
    state: TaskState,
}

impl<P, T> AcquisitionTask<P, T, CsvRecordSink>
where
    P: PositionSource,
    T: TemperatureSensor,
{
    /// Open `config.destination` and prepare the task
    ///
    /// # Errors
    /// `InvalidConfig` when the settings are out of range, `SinkOpen` when
    /// the destination cannot be created. No task exists in either case.
    pub fn open(
        config: TaskConfig,
        source: P,
        sensor: T,
        params: ParameterSubscription,
    ) -> Result<Self> {
        config.check().map_err(AcquisitionError::InvalidConfig)?;

        let sink = CsvRecordSink::open(CSV_SINK_NAME, &config.destination)
            .map_err(AcquisitionError::SinkOpen)?;

        Ok(Self::assemble(config, source, sensor, sink, params))
    }
}

impl<P, T, S> AcquisitionTask<P, T, S>
where
    P: PositionSource,
    T: TemperatureSensor,
    S: RecordSink,
{
    /// Prepare the task around an already opened sink
    pub fn with_sink(
        config: TaskConfig,
        source: P,
        sensor: T,
        sink: S,
        params: ParameterSubscription,
    ) -> Result<Self> {
        config.check().map_err(AcquisitionError::InvalidConfig)?;
        Ok(Self::assemble(config, source, sensor, sink, params))
    }

    fn assemble(
        config: TaskConfig,
        mut source: P,
        sensor: T,
        sink: S,
        params: ParameterSubscription,
    ) -> Self {
        let interval = config.update_interval();
        source.set_interval(interval);

        info!(
            topic = source.topic(),
            sensor_id = sensor.id(),
            sink = sink.name(),
            sample_rate_hz = config.sample_rate_hz,
            interval_ms = interval.as_millis() as u64,
            "Acquisition task ready"
        );

        let mut task = Self {
            config,
            source,
            sensor,
            sink,
            params,
            state: TaskState::Constructed,
        };
        task.state = TaskState::Running;
        task
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Parameters as last applied by the loop
    pub fn parameters(&self) -> &ParameterSnapshot {
        self.params.current()
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn sensor(&self) -> &T {
        &self.sensor
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run the acquisition loop until `cancel` fires
    ///
    /// Cancellation is observed at the top of every iteration, so the
    /// iteration in progress always completes. The sink is closed and the
    /// subscription detached before returning.
    ///
    /// # Errors
    /// `InvalidState` unless the task is `Running`; a sink close failure
    /// after the loop has stopped.
    #[instrument(
        name = "acquisition_run",
        skip_all,
        fields(topic = self.source.topic(), sink = self.sink.name())
    )]
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<AcquisitionStats> {
        if self.state != TaskState::Running {
            return Err(AcquisitionError::InvalidState { state: self.state });
        }

        let started = Instant::now();
        let mut stats = AcquisitionStats::default();
        let poll_timeout = self.config.poll_timeout();
        let backoff = self.config.poll_error_backoff();

        self.params.force_apply();
        info!(
            parameters_version = self.params.current().version,
            "Acquisition started"
        );

        while !cancel.is_cancelled() {
            stats.iterations += 1;

            match self.source.poll(poll_timeout).await {
                PollOutcome::Ready(position) => self.acquire(position, &mut stats).await,
                PollOutcome::TimedOut => {
                    stats.timeouts += 1;
                    metrics::record_poll_timeout();
                    trace!("No position update within timeout");
                }
                PollOutcome::Failed(e) => {
                    stats.poll_errors += 1;
                    metrics::record_poll_error(self.source.topic());
                    warn!(error = %e, backoff_ms = backoff.as_millis() as u64, "Position poll failed");

                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(backoff) => {}
                    }
                    continue;
                }
            }

            if self.params.apply_updates() {
                let version = self.params.current().version;
                stats.parameter_updates += 1;
                metrics::record_parameter_update(version);
                debug!(version, "Parameter update applied");
            }
        }

        self.state = TaskState::Stopping;
        let closed = self.shutdown().await;
        stats.duration = started.elapsed();
        self.state = TaskState::Stopped;

        info!(
            records = stats.records_written,
            polls = stats.iterations,
            timeouts = stats.timeouts,
            poll_errors = stats.poll_errors,
            sensor_failures = stats.sensor_failures(),
            sink_write_failures = stats.sink_write_failures,
            duration_secs = stats.duration.as_secs_f64(),
            "Acquisition stopped"
        );

        closed?;
        Ok(stats)
    }

    async fn acquire(&mut self, position: PositionSample, stats: &mut AcquisitionStats) {
        let temperature = TemperatureSample::read_from(&mut self.sensor);

        for channel in temperature.failed_channels() {
            stats.record_sensor_failure(channel);
            metrics::record_sensor_failure(self.sensor.id(), channel.as_str());
            debug!(
                sensor_id = self.sensor.id(),
                channel = %channel,
                timestamp = position.timestamp,
                "Temperature read failed, writing sentinel"
            );
        }
        if let Some(celsius) = temperature.ambient_c {
            stats.ambient.push(celsius);
            metrics::record_temperature("ambient", celsius);
        }
        if let Some(celsius) = temperature.object_c {
            stats.object.push(celsius);
            metrics::record_temperature("object", celsius);
        }

        let record = Record::assemble(position, temperature);

        match self.sink.append(&record).await {
            Ok(()) => {
                stats.records_written += 1;
                metrics::record_record_written(record.timestamp);
            }
            Err(e) => {
                stats.sink_write_failures += 1;
                metrics::record_sink_write_failure(self.sink.name());
                warn!(error = %e, timestamp = record.timestamp, "Record dropped");
            }
        }

        if self.config.verbose {
            println!("{}", console_line(&record));
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        let flushed = self.sink.flush().await;
        let closed = self.sink.close().await;
        self.source.detach();

        if let Err(e) = flushed.and(closed) {
            error!(sink = self.sink.name(), error = %e, "Failed to close record sink");
            return Err(e.into());
        }
        Ok(())
    }
}
