//! Acquisition metrics
//!
//! Prometheus counters for the acquisition loop, plus an in-memory running
//! statistics helper used for end-of-run summaries.

use metrics::{counter, gauge, histogram};

/// Record a row appended to the sink
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_record_written;
///
/// sink.append(&record).await?;
/// record_record_written(record.timestamp);
/// ```
pub fn record_record_written(timestamp: u64) {
    counter!("thermal_logger_records_total").increment(1);
    gauge!("thermal_logger_last_sample_timestamp").set(timestamp as f64);
}

/// Record a poll that returned without data
pub fn record_poll_timeout() {
    counter!("thermal_logger_poll_timeouts_total").increment(1);
}

/// Record a failed poll
pub fn record_poll_error(topic: &str) {
    counter!(
        "thermal_logger_poll_errors_total",
        "topic" => topic.to_string()
    )
    .increment(1);
}

/// Record a failed temperature read
pub fn record_sensor_failure(sensor_id: &str, channel: &str) {
    counter!(
        "thermal_logger_sensor_failures_total",
        "sensor_id" => sensor_id.to_string(),
        "channel" => channel.to_string()
    )
    .increment(1);
}

/// Record a row that could not be appended
pub fn record_sink_write_failure(sink_name: &str) {
    counter!(
        "thermal_logger_sink_write_failures_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Record an applied parameter update
pub fn record_parameter_update(version: u64) {
    counter!("thermal_logger_parameter_updates_total").increment(1);
    gauge!("thermal_logger_parameter_version").set(version as f64);
}

/// Record a successful temperature read
pub fn record_temperature(channel: &str, celsius: f64) {
    histogram!(
        "thermal_logger_temperature_celsius",
        "channel" => channel.to_string()
    )
    .record(celsius);
}

/// Summary of a `RunningStats`
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}
