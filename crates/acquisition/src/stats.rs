//! Run statistics

use std::time::Duration;

use contracts::TemperatureChannel;
use observability::RunningStats;

/// Counters collected over one `run`
#[derive(Debug, Clone, Default)]
pub struct AcquisitionStats {
    /// Rows appended to the sink
    pub records_written: u64,

    /// Polls that returned without a sample
    pub timeouts: u64,

    /// Polls that failed
    pub poll_errors: u64,

    pub ambient_failures: u64,
    pub object_failures: u64,

    /// Rows the sink refused
    pub sink_write_failures: u64,

    /// Parameter snapshots applied after start-up
    pub parameter_updates: u64,

    /// Loop iterations, one per poll
    pub iterations: u64,

    pub duration: Duration,

    /// Successful ambient readings (°C)
    pub ambient: RunningStats,

    /// Successful object readings (°C)
    pub object: RunningStats,
}

impl AcquisitionStats {
    pub(crate) fn record_sensor_failure(&mut self, channel: TemperatureChannel) {
        match channel {
            TemperatureChannel::Ambient => self.ambient_failures += 1,
            TemperatureChannel::Object => self.object_failures += 1,
        }
    }

    pub fn sensor_failures(&self) -> u64 {
        self.ambient_failures + self.object_failures
    }

    /// Records per second over the whole run
    pub fn record_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.records_written as f64 / secs
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════╗");
        println!("║            Acquisition Statistics            ║");
        println!("╚══════════════════════════════════════════════╝\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Polls: {}", self.iterations);
        println!("   ├─ Records written: {}", self.records_written);
        println!("   └─ Rate: {:.2} records/s", self.record_rate());

        println!("\nFailures");
        println!("   ├─ Poll timeouts: {}", self.timeouts);
        println!("   ├─ Poll errors: {}", self.poll_errors);
        println!("   ├─ Ambient read failures: {}", self.ambient_failures);
        println!("   ├─ Object read failures: {}", self.object_failures);
        println!("   └─ Sink write failures: {}", self.sink_write_failures);

        println!("\nTemperatures (°C)");
        println!("   ├─ Ambient: {}", self.ambient.summary());
        println!("   └─ Object: {}", self.object.summary());

        if self.parameter_updates > 0 {
            println!("\nParameter updates applied: {}", self.parameter_updates);
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_failures_by_channel() {
        let mut stats = AcquisitionStats::default();
        stats.record_sensor_failure(TemperatureChannel::Object);
        stats.record_sensor_failure(TemperatureChannel::Object);
        stats.record_sensor_failure(TemperatureChannel::Ambient);

        assert_eq!(stats.ambient_failures, 1);
        assert_eq!(stats.object_failures, 2);
        assert_eq!(stats.sensor_failures(), 3);
    }

    #[test]
    fn test_record_rate() {
        let stats = AcquisitionStats {
            records_written: 10,
            duration: Duration::from_secs(5),
            ..Default::default()
        };
        assert!((stats.record_rate() - 2.0).abs() < 1e-9);
        assert_eq!(AcquisitionStats::default().record_rate(), 0.0);
    }
}
