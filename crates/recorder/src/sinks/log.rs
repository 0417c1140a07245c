//! LogRecordSink - logs records via tracing

use contracts::{ContractError, Record, RecordSink};
use tracing::{info, instrument};

/// Sink that logs every record for debugging
pub struct LogRecordSink {
    name: String,
    records: u64,
}

impl LogRecordSink {
    /// Create a new LogRecordSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: 0,
        }
    }

    pub fn records(&self) -> u64 {
        self.records
    }
}

impl RecordSink for LogRecordSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_append",
        level = "trace",
        skip(self, record),
        fields(sink = %self.name, timestamp = record.timestamp)
    )]
    async fn append(&mut self, record: &Record) -> Result<(), ContractError> {
        self.records += 1;
        info!(
            sink = %self.name,
            timestamp = record.timestamp,
            x = record.x,
            y = record.y,
            ambient_c = record.ambient_c,
            object_c = record.object_c,
            "Record"
        );
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, records = self.records, "LogRecordSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::PositionSample;

    #[tokio::test]
    async fn test_log_sink_append() {
        let mut sink = LogRecordSink::new("test_log");
        let record = Record::assemble(PositionSample::new(1, 0.0, 0.0), Default::default());

        assert!(sink.append(&record).await.is_ok());
        assert_eq!(sink.records(), 1);
        assert!(sink.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogRecordSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
