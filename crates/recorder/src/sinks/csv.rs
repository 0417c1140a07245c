//! CsvRecordSink - writes records as comma-separated rows

use contracts::{ContractError, Record, RecordSink, RECORD_HEADER};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

/// Format one data row: position with 8 decimals, temperatures with 4
pub fn format_row(record: &Record) -> String {
    format!(
        "{},{:.8},{:.8},{:.4},{:.4}",
        record.timestamp, record.x, record.y, record.ambient_c, record.object_c
    )
}

/// Sink that appends rows to a CSV file
///
/// Every row is flushed as soon as it is appended.
pub struct CsvRecordSink {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    rows: u64,
}

impl CsvRecordSink {
    /// Create or truncate `path` and write the header row
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// Returns `SinkOpen` when the destination cannot be written.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, ContractError> {
        let name = name.into();
        let path = path.into();

        let writer = Self::create_with_header(&path).map_err(|e| {
            error!(sink = %name, path = %path.display(), error = %e, "Open failed");
            ContractError::sink_open(&name, path.display().to_string(), e.to_string())
        })?;

        info!(sink = %name, path = %path.display(), "CsvRecordSink opened");

        Ok(Self {
            name,
            path,
            writer: Some(writer),
            rows: 0,
        })
    }

    fn create_with_header(path: &Path) -> std::io::Result<BufWriter<File>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{RECORD_HEADER}")?;
        writer.flush()?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows appended so far (header excluded)
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    fn write_row(&mut self, record: &Record) -> Result<(), ContractError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(ContractError::SinkClosed {
                sink_name: self.name.clone(),
            });
        };

        writeln!(writer, "{}", format_row(record))
            .and_then(|_| writer.flush())
            .map_err(|e| {
                error!(sink = %self.name, timestamp = record.timestamp, error = %e, "Write failed");
                ContractError::sink_write(&self.name, e.to_string())
            })?;

        self.rows += 1;
        Ok(())
    }
}

impl RecordSink for CsvRecordSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_append",
        level = "trace",
        skip(self, record),
        fields(sink = %self.name, timestamp = record.timestamp)
    )]
    async fn append(&mut self, record: &Record) -> Result<(), ContractError> {
        self.write_row(record)
    }

    #[instrument(name = "csv_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "csv_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        let file = writer
            .into_inner()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        file.sync_all()?;

        debug!(sink = %self.name, rows = self.rows, "CsvRecordSink closed");
        Ok(())
    }
}
