//! # Recorder
//!
//! Record sink module.
//!
//! Responsibilities:
//! - Append acquisition records to a CSV file with a fixed header
//! - Guarantee that a clean close leaves every appended row on disk
//! - Mirror records to the tracing output for debugging

pub mod sinks;

pub use contracts::{Record, RecordSink, RECORD_HEADER};
pub use sinks::{format_row, CsvRecordSink, LogRecordSink};
