//! Sink implementations
//!
//! Contains CsvRecordSink and LogRecordSink.

mod csv;
mod log;

pub use self::csv::{format_row, CsvRecordSink};
pub use self::log::LogRecordSink;
