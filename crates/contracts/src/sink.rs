//! RecordSink trait - acquisition output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, Record};

/// Append-only record destination
///
/// Opening happens in the implementation's constructor, which must write the
/// header before any data row.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Append exactly one row
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn append(&mut self, record: &Record) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    ///
    /// Idempotent: closing an already-closed sink is a no-op.
    async fn close(&mut self) -> Result<(), ContractError>;
}
