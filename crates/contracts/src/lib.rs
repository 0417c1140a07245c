//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the logger.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Position samples carry the publisher's monotonic clock (microseconds, u64)
//! - Rows written to the sink keep that timestamp untouched

mod config;
mod error;
mod position;
mod record;
mod sink;
mod temperature;

pub use config::*;
pub use error::*;
pub use position::*;
pub use record::*;
pub use sink::*;
pub use temperature::*;
