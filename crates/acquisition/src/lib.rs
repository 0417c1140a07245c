//! # Acquisition
//!
//! The acquisition task: waits for vehicle position samples, pairs each one
//! with a fresh temperature reading and appends the result to a record sink.
//!
//! ```ignore
//! let mut task = AcquisitionTask::open(config.task, subscription, sensor, params.subscribe())?;
//! let stats = task.run(cancel).await?;
//! stats.print_summary();
//! ```

mod error;
mod state;
mod stats;
mod task;

pub use error::{AcquisitionError, Result};
pub use state::TaskState;
pub use stats::AcquisitionStats;
pub use task::{console_line, AcquisitionTask, CSV_SINK_NAME};
