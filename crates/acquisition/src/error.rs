//! Acquisition error types

use contracts::ContractError;
use thiserror::Error;

use crate::TaskState;

#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// Task settings rejected before anything was opened
    #[error("Invalid task configuration: {0}")]
    InvalidConfig(#[source] ContractError),

    /// Output destination could not be opened; no task exists
    #[error("Failed to open record sink: {0}")]
    SinkOpen(#[source] ContractError),

    /// `run` called outside the `Running` state
    #[error("Task cannot run while {state}")]
    InvalidState { state: TaskState },

    #[error(transparent)]
    Contract(#[from] ContractError),
}

pub type Result<T> = std::result::Result<T, AcquisitionError>;
