//! # Ingestion
//!
//! Position stream subscriber module.
//!
//! Responsibilities:
//! - Latest-value position topic with bounded-wait polling
//! - Simulated survey vehicle and recorded track replay publishers
//! - Scripted source for deterministic runs

pub mod error;
pub mod mock;
pub mod replay;
pub mod simulated;
pub mod topic;

pub use contracts::{PollOutcome, PositionSample, PositionSource};
pub use error::{IngestionError, Result};
pub use mock::{ScriptStep, ScriptedPositionSource};
pub use replay::TrackReplay;
pub use simulated::{LawnmowerPath, SimulatedVehicle};
pub use topic::{PositionSubscription, PositionTopic};

/// Topic name of the vehicle local position stream
pub const VEHICLE_POSITION_TOPIC: &str = "vehicle_local_position";
