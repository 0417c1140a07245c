//! PositionSample and the PositionSource trait - Ingestion output
//!
//! A subscriber attaches to the published vehicle-position topic and is polled
//! by the acquisition loop with a bounded wait.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Local position of the vehicle
///
/// Consumed exactly once by the iteration that polled it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionSample {
    /// Publisher clock (microseconds)
    pub timestamp: u64,

    /// North offset (meters)
    pub x: f64,

    /// East offset (meters)
    pub y: f64,
}

impl PositionSample {
    pub fn new(timestamp: u64, x: f64, y: f64) -> Self {
        Self { timestamp, x, y }
    }
}

/// Result of a bounded-wait poll
#[derive(Debug)]
pub enum PollOutcome {
    /// A new sample arrived within the window (the most recent one)
    Ready(PositionSample),

    /// Nothing arrived within the window; not an error
    TimedOut,

    /// The source reported an I/O or driver error; recoverable
    Failed(ContractError),
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Position stream subscriber
///
/// Implementations must tolerate repeated polling without reconfiguration,
/// and `detach` must be idempotent.
#[trait_variant::make(PositionSource: Send)]
pub trait LocalPositionSource {
    /// Topic name (used for logging/metrics)
    fn topic(&self) -> &str;

    /// Desired update interval
    ///
    /// A hint to the upstream source, not a delivery guarantee.
    fn set_interval(&mut self, interval: Duration);

    /// Block up to `timeout` for the next sample
    async fn poll(&mut self, timeout: Duration) -> PollOutcome;

    /// Release the subscription
    fn detach(&mut self);
}
