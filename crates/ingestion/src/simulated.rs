//! Simulated vehicle
//!
//! Publishes a lawnmower survey pattern on a `PositionTopic` from a background
//! task. Used when no real position stream is available.

use std::time::Duration;

use contracts::{PositionSample, SimulatedVehicleConfig};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::PositionTopic;

/// Back-and-forth survey path over a rectangle
///
/// Passes run along x, separated by `row_spacing` along y. The path restarts
/// from the origin once the rectangle is covered.
#[derive(Debug, Clone, Copy)]
pub struct LawnmowerPath {
    width: f64,
    height: f64,
    row_spacing: f64,
}

impl LawnmowerPath {
    pub fn new(width: f64, height: f64, row_spacing: f64) -> Self {
        Self {
            width,
            height,
            row_spacing,
        }
    }

    fn rows(&self) -> usize {
        (self.height / self.row_spacing).floor() as usize + 1
    }

    /// Length of one full coverage (m)
    pub fn cycle_length(&self) -> f64 {
        let rows = self.rows() as f64;
        rows * self.width + (rows - 1.0) * self.row_spacing
    }

    /// Position after travelling `distance` meters
    pub fn position_at(&self, distance: f64) -> (f64, f64) {
        let d = distance.rem_euclid(self.cycle_length());
        let segment = self.width + self.row_spacing;
        let row = (d / segment).floor();
        let along = d - row * segment;
        let forward = (row as u64) % 2 == 0;
        let row_y = row * self.row_spacing;

        if along <= self.width {
            let x = if forward { along } else { self.width - along };
            (x, row_y)
        } else {
            let x = if forward { self.width } else { 0.0 };
            (x, row_y + (along - self.width))
        }
    }
}

/// Background publisher of simulated positions
pub struct SimulatedVehicle {
    topic: PositionTopic,
    config: SimulatedVehicleConfig,
}

impl SimulatedVehicle {
    pub fn new(topic: PositionTopic, config: SimulatedVehicleConfig) -> Self {
        Self { topic, config }
    }

    /// Start publishing until `cancel` fires
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    async fn run(self, cancel: CancellationToken) {
        let path = LawnmowerPath::new(
            self.config.width_m,
            self.config.height_m,
            self.config.row_spacing_m,
        );
        let mut ticker = time::interval(Duration::from_secs_f64(1.0 / self.config.publish_hz));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let start = Instant::now();

        debug!(
            topic = %self.topic.name(),
            publish_hz = self.config.publish_hz,
            speed_mps = self.config.speed_mps,
            "simulated vehicle started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let elapsed = start.elapsed();
                    let (x, y) = path.position_at(elapsed.as_secs_f64() * self.config.speed_mps);
                    self.topic.publish(PositionSample::new(elapsed.as_micros() as u64, x, y));
                }
            }
        }

        debug!(topic = %self.topic.name(), "simulated vehicle stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PollOutcome, PositionSource};

    fn path() -> LawnmowerPath {
        LawnmowerPath::new(400.0, 400.0, 20.0)
    }

    #[test]
    fn test_first_pass_runs_along_x() {
        assert_eq!(path().position_at(0.0), (0.0, 0.0));
        assert_eq!(path().position_at(150.0), (150.0, 0.0));
        assert_eq!(path().position_at(400.0), (400.0, 0.0));
    }

    #[test]
    fn test_transit_then_return_pass() {
        // 10 m into the transit between row 0 and row 1
        assert_eq!(path().position_at(410.0), (400.0, 10.0));
        // 100 m into the second (reverse) pass
        assert_eq!(path().position_at(520.0), (300.0, 20.0));
    }

    #[test]
    fn test_path_wraps_after_full_coverage() {
        let p = path();
        // 21 rows of 400 m plus 20 transits of 20 m
        assert_eq!(p.cycle_length(), 21.0 * 400.0 + 20.0 * 20.0);
        assert_eq!(p.position_at(p.cycle_length() + 5.0), (5.0, 0.0));
    }

    #[tokio::test]
    async fn test_simulated_vehicle_publishes_until_cancelled() {
        let topic = PositionTopic::new("vehicle_local_position");
        let mut sub = topic.subscribe();
        let cancel = CancellationToken::new();

        let handle = SimulatedVehicle::new(
            topic.clone(),
            SimulatedVehicleConfig {
                publish_hz: 200.0,
                ..Default::default()
            },
        )
        .spawn(cancel.clone());

        let first = match sub.poll(Duration::from_millis(500)).await {
            PollOutcome::Ready(sample) => sample,
            other => panic!("expected sample, got {other:?}"),
        };
        let second = match sub.poll(Duration::from_millis(500)).await {
            PollOutcome::Ready(sample) => sample,
            other => panic!("expected sample, got {other:?}"),
        };
        assert!(second.timestamp > first.timestamp);

        cancel.cancel();
        handle.await.unwrap();
    }
}
