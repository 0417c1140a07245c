//! Position topic - latest-value publish/subscribe channel
//!
//! A subscriber never buffers: when several samples are published between two
//! polls, only the most recent one is delivered.

use std::sync::Arc;
use std::time::Duration;

use contracts::{ContractError, PollOutcome, PositionSample, PositionSource};
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, instrument, trace};

/// Published vehicle-position topic
///
/// Cheap to clone; the topic disconnects once every clone is dropped.
#[derive(Debug, Clone)]
pub struct PositionTopic {
    name: Arc<str>,
    tx: Arc<watch::Sender<Option<PositionSample>>>,
}

impl PositionTopic {
    /// Create a topic with no publication yet
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            name: Arc::from(name.into()),
            tx: Arc::new(tx),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish a sample, overwriting any sample not yet consumed
    pub fn publish(&self, sample: PositionSample) {
        self.tx.send_replace(Some(sample));
        trace!(topic = %self.name, timestamp = sample.timestamp, "position published");
    }

    /// Attach a new subscriber
    ///
    /// The subscriber only sees samples published after this call.
    pub fn subscribe(&self) -> PositionSubscription {
        debug!(topic = %self.name, "position subscriber attached");
        PositionSubscription {
            topic: self.name.to_string(),
            rx: Some(self.tx.subscribe()),
            interval: Duration::ZERO,
            last_delivery: None,
        }
    }

    /// Number of attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Subscription handle owned by one consumer
#[derive(Debug)]
pub struct PositionSubscription {
    topic: String,
    rx: Option<watch::Receiver<Option<PositionSample>>>,
    interval: Duration,
    last_delivery: Option<Instant>,
}

impl PositionSubscription {
    /// Current interval hint
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_attached(&self) -> bool {
        self.rx.is_some()
    }
}

impl PositionSource for PositionSubscription {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn set_interval(&mut self, interval: Duration) {
        debug!(topic = %self.topic, interval_ms = interval.as_millis() as u64, "update interval set");
        self.interval = interval;
    }

    #[instrument(name = "position_poll", level = "trace", skip(self), fields(topic = %self.topic))]
    async fn poll(&mut self, timeout: Duration) -> PollOutcome {
        let deadline = Instant::now() + timeout;

        let Some(rx) = self.rx.as_mut() else {
            return PollOutcome::Failed(ContractError::SourceDetached {
                topic: self.topic.clone(),
            });
        };

        // Rate limit: no delivery sooner than one interval after the previous one
        if let Some(last) = self.last_delivery {
            let earliest = last + self.interval;
            if earliest > deadline {
                time::sleep_until(deadline).await;
                return PollOutcome::TimedOut;
            }
            time::sleep_until(earliest).await;
        }

        match time::timeout_at(deadline, rx.changed()).await {
            Err(_) => PollOutcome::TimedOut,
            Ok(Err(_)) => PollOutcome::Failed(ContractError::SourceDisconnected {
                topic: self.topic.clone(),
            }),
            Ok(Ok(())) => {
                let latest = *rx.borrow_and_update();
                match latest {
                    Some(sample) => {
                        self.last_delivery = Some(Instant::now());
                        PollOutcome::Ready(sample)
                    }
                    None => PollOutcome::TimedOut,
                }
            }
        }
    }

    fn detach(&mut self) {
        if self.rx.take().is_some() {
            debug!(topic = %self.topic, "position subscriber detached");
        }
    }
}
