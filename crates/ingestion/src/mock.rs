//! Scripted position source
//!
//! Replays a fixed sequence of poll outcomes, used to drive the acquisition
//! loop deterministically in tests and dry runs.

use std::collections::VecDeque;
use std::time::Duration;

use contracts::{ContractError, PollOutcome, PositionSample, PositionSource};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// One scripted poll result
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Sample(PositionSample),
    Timeout,
    Error(String),
}

/// Deterministic `PositionSource`
#[derive(Debug)]
pub struct ScriptedPositionSource {
    topic: String,
    steps: VecDeque<ScriptStep>,
    cancel_when_exhausted: Option<CancellationToken>,
    interval: Option<Duration>,
    polls: usize,
    detach_calls: usize,
}

impl ScriptedPositionSource {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            topic: "scripted".to_string(),
            steps: steps.into_iter().collect(),
            cancel_when_exhausted: None,
            interval: None,
            polls: 0,
            detach_calls: 0,
        }
    }

    /// Script made only of samples
    pub fn from_samples(samples: impl IntoIterator<Item = PositionSample>) -> Self {
        Self::new(samples.into_iter().map(ScriptStep::Sample))
    }

    /// Cancel `token` when the last scripted step is handed out
    pub fn cancel_when_exhausted(mut self, token: CancellationToken) -> Self {
        self.cancel_when_exhausted = Some(token);
        self
    }

    /// Number of `poll` calls so far
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Last interval hint received
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn detach_calls(&self) -> usize {
        self.detach_calls
    }
}

impl PositionSource for ScriptedPositionSource {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn set_interval(&mut self, interval: Duration) {
        self.interval = Some(interval);
    }

    async fn poll(&mut self, _timeout: Duration) -> PollOutcome {
        self.polls += 1;
        let step = self.steps.pop_front();

        if self.steps.is_empty() {
            if let Some(token) = &self.cancel_when_exhausted {
                token.cancel();
            }
        }

        trace!(poll = self.polls, step = ?step, "scripted poll");

        match step {
            Some(ScriptStep::Sample(sample)) => PollOutcome::Ready(sample),
            Some(ScriptStep::Timeout) | None => PollOutcome::TimedOut,
            Some(ScriptStep::Error(message)) => {
                PollOutcome::Failed(ContractError::source_read(&self.topic, message))
            }
        }
    }

    fn detach(&mut self) {
        self.detach_calls += 1;
    }
}
