//! Track replay - publishes positions from a recorded CSV file
//!
//! Accepts any file whose first three columns are `time,x,y` (including the
//! logger's own output), paced by the recorded timestamps.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use contracts::{PositionSample, ReplayConfig};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{IngestionError, Result};
use crate::PositionTopic;

/// Smallest track-time gap inserted when a looping track wraps around
const MIN_WRAP_GAP_US: u64 = 1_000;

/// Smallest wall-clock length of one pass of a looping track
const MIN_PASS_INTERVAL: Duration = Duration::from_millis(1);

/// Recorded position track
#[derive(Debug, Clone)]
pub struct TrackReplay {
    samples: Vec<PositionSample>,
    speed: f64,
    loop_playback: bool,
}

impl TrackReplay {
    /// Load the track described by a replay configuration
    pub fn from_config(config: &ReplayConfig) -> Result<Self> {
        let samples = Self::read_track(&config.path)?;
        Ok(Self {
            samples,
            speed: config.speed,
            loop_playback: config.loop_playback,
        })
    }

    /// Build a replay from in-memory samples
    pub fn from_samples(samples: Vec<PositionSample>, speed: f64, loop_playback: bool) -> Self {
        Self {
            samples,
            speed,
            loop_playback,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Parse `time,x,y[,...]` rows; a non-numeric first line is a header
    pub fn read_track(path: &Path) -> Result<Vec<PositionSample>> {
        let reader = BufReader::new(File::open(path)?);
        let mut samples = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_row(line) {
                Ok(sample) => samples.push(sample),
                Err(_) if idx == 0 => continue,
                Err(message) => {
                    return Err(IngestionError::ParseFailed {
                        line: idx + 1,
                        message,
                    })
                }
            }
        }

        if samples.is_empty() {
            return Err(IngestionError::EmptyTrack {
                path: path.display().to_string(),
            });
        }
        Ok(samples)
    }

    /// Start publishing on `topic` until the track ends or `cancel` fires
    pub fn spawn(self, topic: PositionTopic, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(topic, cancel).await })
    }

    async fn run(self, topic: PositionTopic, cancel: CancellationToken) {
        let (Some(first), Some(last)) = (self.samples.first(), self.samples.last()) else {
            return;
        };
        let span = last.timestamp.saturating_sub(first.timestamp);
        let track_pass = span + self.wrap_gap_us(span);
        let wall_pass = Duration::from_micros(track_pass)
            .div_f64(self.speed)
            .max(MIN_PASS_INTERVAL);

        let start = Instant::now();
        let mut pass_start = Duration::ZERO;
        let mut offset = 0u64;
        let mut loops = 0u64;

        info!(
            topic = %topic.name(),
            samples = self.samples.len(),
            speed = self.speed,
            loop_playback = self.loop_playback,
            "track replay started"
        );

        'playback: loop {
            for sample in &self.samples {
                let into_pass =
                    Duration::from_micros(sample.timestamp.saturating_sub(first.timestamp));
                let due = start + pass_start + into_pass.div_f64(self.speed);
                tokio::select! {
                    _ = cancel.cancelled() => break 'playback,
                    _ = tokio::time::sleep_until(due) => {}
                }

                topic.publish(PositionSample {
                    timestamp: sample.timestamp + offset,
                    ..*sample
                });
            }

            loops += 1;
            if !self.loop_playback {
                break;
            }
            offset += track_pass;
            pass_start += wall_pass;
        }

        debug!(topic = %topic.name(), loops, "track replay finished");
    }

    /// Track time between the last row of one pass and the first of the next
    fn wrap_gap_us(&self, span: u64) -> u64 {
        let rows = self.samples.len() as u64;
        let mean_interval = if rows > 1 { span / (rows - 1) } else { 0 };
        mean_interval.max(MIN_WRAP_GAP_US)
    }
}

fn parse_row(line: &str) -> std::result::Result<PositionSample, String> {
    let mut fields = line.split(',').map(str::trim);
    let mut next = |name: &str| {
        fields
            .next()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| format!("missing column '{name}'"))
    };

    let timestamp = next("time")?;
    let x = next("x")?;
    let y = next("y")?;

    Ok(PositionSample {
        timestamp: timestamp
            .parse()
            .map_err(|e| format!("invalid time '{timestamp}': {e}"))?,
        x: x.parse().map_err(|e| format!("invalid x '{x}': {e}"))?,
        y: y.parse().map_err(|e| format!("invalid y '{y}': {e}"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PollOutcome, PositionSource};
    use std::io::Write;

    fn write_track(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_track_skips_header() {
        let file = write_track(
            "time,x,y,ambient_temp,obj_temp\n\
             100,1.00000000,2.00000000,20.0000,21.0000\n\
             200,3.00000000,4.00000000,20.0000,21.0000\n",
        );
        let samples = TrackReplay::read_track(file.path()).unwrap();
        assert_eq!(
            samples,
            vec![
                PositionSample::new(100, 1.0, 2.0),
                PositionSample::new(200, 3.0, 4.0)
            ]
        );
    }

    #[test]
    fn test_read_track_reports_bad_line() {
        let file = write_track("time,x,y\n100,1.0,2.0\n200,oops,4.0\n");
        let err = TrackReplay::read_track(file.path()).unwrap_err();
        assert!(matches!(err, IngestionError::ParseFailed { line: 3, .. }));
    }

    #[test]
    fn test_read_track_rejects_empty() {
        let file = write_track("time,x,y\n");
        let err = TrackReplay::read_track(file.path()).unwrap_err();
        assert!(matches!(err, IngestionError::EmptyTrack { .. }));
    }

    #[test]
    fn test_from_config_loads_file() {
        let file = write_track("10,0.5,0.25\n");
        let replay = TrackReplay::from_config(&ReplayConfig {
            path: file.path().to_path_buf(),
            speed: 1.0,
            loop_playback: false,
        })
        .unwrap();
        assert_eq!(replay.len(), 1);
    }

    #[tokio::test]
    async fn test_replay_publishes_in_order() {
        let topic = PositionTopic::new("replay");
        let mut sub = topic.subscribe();
        let replay = TrackReplay::from_samples(
            vec![
                PositionSample::new(0, 0.0, 0.0),
                PositionSample::new(100_000, 1.0, 0.0),
            ],
            1.0,
            false,
        );
        let handle = replay.spawn(topic.clone(), CancellationToken::new());

        let mut seen = Vec::new();
        while seen.len() < 2 {
            match sub.poll(Duration::from_millis(500)).await {
                PollOutcome::Ready(sample) => seen.push(sample.timestamp),
                other => panic!("expected sample, got {other:?}"),
            }
        }
        assert_eq!(seen, vec![0, 100_000]);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_looping_replay_keeps_time_monotonic() {
        let topic = PositionTopic::new("replay");
        let mut sub = topic.subscribe();
        let cancel = CancellationToken::new();
        let replay = TrackReplay::from_samples(
            vec![
                PositionSample::new(1_000, 0.0, 0.0),
                PositionSample::new(21_000, 1.0, 0.0),
            ],
            1.0,
            true,
        );
        let handle = replay.spawn(topic.clone(), cancel.clone());

        let mut last = 0;
        for _ in 0..4 {
            match sub.poll(Duration::from_millis(500)).await {
                PollOutcome::Ready(sample) => {
                    assert!(sample.timestamp > last);
                    last = sample.timestamp;
                }
                other => panic!("expected sample, got {other:?}"),
            }
        }

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_single_row_loop_leaves_runtime_responsive() {
        let topic = PositionTopic::new("replay");
        let mut sub = topic.subscribe();
        let cancel = CancellationToken::new();
        let handle = TrackReplay::from_samples(vec![PositionSample::new(5, 0.0, 0.0)], 1.0, true)
            .spawn(topic.clone(), cancel.clone());

        let begun = std::time::Instant::now();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(begun.elapsed() < Duration::from_secs(1), "woke after {:?}", begun.elapsed());

        // Each pass advances track time by the wrap gap
        let mut seen = Vec::new();
        while seen.len() < 2 {
            match sub.poll(Duration::from_millis(500)).await {
                PollOutcome::Ready(sample) => seen.push(sample.timestamp),
                other => panic!("expected sample, got {other:?}"),
            }
        }
        assert!(seen[1] > seen[0]);
        assert_eq!((seen[1] - seen[0]) % MIN_WRAP_GAP_US, 0);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("replay ignored cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn test_replay_paced_from_start_time() {
        let topic = PositionTopic::new("replay");
        let samples: Vec<_> = (0..10u64)
            .map(|i| PositionSample::new(i * 20_000, i as f64, 0.0))
            .collect();

        let begun = std::time::Instant::now();
        TrackReplay::from_samples(samples, 2.0, false)
            .spawn(topic, CancellationToken::new())
            .await
            .unwrap();
        let elapsed = begun.elapsed();

        // 180 ms of track at double speed
        assert!(elapsed >= Duration::from_millis(90), "finished after {elapsed:?}");
        assert!(elapsed < Duration::from_millis(500), "finished after {elapsed:?}");
    }

    #[test]
    fn test_wrap_gap_follows_row_interval() {
        let replay = TrackReplay::from_samples(
            vec![
                PositionSample::new(0, 0.0, 0.0),
                PositionSample::new(50_000, 1.0, 0.0),
                PositionSample::new(100_000, 2.0, 0.0),
            ],
            1.0,
            true,
        );
        assert_eq!(replay.wrap_gap_us(100_000), 50_000);

        let single = TrackReplay::from_samples(vec![PositionSample::new(5, 0.0, 0.0)], 1.0, true);
        assert_eq!(single.wrap_gap_us(0), MIN_WRAP_GAP_US);
    }
}
