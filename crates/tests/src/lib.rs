//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Configuration files driving a full acquisition task
//! - Simulated vehicle -> topic -> task -> CSV file
//! - Replaying the logger's own output as a position track

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{LoggerConfig, RECORD_HEADER};

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let toml = ConfigLoader::to_toml(&LoggerConfig::default()).unwrap();
        let parsed = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(parsed.task, LoggerConfig::default().task);
        assert_eq!(parsed.source, LoggerConfig::default().source);
    }

    #[test]
    fn test_demo_config_is_valid() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos/logger.toml");
        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.task.sample_rate_hz, 5);
        assert!(config.task.simulate);
        assert_eq!(config.parameters.len(), 1);
    }

    #[test]
    fn test_header_is_stable() {
        assert_eq!(RECORD_HEADER, "time,x,y,ambient_temp,obj_temp");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    use acquisition::{AcquisitionTask, TaskState};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{PositionSample, SimulatedVehicleConfig, TaskConfig, RECORD_HEADER};
    use ingestion::{
        PositionTopic, ScriptStep, ScriptedPositionSource, SimulatedVehicle, TrackReplay,
        VEHICLE_POSITION_TOPIC,
    };
    use params::ParameterStore;
    use recorder::LogRecordSink;
    use tempfile::tempdir;
    use thermal::{SimulatedThermometer, SimulatedThermometerConfig, StaticThermometer};
    use tokio_util::sync::CancellationToken;

    fn task_config(destination: &Path, rate: u32) -> TaskConfig {
        TaskConfig {
            destination: destination.to_path_buf(),
            sample_rate_hz: rate,
            poll_timeout_ms: 200,
            poll_error_backoff_ms: 20,
            simulate: true,
            ..Default::default()
        }
    }

    fn data_rows(path: &Path) -> Vec<Vec<f64>> {
        let content = fs::read_to_string(path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(RECORD_HEADER));
        lines
            .map(|line| line.split(',').map(|f| f.parse().unwrap()).collect())
            .collect()
    }

    /// Simulated vehicle -> PositionTopic -> AcquisitionTask -> CSV
    #[tokio::test]
    async fn test_e2e_simulated_survey() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("out.txt");
        let cancel = CancellationToken::new();

        let topic = PositionTopic::new(VEHICLE_POSITION_TOPIC);
        let subscription = topic.subscribe();
        let sensor = SimulatedThermometer::new(
            "ir0",
            SimulatedThermometerConfig {
                seed: Some(7),
                ..Default::default()
            },
        );
        let store = ParameterStore::new();

        let mut task =
            AcquisitionTask::open(task_config(&path, 10), subscription, sensor, store.subscribe())
                .unwrap();

        let vehicle = SimulatedVehicle::new(
            topic,
            SimulatedVehicleConfig {
                publish_hz: 100.0,
                ..Default::default()
            },
        )
        .spawn(cancel.clone());

        let stopper = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(600)).await;
                cancel.cancel();
            })
        };

        let stats = tokio::time::timeout(Duration::from_secs(5), task.run(cancel.clone()))
            .await
            .expect("acquisition did not stop")
            .unwrap();
        stopper.await.unwrap();
        vehicle.await.unwrap();

        assert_eq!(task.state(), TaskState::Stopped);
        assert!(stats.records_written >= 2, "got {}", stats.records_written);
        // 10 Hz over ~0.6 s, with slack for the first immediate delivery
        assert!(stats.records_written <= 10, "got {}", stats.records_written);

        let rows = data_rows(&path);
        assert_eq!(rows.len() as u64, stats.records_written);
        for pair in rows.windows(2) {
            assert!(pair[1][0] > pair[0][0], "timestamps must increase");
        }
        for row in &rows {
            assert_eq!(row.len(), 5);
            assert!((0.0..=400.0).contains(&row[1]));
            assert!((0.0..=400.0).contains(&row[2]));
        }
    }

    /// The logger's output is a valid replay track
    #[tokio::test]
    async fn test_e2e_replay_of_logged_track() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");

        // Record a short scripted track
        let cancel = CancellationToken::new();
        let script: Vec<_> = (0..5u64)
            .map(|i| {
                ScriptStep::Sample(PositionSample::new(
                    i * 150_000,
                    i as f64 * 1.25,
                    -(i as f64),
                ))
            })
            .collect();
        let mut recording = AcquisitionTask::open(
            task_config(&first, 30),
            ScriptedPositionSource::new(script).cancel_when_exhausted(cancel.clone()),
            StaticThermometer::reading(18.0, 25.5),
            ParameterStore::new().subscribe(),
        )
        .unwrap();
        recording.run(cancel).await.unwrap();

        // Replay it through a real topic
        let samples = TrackReplay::read_track(&first).unwrap();
        assert_eq!(samples.len(), 5);

        let cancel = CancellationToken::new();
        let topic = PositionTopic::new(VEHICLE_POSITION_TOPIC);
        let mut replaying = AcquisitionTask::open(
            task_config(&second, 30),
            topic.subscribe(),
            StaticThermometer::reading(18.0, 25.5),
            ParameterStore::new().subscribe(),
        )
        .unwrap();

        let replay = TrackReplay::from_samples(samples, 1.0, false).spawn(topic, cancel.clone());
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                replay.await.unwrap();
                // Let the last sample be picked up
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            })
        };

        let stats = tokio::time::timeout(Duration::from_secs(5), replaying.run(cancel))
            .await
            .expect("replay did not stop")
            .unwrap();
        watcher.await.unwrap();

        let original = data_rows(&first);
        let replayed = data_rows(&second);
        assert_eq!(replayed.len() as u64, stats.records_written);
        assert!(replayed.len() >= 3, "got {}", replayed.len());

        // Every replayed row is an original row, in order
        let mut remaining = original.iter();
        for row in &replayed {
            assert!(
                remaining.any(|o| o == row),
                "row {row:?} not found in original order"
            );
        }
    }

    /// Parameters written elsewhere reach the running task
    #[tokio::test]
    async fn test_e2e_parameter_update_while_running() {
        let cancel = CancellationToken::new();
        let store = ParameterStore::new();
        let topic = PositionTopic::new(VEHICLE_POSITION_TOPIC);

        let mut task = AcquisitionTask::with_sink(
            task_config(Path::new("unused.txt"), 20),
            topic.subscribe(),
            StaticThermometer::reading(20.0, 21.0),
            LogRecordSink::new("log"),
            store.subscribe(),
        )
        .unwrap();

        let vehicle = SimulatedVehicle::new(topic, SimulatedVehicleConfig::default())
            .spawn(cancel.clone());

        let writer = {
            let store = store.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(150)).await;
                store.set("emissivity", 0.9);
                tokio::time::sleep(Duration::from_millis(300)).await;
                cancel.cancel();
            })
        };

        let stats = task.run(cancel).await.unwrap();
        writer.await.unwrap();
        vehicle.await.unwrap();

        assert_eq!(stats.parameter_updates, 1);
        assert_eq!(task.parameters().get_f64("emissivity"), Some(0.9));
        assert_eq!(task.sink().records(), stats.records_written);
    }

    /// A JSON config file drives the task end to end
    #[tokio::test]
    async fn test_e2e_from_json_config() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("survey.txt");
        let json = format!(
            r#"{{
                "task": {{ "destination": {:?}, "sample_rate_hz": 5 }},
                "parameters": {{ "label": "north-field" }}
            }}"#,
            destination.display().to_string()
        );
        let config = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        let store = ParameterStore::with_values(config.parameters.clone());
        let cancel = CancellationToken::new();
        let source = ScriptedPositionSource::new([
            ScriptStep::Sample(PositionSample::new(1, 0.5, 0.5)),
            ScriptStep::Timeout,
            ScriptStep::Error("EAGAIN".into()),
            ScriptStep::Sample(PositionSample::new(2, 1.5, 0.5)),
        ])
        .cancel_when_exhausted(cancel.clone());

        let mut task = AcquisitionTask::open(
            config.task.clone(),
            source,
            StaticThermometer::new(None, Some(33.0)),
            store.subscribe(),
        )
        .unwrap();

        assert_eq!(
            task.source().interval(),
            Some(Duration::from_millis(200))
        );

        let stats = task.run(cancel).await.unwrap();

        assert_eq!(stats.records_written, 2);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.poll_errors, 1);
        assert_eq!(stats.ambient_failures, 2);
        assert_eq!(
            fs::read_to_string(&destination).unwrap(),
            "time,x,y,ambient_temp,obj_temp\n\
             1,0.50000000,0.50000000,0.0000,33.0000\n\
             2,1.50000000,0.50000000,0.0000,33.0000\n"
        );
        assert!(task.parameters().get("label").is_some());
    }
}
