//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract smoke tests
//! - Mock e2e runs (session -> router -> publisher -> dispatcher)
//! - Cross-crate synchronization properties

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(contracts::PoseStatus::default(), contracts::PoseStatus::Unknown);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{FusionSession, SinkConfig, SinkType, Snapshot};
    use dispatcher::create_dispatcher;
    use ingestion::{MockFusionSession, MockSessionConfig, StreamRouter};
    use sync_core::{PointCloudStore, PoseStore, SnapshotPublisher};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn fast_session_config() -> MockSessionConfig {
        MockSessionConfig {
            pose_rate_hz: 200.0,
            depth_rate_hz: 40.0,
            depth_points: 64,
            ..Default::default()
        }
    }

    struct MockPipeline {
        router: StreamRouter,
        publisher_handle: sync_core::PublisherHandle,
        snapshot_rx: mpsc::Receiver<Snapshot>,
    }

    /// Wire session -> router -> stores -> publisher
    fn start_pipeline(config: MockSessionConfig, period: Duration) -> MockPipeline {
        let pose_store = Arc::new(PoseStore::new());
        let cloud_store = Arc::new(PointCloudStore::new());

        let session: Arc<dyn FusionSession> = Arc::new(MockFusionSession::new(config));
        let router = StreamRouter::new(session, pose_store.clone(), cloud_store.clone());
        router.connect().expect("connect failed");

        let (snapshot_tx, snapshot_rx) = mpsc::channel(64);
        let publisher = SnapshotPublisher::new(pose_store, cloud_store, period);
        let publisher_handle = publisher.spawn(snapshot_tx);

        MockPipeline {
            router,
            publisher_handle,
            snapshot_rx,
        }
    }

    /// End-to-end: MockFusionSession -> StreamRouter -> SnapshotPublisher -> Dispatcher
    ///
    /// Verifies the complete data flow:
    /// 1. the mock session produces both streams
    /// 2. the publisher delivers consistent snapshots
    /// 3. the dispatcher fans snapshots out to its sinks
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let mut pipeline = start_pipeline(fast_session_config(), Duration::from_millis(10));

        // Dispatcher with a log sink
        let (dispatch_tx, dispatch_rx) = mpsc::channel::<Snapshot>(64);
        let sink_configs = vec![SinkConfig {
            name: "test_log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 50,
            params: HashMap::new(),
        }];
        let dispatcher = create_dispatcher(sink_configs, dispatch_rx).await.unwrap();
        let dispatcher_handle = dispatcher.spawn();

        // Forward a handful of snapshots
        let target = 5u64;
        let mut forwarded = 0u64;
        let mut last_seq = 0u64;

        while forwarded < target {
            let snapshot = timeout(Duration::from_secs(5), pipeline.snapshot_rx.recv())
                .await
                .expect("snapshot timed out")
                .expect("publisher stopped early");

            assert!(snapshot.seq > last_seq, "sequence must increase");
            last_seq = snapshot.seq;

            dispatch_tx.send(snapshot).await.unwrap();
            forwarded += 1;
        }

        // Shutdown
        pipeline.publisher_handle.shutdown().await;
        pipeline.router.disconnect();
        drop(dispatch_tx);
        let _ = timeout(Duration::from_secs(2), dispatcher_handle).await;

        let ingest = pipeline.router.metrics().snapshot();
        assert!(ingest.pose_updates > 0, "poses should have been ingested");
        assert!(ingest.cloud_frames > 0, "clouds should have been ingested");
    }

    /// Snapshots eventually carry point-cloud metadata with the synthetic
    /// surface's depth band.
    #[tokio::test]
    async fn test_e2e_snapshot_carries_cloud_summary() {
        let mut pipeline = start_pipeline(fast_session_config(), Duration::from_millis(10));

        let snapshot = timeout(Duration::from_secs(5), async {
            loop {
                let snapshot = pipeline
                    .snapshot_rx
                    .recv()
                    .await
                    .expect("publisher stopped early");
                if snapshot.cloud.is_some() {
                    return snapshot;
                }
            }
        })
        .await
        .expect("no cloud-bearing snapshot in time");

        pipeline.publisher_handle.shutdown().await;
        pipeline.router.disconnect();

        let cloud = snapshot.cloud.unwrap();
        assert_eq!(cloud.point_count, 64);
        // The mock surface sits 1.2..=1.8m away.
        assert!(cloud.average_z > 0.5 && cloud.average_z < 2.5);
    }

    /// Status flips in the pose stream reset the status counter to 1.
    #[tokio::test]
    async fn test_e2e_status_transitions_reset_count() {
        let config = MockSessionConfig {
            status_flip_every: Some(10),
            ..fast_session_config()
        };
        let mut pipeline = start_pipeline(config, Duration::from_millis(5));

        let mut saw_transition = false;
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);

        while tokio::time::Instant::now() < deadline && !saw_transition {
            let Ok(Some(snapshot)) =
                timeout(Duration::from_millis(500), pipeline.snapshot_rx.recv()).await
            else {
                break;
            };
            if snapshot.pose.status != snapshot.pose_stats.previous_status {
                assert_eq!(
                    snapshot.pose_stats.status_count, 1,
                    "count must restart at a transition"
                );
                saw_transition = true;
            }
        }

        pipeline.publisher_handle.shutdown().await;
        pipeline.router.disconnect();

        assert!(saw_transition, "expected at least one status transition");
    }

    /// Pose-query failure degrades alignment to the most recent pose (or the
    /// previous placement) while the pipeline keeps flowing.
    #[tokio::test]
    async fn test_e2e_alignment_degrades_on_query_failure() {
        let config = MockSessionConfig {
            fail_pose_queries: true,
            ..fast_session_config()
        };

        let pose_store = Arc::new(PoseStore::new());
        let cloud_store = Arc::new(PointCloudStore::new());
        let session: Arc<dyn FusionSession> = Arc::new(MockFusionSession::new(config));
        let router = StreamRouter::new(session, pose_store, cloud_store.clone());
        router.connect().unwrap();

        let metrics = router.metrics();
        timeout(Duration::from_secs(5), async {
            loop {
                let snapshot = metrics.snapshot();
                if snapshot.align_approximate + snapshot.align_stale >= 3 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("degraded alignments not reached");

        router.disconnect();

        // Frames keep landing in the store and nothing aligned exactly.
        assert!(cloud_store.latest_frame().is_some());
        assert_eq!(metrics.snapshot().align_exact, 0);
    }
}

#[cfg(test)]
mod property_tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use contracts::{PoseSample, PoseStatus};
    use sync_core::PoseStore;

    /// Concurrent updates with distinct timestamps: the final read is one of
    /// the applied samples paired with stats derived from another applied
    /// sample, never a torn mix.
    #[test]
    fn test_concurrent_updates_yield_consistent_pair() {
        let store = Arc::new(PoseStore::new());
        let timestamps: Vec<f64> = (1..=16).map(|i| i as f64).collect();

        let handles: Vec<_> = timestamps
            .iter()
            .map(|&t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.update(PoseSample::identity_at(t));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let (sample, stats) = store.read().expect("store must hold data");

        let applied: HashSet<u64> = timestamps.iter().map(|t| *t as u64).collect();
        assert!(applied.contains(&(sample.timestamp as u64)));
        assert_eq!(sample.status, PoseStatus::Valid);

        // All updates shared a status, so the count equals the number of
        // serialized updates.
        assert_eq!(stats.status_count, timestamps.len() as u64);

        // The delta was computed against one of the other applied samples.
        let previous = sample.timestamp - stats.delta_ms / 1000.0;
        assert!(
            stats.delta_ms == 0.0 || applied.contains(&(previous.round() as u64)),
            "delta {} not derivable from applied timestamps",
            stats.delta_ms
        );
    }

    /// Per-stream serialization: a sequential burst always leaves the last
    /// update visible.
    #[test]
    fn test_sequential_burst_last_wins() {
        let store = PoseStore::new();
        for i in 0..100 {
            store.update(PoseSample::identity_at(f64::from(i)));
        }

        let (sample, stats) = store.read().unwrap();
        assert_eq!(sample.timestamp, 99.0);
        assert_eq!(stats.status_count, 100);
        assert!((stats.delta_ms - 1000.0).abs() < 1e-9);
    }
}
