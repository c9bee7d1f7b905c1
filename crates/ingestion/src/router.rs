//! StreamRouter - wires the two fusion streams into the stores.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use contracts::{
    CoreError, FramePair, FusionSession, PointCloudCallback, PoseCallback, SessionCallbacks,
};
use sync_core::{FrameAligner, PointCloudStore, PoseStore};
use tracing::{debug, info, instrument};

use crate::IngestionMetrics;

/// Connects a fusion session's two stream callbacks to the stores.
///
/// The pose path touches only the pose store. The point-cloud path aligns the
/// frame against the pose valid at its timestamp (falling back to the pose
/// store's latest sample, read through that store's own lock) and then
/// updates the cloud store. Neither path ever holds both store locks at once,
/// and an error in one stream never reaches the other.
pub struct StreamRouter {
    session: Arc<dyn FusionSession>,
    pose_store: Arc<PoseStore>,
    cloud_store: Arc<PointCloudStore>,
    metrics: Arc<IngestionMetrics>,
    connected: Arc<AtomicBool>,
}

impl StreamRouter {
    /// Create a router over an unconnected session
    pub fn new(
        session: Arc<dyn FusionSession>,
        pose_store: Arc<PoseStore>,
        cloud_store: Arc<PointCloudStore>,
    ) -> Self {
        Self {
            session,
            pose_store,
            cloud_store,
            metrics: Arc::new(IngestionMetrics::new()),
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fetch extrinsics, build both callbacks, and start stream delivery.
    ///
    /// Idempotent: a second call on a connected router is a no-op.
    #[instrument(name = "router_connect", skip(self))]
    pub fn connect(&self) -> Result<(), CoreError> {
        if self.connected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        // Calibration is fetched once here and cached in the aligner for the
        // whole session.
        let extrinsics = match self.session.extrinsics() {
            Ok(extrinsics) => extrinsics,
            Err(err) => {
                self.connected.store(false, Ordering::SeqCst);
                return Err(err);
            }
        };
        let aligner = Arc::new(Mutex::new(FrameAligner::new(&extrinsics)));

        let callbacks = SessionCallbacks {
            on_pose: self.pose_callback(),
            on_point_cloud: self.point_cloud_callback(aligner),
        };

        if let Err(err) = self.session.connect(callbacks) {
            self.connected.store(false, Ordering::SeqCst);
            return Err(err);
        }

        info!("stream router connected");
        Ok(())
    }

    /// Stop stream delivery. Stores keep their last data.
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!("stream router disconnecting");
            self.session.disconnect();
        }
    }

    /// Whether the streams are currently delivering
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Shared ingest counters
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    fn pose_callback(&self) -> PoseCallback {
        let pose_store = self.pose_store.clone();
        let metrics = self.metrics.clone();
        let connected = self.connected.clone();

        Arc::new(move |sample| {
            if !connected.load(Ordering::Relaxed) {
                return;
            }
            let stats = pose_store.update(sample);
            metrics.record_pose();
            metrics::counter!("ingest_packets_total", "stream" => "pose").increment(1);
            metrics::histogram!("ingest_pose_delta_ms").record(stats.delta_ms);
        })
    }

    fn point_cloud_callback(&self, aligner: Arc<Mutex<FrameAligner>>) -> PointCloudCallback {
        let pose_store = self.pose_store.clone();
        let cloud_store = self.cloud_store.clone();
        let metrics = self.metrics.clone();
        let connected = self.connected.clone();
        // The session ends up owning this callback; a strong reference here
        // would cycle, so the pose query goes through a weak handle.
        let session: Weak<dyn FusionSession> = Arc::downgrade(&self.session);

        Arc::new(move |mut frame| {
            if !connected.load(Ordering::Relaxed) {
                return;
            }

            let most_recent = pose_store.latest_sample();
            let outcome = {
                let mut aligner = aligner.lock().unwrap_or_else(PoisonError::into_inner);
                aligner.align(
                    &mut frame,
                    |timestamp| match session.upgrade() {
                        Some(session) => {
                            session.pose_at(timestamp, FramePair::world_to_device())
                        }
                        None => Err(CoreError::pose_query(timestamp, "session dropped")),
                    },
                    most_recent,
                )
            };
            metrics.record_align(outcome);

            let stats = cloud_store.update(frame);
            metrics.record_cloud();
            metrics::counter!("ingest_packets_total", "stream" => "point_cloud").increment(1);
            metrics::histogram!("ingest_cloud_delta_ms").record(stats.frame_delta_ms);
        })
    }
}

impl Drop for StreamRouter {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFusionSession, MockSessionConfig};
    use std::time::Duration;
    use sync_core::AlignOutcome;
    use tokio::time::timeout;

    fn fast_config() -> MockSessionConfig {
        MockSessionConfig {
            pose_rate_hz: 200.0,
            depth_rate_hz: 50.0,
            depth_points: 32,
            ..Default::default()
        }
    }

    fn router_for(config: MockSessionConfig) -> StreamRouter {
        StreamRouter::new(
            Arc::new(MockFusionSession::new(config)),
            Arc::new(PoseStore::new()),
            Arc::new(PointCloudStore::new()),
        )
    }

    async fn wait_until<F: Fn() -> bool>(condition: F) {
        timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_streams_reach_stores() {
        let router = router_for(fast_config());
        router.connect().unwrap();

        let metrics = router.metrics();
        wait_until(|| {
            let snapshot = metrics.snapshot();
            snapshot.pose_updates > 0 && snapshot.cloud_frames > 0
        })
        .await;

        router.disconnect();
        assert!(!router.is_connected());

        let snapshot = metrics.snapshot();
        assert!(snapshot.pose_updates > 0);
        assert!(snapshot.cloud_frames > 0);
        // Every stored frame went through alignment (a callback may still be
        // mid-flight at disconnect, so alignments can lead by one).
        let aligned = snapshot.align_exact + snapshot.align_approximate + snapshot.align_stale;
        assert!(aligned >= snapshot.cloud_frames);
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let router = router_for(fast_config());
        router.connect().unwrap();
        router.connect().unwrap();
        assert!(router.is_connected());
        router.disconnect();
    }

    #[tokio::test]
    async fn test_query_failure_degrades_not_fatal() {
        let config = MockSessionConfig {
            fail_pose_queries: true,
            ..fast_config()
        };
        let router = router_for(config);
        router.connect().unwrap();

        let metrics = router.metrics();
        wait_until(|| metrics.snapshot().cloud_frames > 2).await;
        router.disconnect();

        let snapshot = metrics.snapshot();
        // Every frame still landed in the store; none aligned exactly.
        assert_eq!(snapshot.align_exact, 0);
        assert!(snapshot.align_approximate + snapshot.align_stale >= snapshot.cloud_frames);
    }

    #[test]
    fn test_align_outcome_labels() {
        assert_eq!(AlignOutcome::Exact.as_str(), "exact");
        assert_eq!(AlignOutcome::Approximate.as_str(), "approximate");
        assert_eq!(AlignOutcome::Stale.as_str(), "stale");
    }
}
