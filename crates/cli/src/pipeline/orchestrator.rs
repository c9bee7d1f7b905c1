//! Pipeline orchestrator - coordinates all components.
//!
//! Wires the fusion session through the stream router into the stores, runs
//! the snapshot publisher against them, and feeds published snapshots to the
//! dispatcher. This build drives the mock session; a hardware-backed session
//! plugs in behind the same `FusionSession` trait.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{FusionSession, PipelineBlueprint};
use ingestion::{MockFusionSession, MockSessionConfig, StreamRouter};
use observability::record_snapshot_metrics;
use sync_core::{PointCloudStore, PoseStore, SnapshotPublisher};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The pipeline blueprint
    pub blueprint: PipelineBlueprint,

    /// Maximum number of snapshots to publish (None = unlimited)
    pub max_snapshots: Option<u64>,

    /// Run duration (None = until the channel closes or Ctrl-C)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize metrics exporter (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Stores and session
        let pose_store = Arc::new(PoseStore::new());
        let cloud_store = Arc::new(PointCloudStore::new());

        let session: Arc<dyn FusionSession> = Arc::new(MockFusionSession::new(
            MockSessionConfig::from(&blueprint.session),
        ));

        info!(
            pose_rate_hz = blueprint.session.pose_rate_hz,
            depth_rate_hz = blueprint.session.depth_rate_hz,
            depth_points = blueprint.session.depth_points,
            "Running with mock fusion session"
        );

        let router = StreamRouter::new(session, pose_store.clone(), cloud_store.clone());

        // Dispatcher
        info!("Setting up dispatcher...");
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - snapshots will be dropped");
        }

        let (dispatch_tx, dispatch_rx) = mpsc::channel(blueprint.publisher.channel_capacity);
        let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), dispatch_rx)
            .await
            .context("Failed to create dispatcher")?;

        let active_sinks = blueprint.sinks.len();
        let dispatcher_handle = dispatcher.spawn();
        info!(active_sinks, "Dispatcher started");

        // Connect the streams
        router
            .connect()
            .context("Failed to connect fusion session")?;
        info!("Stream router connected");

        // Publisher
        let (snapshot_tx, mut snapshot_rx) = mpsc::channel(blueprint.publisher.channel_capacity);
        let publisher = SnapshotPublisher::new(
            pose_store,
            cloud_store,
            Duration::from_millis(blueprint.publisher.period_ms),
        );
        let publisher_handle = publisher.spawn(snapshot_tx);

        info!(
            period_ms = blueprint.publisher.period_ms,
            max_snapshots = ?self.config.max_snapshots,
            duration = ?self.config.duration,
            "Pipeline running"
        );

        // Consume published snapshots until a stop condition is reached
        let mut stats = PipelineStats {
            active_sinks,
            ..Default::default()
        };
        let deadline = self
            .config
            .duration
            .map(|duration| tokio::time::Instant::now() + duration);

        loop {
            let received = match deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, snapshot_rx.recv()).await {
                        Ok(received) => received,
                        Err(_) => {
                            info!("Run duration reached");
                            break;
                        }
                    }
                }
                None => snapshot_rx.recv().await,
            };

            let Some(snapshot) = received else {
                break;
            };

            stats.snapshots_published += 1;
            record_snapshot_metrics(&snapshot);
            stats.aggregator.update(&snapshot);

            info!(
                seq = snapshot.seq,
                pose_t = format!("{:.3}", snapshot.pose.timestamp),
                status = snapshot.pose.status.as_str(),
                delta_ms = format!("{:.2}", snapshot.pose_stats.delta_ms),
                points = snapshot.cloud.map(|c| c.point_count).unwrap_or(0),
                "Snapshot published"
            );

            if dispatch_tx.send(snapshot).await.is_err() {
                warn!("Dispatcher channel closed");
                break;
            }

            if let Some(max) = self.config.max_snapshots {
                if stats.snapshots_published >= max {
                    info!(snapshots = stats.snapshots_published, "Reached max snapshots");
                    break;
                }
            }
        }

        // Shutdown: stop the publisher, then the streams, then drain sinks
        info!("Shutting down pipeline...");
        stats.publisher = publisher_handle.shutdown().await;
        router.disconnect();
        stats.ingest = router.metrics().snapshot();

        drop(dispatch_tx);
        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            snapshots = stats.snapshots_published,
            rate = format!("{:.2}", stats.snapshot_rate()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
