//! Mock Pipeline Demo
//!
//! Runs the full pipeline against the mock fusion session: pose and depth
//! streams into the stores, periodic snapshots out to a log sink.
//!
//! Run with: cargo run --bin mock_pipeline [config.toml]

use std::sync::Arc;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{FusionSession, PipelineBlueprint, SinkConfig, SinkType, Snapshot};
use ingestion::{MockFusionSession, MockSessionConfig, StreamRouter};
use sync_core::{PointCloudStore, PoseStore, SnapshotPublisher};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mock Pipeline Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading blueprint config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        create_test_blueprint()
    };

    // ==== Stage 2: Stores and mock session ====
    let pose_store = Arc::new(PoseStore::new());
    let cloud_store = Arc::new(PointCloudStore::new());

    let session: Arc<dyn FusionSession> = Arc::new(MockFusionSession::new(
        MockSessionConfig::from(&blueprint.session),
    ));

    // ==== Stage 3: Dispatcher ====
    tracing::info!(sinks = blueprint.sinks.len(), "Setting up dispatcher");
    let (dispatch_tx, dispatch_rx) = mpsc::channel::<Snapshot>(blueprint.publisher.channel_capacity);
    let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), dispatch_rx).await?;
    let dispatcher_handle = dispatcher.spawn();

    // ==== Stage 4: Connect streams ====
    let router = StreamRouter::new(session, pose_store.clone(), cloud_store.clone());
    router.connect()?;
    tracing::info!("Stream router connected");

    // ==== Stage 5: Publish snapshots ====
    let (snapshot_tx, mut snapshot_rx) = mpsc::channel(blueprint.publisher.channel_capacity);
    let publisher = SnapshotPublisher::new(
        pose_store,
        cloud_store,
        Duration::from_millis(blueprint.publisher.period_ms),
    );
    let publisher_handle = publisher.spawn(snapshot_tx);

    let target_snapshots = 50u64;
    tracing::info!(target = target_snapshots, "Running pipeline");

    let forward = async {
        let mut forwarded = 0u64;
        while forwarded < target_snapshots {
            let Some(snapshot) = snapshot_rx.recv().await else {
                break;
            };

            tracing::info!(
                seq = snapshot.seq,
                pose_t = format!("{:.3}", snapshot.pose.timestamp),
                status = snapshot.pose.status.as_str(),
                points = snapshot.cloud.map(|c| c.point_count).unwrap_or(0),
                "Snapshot published"
            );

            if dispatch_tx.send(snapshot).await.is_err() {
                break;
            }
            forwarded += 1;
        }
        forwarded
    };

    let forwarded = tokio::time::timeout(Duration::from_secs(30), forward)
        .await
        .unwrap_or(0);

    // ==== Stage 6: Cleanup ====
    tracing::info!("Shutting down...");
    let report = publisher_handle.shutdown().await;
    router.disconnect();
    drop(dispatch_tx);
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

    let ingest = router.metrics().snapshot();
    tracing::info!(
        snapshots = forwarded,
        delivered = report.delivered,
        pose_updates = ingest.pose_updates,
        cloud_frames = ingest.cloud_frames,
        "Pipeline completed"
    );

    Ok(())
}

fn create_test_blueprint() -> PipelineBlueprint {
    use std::collections::HashMap;

    PipelineBlueprint {
        sinks: vec![SinkConfig {
            name: "demo_log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 50,
            params: HashMap::new(),
        }],
        ..Default::default()
    }
}
