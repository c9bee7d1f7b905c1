//! SnapshotPublisher - periodic consistent snapshots of both stores.

use std::sync::Arc;
use std::time::Duration;

use contracts::Snapshot;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::{PointCloudStore, PoseStore};

/// Publishes a read-only snapshot of both stores on a fixed period,
/// independent of either ingest cadence.
///
/// Each tick takes the pose store's lock, then the point-cloud store's lock
/// (always in that order), copies the values out, releases, and delivers the
/// snapshot without blocking: a full consumer channel drops the snapshot, a
/// closed one stops the loop. A tick before the first pose is a no-op.
pub struct SnapshotPublisher {
    pose_store: Arc<PoseStore>,
    cloud_store: Arc<PointCloudStore>,
    period: Duration,
}

impl SnapshotPublisher {
    pub fn new(
        pose_store: Arc<PoseStore>,
        cloud_store: Arc<PointCloudStore>,
        period: Duration,
    ) -> Self {
        Self {
            pose_store,
            cloud_store,
            period,
        }
    }

    /// Start the tick loop, delivering into `tx`. The returned handle stops
    /// the loop on `shutdown()`.
    pub fn spawn(self, tx: mpsc::Sender<Snapshot>) -> PublisherHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let worker = tokio::spawn(publisher_loop(self, tx, stop_rx));

        PublisherHandle {
            stop: stop_tx,
            worker,
        }
    }
}

/// Handle to a running publisher
pub struct PublisherHandle {
    stop: watch::Sender<bool>,
    worker: JoinHandle<PublisherReport>,
}

impl PublisherHandle {
    /// Stop ticking and wait for the loop to exit.
    pub async fn shutdown(self) -> PublisherReport {
        let _ = self.stop.send(true);
        self.worker.await.unwrap_or_default()
    }
}

/// Final publisher counters
#[derive(Debug, Clone, Copy, Default)]
pub struct PublisherReport {
    /// Snapshots handed to the consumer
    pub delivered: u64,

    /// Ticks skipped because no pose had arrived yet
    pub skipped_empty: u64,

    /// Snapshots dropped because the consumer channel was full
    pub dropped_full: u64,
}

async fn publisher_loop(
    publisher: SnapshotPublisher,
    tx: mpsc::Sender<Snapshot>,
    mut stop: watch::Receiver<bool>,
) -> PublisherReport {
    let mut interval = tokio::time::interval(publisher.period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut report = PublisherReport::default();
    let mut seq: u64 = 0;

    debug!(period_ms = publisher.period.as_millis() as u64, "snapshot publisher started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Lock order: pose store first, then point-cloud store.
                let Some((pose, pose_stats)) = publisher.pose_store.read() else {
                    report.skipped_empty += 1;
                    trace!("no pose yet, tick skipped");
                    continue;
                };
                let cloud = publisher.cloud_store.read();

                seq += 1;
                let snapshot = Snapshot { seq, pose, pose_stats, cloud };

                match tx.try_send(snapshot) {
                    Ok(()) => {
                        report.delivered += 1;
                        metrics::counter!("sync_snapshots_total", "status" => "delivered").increment(1);
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        report.dropped_full += 1;
                        metrics::counter!("sync_snapshots_total", "status" => "dropped").increment(1);
                        warn!(seq, "snapshot channel full, dropping");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        debug!("snapshot consumer closed, stopping publisher");
                        break;
                    }
                }
            }
            _ = stop.changed() => {
                break;
            }
        }
    }

    debug!(
        delivered = report.delivered,
        skipped = report.skipped_empty,
        dropped = report.dropped_full,
        "snapshot publisher stopped"
    );
    report
}
