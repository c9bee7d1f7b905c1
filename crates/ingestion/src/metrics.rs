//! Per-stream ingest counters

use std::sync::atomic::{AtomicU64, Ordering};

use sync_core::AlignOutcome;

/// Ingestion metrics
///
/// Shared by both stream callbacks; all counters are relaxed atomics, read
/// out once at the end of a run via `snapshot`.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Pose updates applied
    pose_updates: AtomicU64,

    /// Point-cloud frames stored
    cloud_frames: AtomicU64,

    /// Frames aligned with a historical pose
    align_exact: AtomicU64,

    /// Frames aligned with the most recent pose instead
    align_approximate: AtomicU64,

    /// Frames left on the previous placement
    align_stale: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pose update
    pub fn record_pose(&self) {
        self.pose_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a stored point-cloud frame
    pub fn record_cloud(&self) {
        self.cloud_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how a frame's pose was resolved
    pub fn record_align(&self, outcome: AlignOutcome) {
        let counter = match outcome {
            AlignOutcome::Exact => &self.align_exact,
            AlignOutcome::Approximate => &self.align_approximate,
            AlignOutcome::Stale => &self.align_stale,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pose_updates: self.pose_updates.load(Ordering::Relaxed),
            cloud_frames: self.cloud_frames.load(Ordering::Relaxed),
            align_exact: self.align_exact.load(Ordering::Relaxed),
            align_approximate: self.align_approximate.load(Ordering::Relaxed),
            align_stale: self.align_stale.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub pose_updates: u64,
    pub cloud_frames: u64,
    pub align_exact: u64,
    pub align_approximate: u64,
    pub align_stale: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = IngestionMetrics::new();
        metrics.record_pose();
        metrics.record_pose();
        metrics.record_cloud();
        metrics.record_align(AlignOutcome::Exact);
        metrics.record_align(AlignOutcome::Stale);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pose_updates, 2);
        assert_eq!(snapshot.cloud_frames, 1);
        assert_eq!(snapshot.align_exact, 1);
        assert_eq!(snapshot.align_approximate, 0);
        assert_eq!(snapshot.align_stale, 1);
    }
}
