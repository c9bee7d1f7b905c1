//! Snapshot metric collection
//!
//! Records published snapshots into the metrics facade and aggregates them in
//! memory for the end-of-run summary.

use std::collections::HashMap;

use contracts::Snapshot;
use metrics::{counter, gauge, histogram};

/// Record metrics from a published snapshot
///
/// Call once per snapshot delivered by the publisher.
///
/// # Example
///
/// ```ignore
/// use observability::record_snapshot_metrics;
///
/// while let Some(snapshot) = snapshot_rx.recv().await {
///     record_snapshot_metrics(&snapshot);
///     // ...
/// }
/// ```
pub fn record_snapshot_metrics(snapshot: &Snapshot) {
    counter!("pointcloud_syncer_snapshots_total").increment(1);

    // Sequence number (gaps reveal dropped snapshots)
    gauge!("pointcloud_syncer_last_snapshot_seq").set(snapshot.seq as f64);

    // Pose stream
    histogram!("pointcloud_syncer_pose_delta_ms").record(snapshot.pose_stats.delta_ms);
    gauge!("pointcloud_syncer_pose_status_count").set(snapshot.pose_stats.status_count as f64);
    counter!(
        "pointcloud_syncer_pose_status_total",
        "status" => snapshot.pose.status.as_str()
    )
    .increment(1);

    if snapshot.pose.status != snapshot.pose_stats.previous_status {
        counter!("pointcloud_syncer_pose_status_transitions_total").increment(1);
    }

    // Point-cloud stream (absent until the first depth frame)
    if let Some(cloud) = &snapshot.cloud {
        gauge!("pointcloud_syncer_cloud_points").set(f64::from(cloud.point_count));
        histogram!("pointcloud_syncer_cloud_delta_ms").record(cloud.frame_delta_ms);
        gauge!("pointcloud_syncer_cloud_average_z").set(cloud.average_z);
        histogram!("pointcloud_syncer_cloud_average_z_hist").record(cloud.average_z);
    } else {
        counter!("pointcloud_syncer_snapshots_without_cloud_total").increment(1);
    }
}

/// Snapshot aggregator
///
/// Aggregates snapshot statistics in memory for the final report.
#[derive(Debug, Clone, Default)]
pub struct SnapshotAggregator {
    /// Total snapshots seen
    pub total_snapshots: u64,

    /// Snapshots with no point-cloud data yet
    pub snapshots_without_cloud: u64,

    /// Pose status transitions observed across snapshots
    pub status_transitions: u64,

    /// Pose delta-time statistics (ms)
    pub pose_delta_stats: RunningStats,

    /// Point-cloud inter-frame delta statistics (ms)
    pub cloud_delta_stats: RunningStats,

    /// Average-z statistics
    pub average_z_stats: RunningStats,

    /// Point-count statistics
    pub point_count_stats: RunningStats,

    /// Snapshots seen per pose status
    pub status_counts: HashMap<&'static str, u64>,
}

impl SnapshotAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregate statistics
    pub fn update(&mut self, snapshot: &Snapshot) {
        self.total_snapshots += 1;

        self.pose_delta_stats.push(snapshot.pose_stats.delta_ms);
        *self
            .status_counts
            .entry(snapshot.pose.status.as_str())
            .or_insert(0) += 1;

        if snapshot.pose.status != snapshot.pose_stats.previous_status {
            self.status_transitions += 1;
        }

        match &snapshot.cloud {
            Some(cloud) => {
                self.cloud_delta_stats.push(cloud.frame_delta_ms);
                self.average_z_stats.push(cloud.average_z);
                self.point_count_stats.push(f64::from(cloud.point_count));
            }
            None => self.snapshots_without_cloud += 1,
        }
    }

    /// Produce a summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_snapshots: self.total_snapshots,
            snapshots_without_cloud: self.snapshots_without_cloud,
            status_transitions: self.status_transitions,
            pose_delta_ms: StatsSummary::from(&self.pose_delta_stats),
            cloud_delta_ms: StatsSummary::from(&self.cloud_delta_stats),
            average_z: StatsSummary::from(&self.average_z_stats),
            point_count: StatsSummary::from(&self.point_count_stats),
            status_counts: self.status_counts.clone(),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_snapshots: u64,
    pub snapshots_without_cloud: u64,
    pub status_transitions: u64,
    pub pose_delta_ms: StatsSummary,
    pub cloud_delta_ms: StatsSummary,
    pub average_z: StatsSummary,
    pub point_count: StatsSummary,
    pub status_counts: HashMap<&'static str, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Snapshot Metrics Summary ===")?;
        writeln!(f, "Total snapshots: {}", self.total_snapshots)?;
        writeln!(f, "Without point cloud: {}", self.snapshots_without_cloud)?;
        writeln!(f, "Pose status transitions: {}", self.status_transitions)?;
        writeln!(f, "Pose delta (ms): {}", self.pose_delta_ms)?;
        writeln!(f, "Cloud delta (ms): {}", self.cloud_delta_ms)?;
        writeln!(f, "Average z (m): {}", self.average_z)?;
        writeln!(f, "Point count: {}", self.point_count)?;

        if !self.status_counts.is_empty() {
            writeln!(f, "Status counts:")?;
            for (status, count) in &self.status_counts {
                writeln!(f, "  {}: {}", status, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum value
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum value
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PointCloudSummary, PoseSample, PoseStats, PoseStatus};

    fn snapshot(seq: u64, status: PoseStatus, previous: PoseStatus) -> Snapshot {
        Snapshot {
            seq,
            pose: PoseSample {
                status,
                ..PoseSample::identity_at(seq as f64 * 0.1)
            },
            pose_stats: PoseStats {
                status_count: 1,
                delta_ms: 10.0,
                previous_status: previous,
            },
            cloud: Some(PointCloudSummary {
                timestamp: seq as f64 * 0.1,
                point_count: 100,
                frame_delta_ms: 200.0,
                average_z: 1.5,
            }),
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = SnapshotAggregator::new();

        aggregator.update(&snapshot(1, PoseStatus::Valid, PoseStatus::Unknown));
        aggregator.update(&snapshot(2, PoseStatus::Valid, PoseStatus::Valid));

        assert_eq!(aggregator.total_snapshots, 2);
        assert_eq!(aggregator.status_transitions, 1);
        assert_eq!(aggregator.status_counts.get("valid"), Some(&2));
        assert_eq!(aggregator.average_z_stats.count(), 2);
        assert!((aggregator.average_z_stats.mean() - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_counts_missing_cloud() {
        let mut aggregator = SnapshotAggregator::new();
        let mut s = snapshot(1, PoseStatus::Valid, PoseStatus::Valid);
        s.cloud = None;
        aggregator.update(&s);

        assert_eq!(aggregator.snapshots_without_cloud, 1);
        assert_eq!(aggregator.cloud_delta_stats.count(), 0);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = SnapshotAggregator::new();
        aggregator.update(&snapshot(1, PoseStatus::Valid, PoseStatus::Unknown));

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Total snapshots: 1"));
        assert!(output.contains("valid: 1"));
    }
}
