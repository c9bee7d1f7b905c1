//! Pipeline statistics and final report.

use std::time::Duration;

use ingestion::MetricsSnapshot;
use observability::SnapshotAggregator;
use sync_core::PublisherReport;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Snapshots consumed from the publisher
    pub snapshots_published: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Ingest counters collected from the stream router
    pub ingest: MetricsSnapshot,

    /// Publisher loop counters
    pub publisher: PublisherReport,

    /// Aggregated snapshot statistics
    pub aggregator: SnapshotAggregator,
}

impl PipelineStats {
    /// Snapshots per second over the whole run
    pub fn snapshot_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.snapshots_published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("  - Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  - Snapshots published: {}", self.snapshots_published);
        println!("  - Snapshot rate: {:.2}/s", self.snapshot_rate());
        println!("  - Active sinks: {}", self.active_sinks);

        println!("\nIngest");
        println!("  - Pose updates: {}", self.ingest.pose_updates);
        println!("  - Point-cloud frames: {}", self.ingest.cloud_frames);
        println!(
            "  - Alignments: {} exact / {} approximate / {} stale",
            self.ingest.align_exact, self.ingest.align_approximate, self.ingest.align_stale
        );

        println!("\nPublisher");
        println!("  - Delivered: {}", self.publisher.delivered);
        println!("  - Empty ticks skipped: {}", self.publisher.skipped_empty);
        println!("  - Dropped (consumer full): {}", self.publisher.dropped_full);

        println!("\n{}", self.aggregator.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_rate() {
        let stats = PipelineStats {
            snapshots_published: 50,
            duration: Duration::from_secs(10),
            ..Default::default()
        };
        assert!((stats.snapshot_rate() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_rate_zero_duration() {
        let stats = PipelineStats::default();
        assert_eq!(stats.snapshot_rate(), 0.0);
    }
}
