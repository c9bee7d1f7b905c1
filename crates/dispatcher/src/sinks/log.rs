//! LogSink - logs snapshot summaries via tracing

use contracts::{CoreError, Snapshot, TelemetrySink};
use tracing::{info, instrument};

/// Sink that logs snapshot summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_snapshot_summary(&self, snapshot: &Snapshot) {
        let (points, average_z) = snapshot
            .cloud
            .map(|cloud| (cloud.point_count, cloud.average_z))
            .unwrap_or((0, 0.0));

        info!(
            sink = %self.name,
            seq = snapshot.seq,
            pose_t = format!("{:.3}", snapshot.pose.timestamp),
            status = snapshot.pose.status.as_str(),
            status_count = snapshot.pose_stats.status_count,
            delta_ms = format!("{:.2}", snapshot.pose_stats.delta_ms),
            points,
            average_z = format!("{:.3}", average_z),
            "snapshot received"
        );
    }
}

impl TelemetrySink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, snapshot),
        fields(sink = %self.name, seq = snapshot.seq)
    )]
    async fn write(&mut self, snapshot: &Snapshot) -> Result<(), CoreError> {
        self.log_snapshot_summary(snapshot);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CoreError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CoreError> {
        info!(sink = %self.name, "log sink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PointCloudSummary, PoseSample, PoseStats};

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let snapshot = Snapshot {
            seq: 1,
            pose: PoseSample::identity_at(1.0),
            pose_stats: PoseStats::default(),
            cloud: Some(PointCloudSummary {
                timestamp: 0.9,
                point_count: 128,
                frame_delta_ms: 200.0,
                average_z: 1.5,
            }),
        };

        let result = sink.write(&snapshot).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
