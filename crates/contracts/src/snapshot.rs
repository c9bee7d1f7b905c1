//! Snapshot - SnapshotPublisher output
//!
//! Immutable, internally-consistent copy of both stores, taken under brief
//! per-store mutual exclusion and handed to telemetry consumers.

use serde::{Deserialize, Serialize};

use crate::{PoseSample, PoseStats};

/// Point-cloud metadata carried in a snapshot
///
/// Deliberately excludes the raw coordinate buffer: snapshots are telemetry,
/// the renderer reads frames through the store's own path.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PointCloudSummary {
    /// Timestamp of the latest frame (seconds)
    pub timestamp: f64,

    /// Points in the latest frame
    pub point_count: u32,

    /// Inter-frame delta of the latest frame (milliseconds)
    pub frame_delta_ms: f64,

    /// Mean z over the latest frame's points (0.0 for an empty frame)
    pub average_z: f64,
}

/// Telemetry snapshot
///
/// Only published once at least one pose has arrived; the point-cloud side is
/// `None` until the first depth frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Delivery sequence number (monotonically increasing)
    pub seq: u64,

    /// Latest pose sample
    pub pose: PoseSample,

    /// Statistics paired with exactly that sample
    pub pose_stats: PoseStats,

    /// Latest point-cloud metadata, if any frame has arrived
    pub cloud: Option<PointCloudSummary>,
}
