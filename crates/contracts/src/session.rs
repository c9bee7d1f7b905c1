//! FusionSession trait - sensor-fusion service abstraction
//!
//! The fusion service owns pose tracking and depth computation; this trait is
//! the collaborator boundary the pipeline talks to. Real hardware bindings
//! and the mock implementation both live behind it.

use std::sync::Arc;

use crate::{CoreError, FramePair, PointCloudFrame, PoseSample, SessionExtrinsics};

/// Passing this timestamp to [`FusionSession::pose_at`] requests the most
/// recent pose instead of a historical one (service convention).
pub const LATEST_POSE: f64 = 0.0;

/// Pose stream callback
///
/// Invoked serially per stream: the service never re-enters a stream's
/// callback concurrently with itself, but pose and point-cloud callbacks may
/// run on different threads at the same time.
pub type PoseCallback = Arc<dyn Fn(PoseSample) + Send + Sync>;

/// Point-cloud stream callback; same serial-per-stream guarantee.
pub type PointCloudCallback = Arc<dyn Fn(PointCloudFrame) + Send + Sync>;

/// The two per-stream listeners registered at connect time
#[derive(Clone)]
pub struct SessionCallbacks {
    pub on_pose: PoseCallback,
    pub on_point_cloud: PointCloudCallback,
}

/// Sensor-fusion session
///
/// # Design Principles
///
/// 1. **Collaborator boundary**: everything the service computes (tracking,
///    depth, frame transforms) stays behind this trait
/// 2. **Callback pattern**: streams push via callbacks, matching the native
///    service API, instead of channels
/// 3. **Recoverable queries**: `pose_at` failure is an expected, per-frame
///    recoverable condition, not a session failure
pub trait FusionSession: Send + Sync {
    /// Register both stream listeners and start delivery.
    ///
    /// Calling `connect` on an already-connected session is idempotent.
    fn connect(&self, callbacks: SessionCallbacks) -> Result<(), CoreError>;

    /// Stop stream delivery. Queries may still fail afterwards; reads of
    /// previously delivered data stay valid.
    fn disconnect(&self);

    /// Whether stream delivery is active
    fn is_connected(&self) -> bool;

    /// Pose of `pair.target` in `pair.base` as of `timestamp`.
    ///
    /// `timestamp == LATEST_POSE` requests the most recent pose. Services
    /// without pose history answer every query with the most recent pose;
    /// callers treat the result as an approximation in that case.
    fn pose_at(&self, timestamp: f64, pair: FramePair) -> Result<PoseSample, CoreError>;

    /// One-time calibration between sensor frames; stable for the whole
    /// session, so callers cache the result.
    fn extrinsics(&self) -> Result<SessionExtrinsics, CoreError>;
}
