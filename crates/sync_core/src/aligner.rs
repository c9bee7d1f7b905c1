//! FrameAligner - cross-stream pose/point-cloud alignment.

use contracts::{CoreError, Matrix4, PointCloudFrame, PoseSample, SessionExtrinsics};
use nalgebra as na;
use tracing::{debug, instrument, warn};

use crate::transform;

/// How the pose for a frame was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOutcome {
    /// Pose at the frame's own timestamp
    Exact,
    /// Query failed; the most recent pose stood in (known accuracy loss)
    Approximate,
    /// No pose at all; the previous placement was kept
    Stale,
}

impl AlignOutcome {
    /// Stable label for logs and metric tags
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Approximate => "approximate",
            Self::Stale => "stale",
        }
    }
}

/// Resolves each arriving point-cloud frame's placement transform from the
/// pose valid at its capture timestamp.
///
/// Calibration extrinsics are fixed per session, so the composed
/// device-from-camera matrix is computed once at construction. The aligner
/// also remembers the last placement it produced: a frame is never left
/// without a transform, even when every pose source fails.
#[derive(Debug)]
pub struct FrameAligner {
    device_from_camera: na::Matrix4<f32>,
    last_placement: Matrix4,
    stale_count: u64,
}

impl FrameAligner {
    pub fn new(extrinsics: &SessionExtrinsics) -> Self {
        Self {
            device_from_camera: transform::device_from_camera(extrinsics),
            last_placement: Matrix4::IDENTITY,
            stale_count: 0,
        }
    }

    /// Set `frame.model_matrix` from the pose correlated with its timestamp.
    ///
    /// `query` is the session's pose-as-of-timestamp capability;
    /// `most_recent` is the pose store's current sample, used when the query
    /// fails. Both failing is still recoverable: the previous placement
    /// stays, stale but present.
    #[instrument(
        name = "frame_align",
        level = "trace",
        skip(self, frame, query, most_recent),
        fields(timestamp = frame.timestamp, points = frame.point_count)
    )]
    pub fn align<Q>(
        &mut self,
        frame: &mut PointCloudFrame,
        query: Q,
        most_recent: Option<PoseSample>,
    ) -> AlignOutcome
    where
        Q: FnOnce(f64) -> Result<PoseSample, CoreError>,
    {
        let outcome = match query(frame.timestamp) {
            Ok(pose) => {
                self.place(frame, &pose);
                AlignOutcome::Exact
            }
            Err(err) => match most_recent {
                Some(pose) => {
                    debug!(
                        timestamp = frame.timestamp,
                        pose_timestamp = pose.timestamp,
                        error = %err,
                        "pose query failed, using most recent pose"
                    );
                    self.place(frame, &pose);
                    AlignOutcome::Approximate
                }
                None => {
                    self.stale_count += 1;
                    warn!(
                        timestamp = frame.timestamp,
                        stale_total = self.stale_count,
                        error = %err,
                        "no pose available, keeping previous placement"
                    );
                    frame.model_matrix = self.last_placement;
                    AlignOutcome::Stale
                }
            },
        };

        metrics::counter!("sync_align_total", "outcome" => outcome.as_str()).increment(1);
        outcome
    }

    fn place(&mut self, frame: &mut PointCloudFrame, pose: &PoseSample) {
        let placement =
            transform::to_contract(&(transform::world_from_device(pose) * self.device_from_camera));
        frame.model_matrix = placement;
        self.last_placement = placement;
    }

    /// Placement produced by the most recent successful alignment
    /// (identity before the first one).
    pub fn last_placement(&self) -> Matrix4 {
        self.last_placement
    }

    /// Frames that kept a stale placement so far
    pub fn stale_count(&self) -> u64 {
        self.stale_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{PoseStatus, Quaternion, Vector3};

    fn empty_frame(timestamp: f64) -> PointCloudFrame {
        PointCloudFrame::new(timestamp, 0, Bytes::new())
    }

    fn pose_at(timestamp: f64, x: f64) -> PoseSample {
        PoseSample {
            timestamp,
            translation: Vector3 { x, y: 0.0, z: 0.0 },
            rotation: Quaternion::IDENTITY,
            status: PoseStatus::Valid,
        }
    }

    #[test]
    fn test_exact_alignment_sets_placement() {
        let mut aligner = FrameAligner::new(&SessionExtrinsics::default());
        let mut frame = empty_frame(1.0);

        let outcome = aligner.align(&mut frame, |t| Ok(pose_at(t, 2.5)), None);

        assert_eq!(outcome, AlignOutcome::Exact);
        assert_eq!(frame.model_matrix.translation(), [2.5, 0.0, 0.0]);
        assert_eq!(aligner.last_placement(), frame.model_matrix);
    }

    #[test]
    fn test_query_failure_uses_most_recent_pose() {
        let mut aligner = FrameAligner::new(&SessionExtrinsics::default());
        let mut frame = empty_frame(1.0);

        let outcome = aligner.align(
            &mut frame,
            |t| Err(CoreError::pose_query(t, "history exhausted")),
            Some(pose_at(0.9, 1.0)),
        );

        assert_eq!(outcome, AlignOutcome::Approximate);
        assert_eq!(frame.model_matrix.translation(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_total_failure_keeps_previous_placement() {
        let mut aligner = FrameAligner::new(&SessionExtrinsics::default());

        let mut first = empty_frame(1.0);
        aligner.align(&mut first, |t| Ok(pose_at(t, 3.0)), None);

        let mut second = empty_frame(1.2);
        let outcome = aligner.align(
            &mut second,
            |t| Err(CoreError::pose_query(t, "session gone")),
            None,
        );

        assert_eq!(outcome, AlignOutcome::Stale);
        // Stale but present: the previous frame's placement, never identity-reset.
        assert_eq!(second.model_matrix, first.model_matrix);
        assert_eq!(aligner.stale_count(), 1);
    }

    #[test]
    fn test_stale_before_any_alignment_is_identity() {
        let mut aligner = FrameAligner::new(&SessionExtrinsics::default());
        let mut frame = empty_frame(0.5);

        let outcome = aligner.align(
            &mut frame,
            |t| Err(CoreError::pose_query(t, "not started")),
            None,
        );

        assert_eq!(outcome, AlignOutcome::Stale);
        assert_eq!(frame.model_matrix, Matrix4::IDENTITY);
    }
}
