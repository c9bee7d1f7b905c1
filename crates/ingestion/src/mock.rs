//! Mock fusion session
//!
//! Drives the pipeline without device hardware: synthetic pose trajectory,
//! synthetic depth sweeps, and a genuine historical pose query over a
//! bounded ring.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use contracts::{
    CoreError, FramePair, FusionSession, PointCloudFrame, PoseSample, PoseStatus, Quaternion,
    RigidTransform, SessionCallbacks, SessionConfig, SessionExtrinsics, Vector3, LATEST_POSE,
};
use tracing::{debug, trace};

use crate::history::PoseHistory;

/// Mock session configuration
#[derive(Debug, Clone)]
pub struct MockSessionConfig {
    /// Pose stream rate (Hz)
    pub pose_rate_hz: f64,

    /// Depth stream rate (Hz)
    pub depth_rate_hz: f64,

    /// Points per generated depth frame
    pub depth_points: u32,

    /// Pose samples retained for historical queries
    pub pose_history_depth: usize,

    /// Flip the reported status every N pose updates (exercises
    /// status-transition counting downstream)
    pub status_flip_every: Option<u64>,

    /// Make every pose query fail (exercises aligner fallback)
    pub fail_pose_queries: bool,
}

impl Default for MockSessionConfig {
    fn default() -> Self {
        Self {
            pose_rate_hz: 100.0,
            depth_rate_hz: 5.0,
            depth_points: 4096,
            pose_history_depth: 256,
            status_flip_every: None,
            fail_pose_queries: false,
        }
    }
}

impl From<&SessionConfig> for MockSessionConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            pose_rate_hz: config.pose_rate_hz,
            depth_rate_hz: config.depth_rate_hz,
            depth_points: config.depth_points,
            pose_history_depth: config.pose_history_depth,
            status_flip_every: config.status_flip_every,
            fail_pose_queries: false,
        }
    }
}

/// Mock fusion session
///
/// `connect` spawns one tokio task per stream; each runs until `disconnect`.
/// Pose samples land in the history ring before the callback fires, so a
/// depth frame arriving right after a pose can always resolve it.
pub struct MockFusionSession {
    config: MockSessionConfig,
    running: Arc<AtomicBool>,
    history: Arc<Mutex<PoseHistory>>,
    extrinsics: SessionExtrinsics,
}

impl MockFusionSession {
    /// Create a new mock session
    pub fn new(config: MockSessionConfig) -> Self {
        let history = PoseHistory::new(config.pose_history_depth);

        // Fixed plausible calibration: depth camera a few centimeters off
        // the IMU, device frame coincident with it.
        let extrinsics = SessionExtrinsics {
            device_to_imu: RigidTransform::default(),
            depth_camera_to_imu: RigidTransform {
                translation: Vector3 {
                    x: 0.02,
                    y: 0.0,
                    z: -0.05,
                },
                rotation: Quaternion::IDENTITY,
            },
        };

        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            history: Arc::new(Mutex::new(history)),
            extrinsics,
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, PoseHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tolerance for historical queries: two pose periods, floored at 50 ms
    fn query_tolerance(&self) -> f64 {
        (2.0 / self.config.pose_rate_hz.max(1.0)).max(0.05)
    }
}

impl FusionSession for MockFusionSession {
    fn connect(&self, callbacks: SessionCallbacks) -> Result<(), CoreError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let start = std::time::Instant::now();

        debug!(
            pose_rate_hz = self.config.pose_rate_hz,
            depth_rate_hz = self.config.depth_rate_hz,
            depth_points = self.config.depth_points,
            "mock fusion session started"
        );

        // Pose stream task
        {
            let running = self.running.clone();
            let history = self.history.clone();
            let on_pose = callbacks.on_pose.clone();
            let interval = Duration::from_secs_f64(1.0 / self.config.pose_rate_hz.max(1.0));
            let status_flip_every = self.config.status_flip_every;

            tokio::spawn(async move {
                let mut seq: u64 = 0;
                while running.load(Ordering::Relaxed) {
                    let timestamp = start.elapsed().as_secs_f64();
                    let sample = synth_pose(timestamp, seq, status_flip_every);
                    seq += 1;

                    history
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(sample);

                    trace!(timestamp, "mock pose emitted");
                    on_pose(sample);
                    tokio::time::sleep(interval).await;
                }
                debug!("mock pose stream stopped");
            });
        }

        // Depth stream task
        {
            let running = self.running.clone();
            let on_point_cloud = callbacks.on_point_cloud.clone();
            let interval = Duration::from_secs_f64(1.0 / self.config.depth_rate_hz.max(1.0));
            let depth_points = self.config.depth_points;

            tokio::spawn(async move {
                while running.load(Ordering::Relaxed) {
                    let timestamp = start.elapsed().as_secs_f64();
                    let frame = synth_cloud(timestamp, depth_points);

                    trace!(timestamp, points = depth_points, "mock depth frame emitted");
                    on_point_cloud(frame);
                    tokio::time::sleep(interval).await;
                }
                debug!("mock depth stream stopped");
            });
        }

        Ok(())
    }

    fn disconnect(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("mock fusion session disconnecting");
        }
    }

    fn is_connected(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn pose_at(&self, timestamp: f64, _pair: FramePair) -> Result<PoseSample, CoreError> {
        if self.config.fail_pose_queries {
            return Err(CoreError::pose_query(timestamp, "query failure injected"));
        }

        let history = self.lock_history();
        if timestamp == LATEST_POSE {
            return history
                .latest()
                .ok_or_else(|| CoreError::pose_query(timestamp, "no pose yet"));
        }

        history
            .nearest(timestamp, self.query_tolerance())
            .ok_or_else(|| CoreError::pose_query(timestamp, "no pose within tolerance"))
    }

    fn extrinsics(&self) -> Result<SessionExtrinsics, CoreError> {
        Ok(self.extrinsics)
    }
}

/// Smooth circular trajectory with an optional periodic status flip
fn synth_pose(timestamp: f64, seq: u64, status_flip_every: Option<u64>) -> PoseSample {
    let status = match status_flip_every {
        Some(n) if n > 0 && (seq / n) % 2 == 1 => PoseStatus::Invalid,
        _ => PoseStatus::Valid,
    };

    let angle = timestamp * 0.5;
    let half = angle / 2.0;

    PoseSample {
        timestamp,
        translation: Vector3 {
            x: angle.cos(),
            y: angle.sin(),
            z: 1.2,
        },
        // Yaw-only rotation tracking the heading
        rotation: Quaternion {
            x: 0.0,
            y: 0.0,
            z: half.sin(),
            w: half.cos(),
        },
        status,
    }
}

/// Deterministic undulating surface in front of the camera
fn synth_cloud(timestamp: f64, num_points: u32) -> PointCloudFrame {
    let mut coords: Vec<f32> = Vec::with_capacity(num_points as usize * 3);
    let denominator = num_points.max(1) as f32;

    for i in 0..num_points {
        let u = i as f32 / denominator;
        let x = u * 2.0 - 1.0;
        let y = (u * 37.0).sin() * 0.5;
        let z = 1.5 + 0.3 * (timestamp as f32 + u * std::f32::consts::TAU).sin();
        coords.extend_from_slice(&[x, y, z]);
    }

    PointCloudFrame::new(timestamp, num_points, pod_slice_to_bytes(&coords))
}

/// Convert a POD slice to `bytes::Bytes`
fn pod_slice_to_bytes<T: bytemuck::Pod>(slice: &[T]) -> Bytes {
    Bytes::copy_from_slice(bytemuck::cast_slice(slice))
}
