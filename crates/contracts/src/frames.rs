//! Coordinate frames, rigid transforms and the 4x4 placement matrix.

use serde::{Deserialize, Serialize};

use crate::{Quaternion, Vector3};

/// Column-major 4x4 transform matrix
///
/// Plain contract type so that downstream crates pick their own linear
/// algebra; `sync_core` converts to/from nalgebra internally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4(pub [[f32; 4]; 4]);

impl Matrix4 {
    /// Identity transform
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Translation component (last column)
    pub fn translation(&self) -> [f32; 3] {
        [self.0[3][0], self.0[3][1], self.0[3][2]]
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Physical reference frames exposed by the fusion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateFrame {
    /// World origin, fixed at session start
    StartOfService,
    /// The device body frame
    Device,
    /// Inertial measurement unit frame
    Imu,
    /// Depth camera optical frame
    CameraDepth,
}

/// Base/target frame pair addressed by a pose query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FramePair {
    pub base: CoordinateFrame,
    pub target: CoordinateFrame,
}

impl FramePair {
    pub const fn new(base: CoordinateFrame, target: CoordinateFrame) -> Self {
        Self { base, target }
    }

    /// The pair both ingest streams resolve against: device pose in the
    /// start-of-service (world) frame.
    pub const fn world_to_device() -> Self {
        Self::new(CoordinateFrame::StartOfService, CoordinateFrame::Device)
    }
}

/// Translation + rotation, without timestamp or status
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

/// Fixed calibration between sensor frames
///
/// Fetched once at session setup and cached for the session lifetime; the
/// service does not change extrinsics while connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionExtrinsics {
    /// Device frame expressed in the IMU frame
    pub device_to_imu: RigidTransform,

    /// Depth camera frame expressed in the IMU frame
    pub depth_camera_to_imu: RigidTransform,
}
