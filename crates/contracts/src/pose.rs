//! PoseSample - pose stream payload
//!
//! One 6-DoF pose update as delivered by the fusion service, plus the
//! per-update statistics derived from it.

use serde::{Deserialize, Serialize};

/// Conversion factor from session-clock seconds to display milliseconds.
pub const SECS_TO_MILLISECS: f64 = 1000.0;

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Unit quaternion, (x, y, z, w) component order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Identity rotation
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Tracking status reported with every pose update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseStatus {
    /// Tracking is healthy
    Valid,
    /// Tracking lost
    Invalid,
    /// Service still converging
    Initializing,
    /// No status received yet
    #[default]
    Unknown,
}

impl PoseStatus {
    /// Stable label for logs and metric tags
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Initializing => "initializing",
            Self::Unknown => "unknown",
        }
    }
}

/// 6-DoF pose sample
///
/// Immutable once constructed; each pose update replaces the previous sample
/// wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Session timestamp (seconds, monotonic per device clock)
    pub timestamp: f64,

    /// Device translation in the base frame (meters)
    pub translation: Vector3,

    /// Device orientation in the base frame
    pub rotation: Quaternion,

    /// Tracking status at this instant
    pub status: PoseStatus,
}

impl PoseSample {
    /// Identity pose at the given timestamp, `Valid` status.
    pub fn identity_at(timestamp: f64) -> Self {
        Self {
            timestamp,
            translation: Vector3::default(),
            rotation: Quaternion::IDENTITY,
            status: PoseStatus::Valid,
        }
    }
}

/// Per-update statistics, recomputed by `PoseStore::update`
///
/// `status_count` restarts at 1 on every status transition and increments on
/// every same-status update; `previous_status` is the status of the update
/// the statistics were computed against.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PoseStats {
    /// Updates since the last status transition (inclusive)
    pub status_count: u64,

    /// Time since the previous sample, milliseconds (0 for the first sample)
    pub delta_ms: f64,

    /// Status of the immediately preceding sample
    pub previous_status: PoseStatus,
}
