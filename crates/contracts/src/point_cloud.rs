//! PointCloudFrame - depth stream payload
//!
//! One depth sweep as delivered by the fusion service: packed xyz float
//! triples plus the placement transform resolved by the frame aligner.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::Matrix4;

/// Bytes per point: three little-endian f32 coordinates
pub const POINT_STRIDE: usize = 12;

/// Point-cloud frame
///
/// The coordinate buffer is shared (`Bytes`), so cloning a frame is cheap and
/// a renderer can keep reading an old frame while the store swaps in a new
/// one. Replaced wholesale per depth callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloudFrame {
    /// Session timestamp of the sweep (seconds)
    pub timestamp: f64,

    /// Number of points in `points`
    pub point_count: u32,

    /// Packed x,y,z f32 triples, little-endian, `POINT_STRIDE` bytes each
    pub points: Bytes,

    /// Camera-to-world placement transform, set by the frame aligner.
    /// Defaults to identity until the first successful alignment.
    #[serde(default)]
    pub model_matrix: Matrix4,
}

impl PointCloudFrame {
    /// Frame without a resolved placement yet
    pub fn new(timestamp: f64, point_count: u32, points: Bytes) -> Self {
        Self {
            timestamp,
            point_count,
            points,
            model_matrix: Matrix4::IDENTITY,
        }
    }

    /// Iterate the packed coordinate triples as `[x, y, z]`
    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        fn le_f32(b: &[u8]) -> f32 {
            f32::from_le_bytes([b[0], b[1], b[2], b[3]])
        }

        self.points
            .chunks_exact(POINT_STRIDE)
            .map(|p| [le_f32(&p[0..4]), le_f32(&p[4..8]), le_f32(&p[8..12])])
    }
}

/// Per-frame statistics, recomputed by `PointCloudStore::update`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PointCloudStats {
    /// Time since the previous frame, milliseconds (0 for the first frame)
    pub frame_delta_ms: f64,

    /// Arithmetic mean of the z coordinate over this frame's points.
    /// An empty frame yields 0.0; this is a valid value, not an error.
    pub average_z: f64,
}
