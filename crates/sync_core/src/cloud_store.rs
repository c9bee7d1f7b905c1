//! PointCloudStore - latest depth frame plus per-frame statistics.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{PointCloudFrame, PointCloudStats, PointCloudSummary, SECS_TO_MILLISECS};
use tracing::trace;

/// Latest-frame store for the point-cloud stream
///
/// Same single-lock discipline as `PoseStore`: the frame/stats pair is
/// replaced as one unit. The frame itself lives behind an `Arc`, so a
/// renderer holding `latest_frame()` keeps a complete old frame while the
/// ingest path swaps in a new one; no reader-side locking is needed.
#[derive(Debug, Default)]
pub struct PointCloudStore {
    cell: Mutex<CloudCell>,
}

#[derive(Debug, Default)]
struct CloudCell {
    frame: Option<Arc<PointCloudFrame>>,
    stats: PointCloudStats,
}

impl PointCloudStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a new frame, compute its stats, and swap it in.
    ///
    /// The average-z scan runs before the lock is taken, so ingest holds the
    /// lock only for the pointer swap.
    pub fn update(&self, frame: PointCloudFrame) -> PointCloudStats {
        let average_z = average_z(&frame);

        let mut cell = self.lock();
        let frame_delta_ms = cell
            .frame
            .as_ref()
            .map(|prev| (frame.timestamp - prev.timestamp) * SECS_TO_MILLISECS)
            .unwrap_or(0.0);

        let stats = PointCloudStats {
            frame_delta_ms,
            average_z,
        };

        trace!(
            timestamp = frame.timestamp,
            points = frame.point_count,
            frame_delta_ms,
            average_z,
            "point cloud updated"
        );

        cell.stats = stats;
        cell.frame = Some(Arc::new(frame));
        stats
    }

    /// Metadata of the latest frame; `None` until the first update.
    pub fn read(&self) -> Option<PointCloudSummary> {
        let cell = self.lock();
        cell.frame.as_ref().map(|frame| PointCloudSummary {
            timestamp: frame.timestamp,
            point_count: frame.point_count,
            frame_delta_ms: cell.stats.frame_delta_ms,
            average_z: cell.stats.average_z,
        })
    }

    /// Latest full frame for the renderer. The returned `Arc` stays valid
    /// and immutable regardless of later updates.
    pub fn latest_frame(&self) -> Option<Arc<PointCloudFrame>> {
        self.lock().frame.clone()
    }

    fn lock(&self) -> MutexGuard<'_, CloudCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Mean z over the frame's packed points; 0.0 for an empty frame.
fn average_z(frame: &PointCloudFrame) -> f64 {
    let mut sum = 0.0f64;
    let mut count = 0u64;
    for [_, _, z] in frame.points() {
        sum += f64::from(z);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::POINT_STRIDE;

    fn frame(timestamp: f64, points: &[[f32; 3]]) -> PointCloudFrame {
        let mut buf = Vec::with_capacity(points.len() * POINT_STRIDE);
        for p in points {
            for c in p {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        PointCloudFrame::new(timestamp, points.len() as u32, Bytes::from(buf))
    }

    #[test]
    fn test_read_empty() {
        let store = PointCloudStore::new();
        assert!(store.read().is_none());
        assert!(store.latest_frame().is_none());
    }

    #[test]
    fn test_average_z_empty_frame_is_zero() {
        let store = PointCloudStore::new();
        let stats = store.update(frame(0.1, &[]));
        assert_eq!(stats.average_z, 0.0);
        assert!(!stats.average_z.is_nan());
    }

    #[test]
    fn test_average_z_two_points() {
        let store = PointCloudStore::new();
        let stats = store.update(frame(0.1, &[[0.0, 0.0, 1.0], [0.0, 0.0, 3.0]]));
        assert!((stats.average_z - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_delta() {
        let store = PointCloudStore::new();
        let first = store.update(frame(1.0, &[[0.0, 0.0, 1.0]]));
        assert_eq!(first.frame_delta_ms, 0.0);

        let second = store.update(frame(1.2, &[[0.0, 0.0, 1.0]]));
        assert!((second.frame_delta_ms - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_renderer_frame_survives_replacement() {
        let store = PointCloudStore::new();
        store.update(frame(1.0, &[[1.0, 2.0, 3.0]]));

        let held = store.latest_frame().unwrap();
        store.update(frame(2.0, &[[9.0, 9.0, 9.0], [8.0, 8.0, 8.0]]));

        // The old Arc is untouched by the swap.
        assert_eq!(held.timestamp, 1.0);
        assert_eq!(held.point_count, 1);

        let current = store.latest_frame().unwrap();
        assert_eq!(current.timestamp, 2.0);
        assert_eq!(current.point_count, 2);
    }

    #[test]
    fn test_summary_matches_latest_frame() {
        let store = PointCloudStore::new();
        store.update(frame(1.0, &[[0.0, 0.0, 2.0]]));
        store.update(frame(1.5, &[[0.0, 0.0, 4.0], [0.0, 0.0, 6.0]]));

        let summary = store.read().unwrap();
        assert_eq!(summary.timestamp, 1.5);
        assert_eq!(summary.point_count, 2);
        assert!((summary.average_z - 5.0).abs() < 1e-9);
        assert!((summary.frame_delta_ms - 500.0).abs() < 1e-9);
    }
}
