//! Bounded pose history with nearest-timestamp lookup.
//!
//! Backs the mock session's pose-as-of-timestamp query. Samples are small and
//! `Copy`, so the ring stores them directly.

use std::cmp::Ordering;
use std::fmt;

use contracts::PoseSample;
use ringbuf::{traits::*, HeapRb};

/// Ring of recent pose samples
///
/// When full, pushing evicts the oldest sample. Samples are expected to
/// arrive in timestamp order but lookup does not rely on it.
pub struct PoseHistory {
    ring: HeapRb<PoseSample>,
}

impl fmt::Debug for PoseHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseHistory")
            .field("len", &self.ring.occupied_len())
            .finish()
    }
}

impl PoseHistory {
    /// Create a history retaining up to `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: HeapRb::new(capacity.max(1)),
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn push(&mut self, sample: PoseSample) {
        if self.ring.is_full() {
            let _ = self.ring.try_pop();
        }
        let _ = self.ring.try_push(sample);
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<PoseSample> {
        self.ring.iter().last().copied()
    }

    /// Sample closest to `target`, if one lies within `tolerance` seconds
    pub fn nearest(&self, target: f64, tolerance: f64) -> Option<PoseSample> {
        self.ring
            .iter()
            .min_by(|a, b| {
                let da = (a.timestamp - target).abs();
                let db = (b.timestamp - target).abs();
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            })
            .filter(|sample| (sample.timestamp - target).abs() <= tolerance)
            .copied()
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    /// Whether any sample has been pushed
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_latest() {
        let mut history = PoseHistory::new(8);
        assert!(history.is_empty());

        history.push(PoseSample::identity_at(1.0));
        history.push(PoseSample::identity_at(2.0));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().timestamp, 2.0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = PoseHistory::new(3);
        for i in 0..5 {
            history.push(PoseSample::identity_at(f64::from(i)));
        }

        assert_eq!(history.len(), 3);
        // 0.0 and 1.0 were evicted; nearest to 0.0 within a tight window fails
        assert!(history.nearest(0.0, 0.5).is_none());
        assert_eq!(history.nearest(2.0, 0.5).unwrap().timestamp, 2.0);
    }

    #[test]
    fn test_nearest_picks_closest() {
        let mut history = PoseHistory::new(8);
        history.push(PoseSample::identity_at(1.0));
        history.push(PoseSample::identity_at(1.05));
        history.push(PoseSample::identity_at(1.1));

        assert_eq!(history.nearest(1.04, 0.1).unwrap().timestamp, 1.05);
    }

    #[test]
    fn test_nearest_outside_tolerance() {
        let mut history = PoseHistory::new(8);
        history.push(PoseSample::identity_at(1.0));

        assert!(history.nearest(2.0, 0.1).is_none());
        assert!(history.nearest(1.05, 0.1).is_some());
    }
}
