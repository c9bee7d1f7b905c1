//! PoseStore - latest pose sample plus per-update statistics.

use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{PoseSample, PoseStats, PoseStatus, SECS_TO_MILLISECS};
use tracing::trace;

/// Latest-sample store for the pose stream
///
/// A single mutex guards the sample/stats pair, so `update` is one atomic
/// unit as observed by any `read`: a reader never sees a new sample paired
/// with stats computed from an older one. The lock is held only for the copy;
/// samples are `Copy` and small.
///
/// State machine: empty until the first update, then holds data for the rest
/// of the session. Updates simply stop arriving when the session disconnects;
/// reads of the last sample stay valid.
#[derive(Debug, Default)]
pub struct PoseStore {
    cell: Mutex<Option<PoseCell>>,
}

#[derive(Debug, Clone, Copy)]
struct PoseCell {
    sample: PoseSample,
    stats: PoseStats,
}

impl PoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored sample, computing stats against the previous one.
    ///
    /// The status counter restarts at 1 on a status transition and increments
    /// otherwise; the initial previous status is `Unknown`, so the first
    /// sample always counts 1.
    pub fn update(&self, sample: PoseSample) -> PoseStats {
        let mut cell = self.lock();

        let (delta_ms, previous_status, previous_count) = match cell.as_ref() {
            Some(prev) => (
                (sample.timestamp - prev.sample.timestamp) * SECS_TO_MILLISECS,
                prev.sample.status,
                prev.stats.status_count,
            ),
            None => (0.0, PoseStatus::Unknown, 0),
        };

        let status_count = if sample.status != previous_status {
            1
        } else {
            previous_count + 1
        };

        let stats = PoseStats {
            status_count,
            delta_ms,
            previous_status,
        };

        trace!(
            timestamp = sample.timestamp,
            status = sample.status.as_str(),
            status_count,
            delta_ms,
            "pose updated"
        );

        *cell = Some(PoseCell { sample, stats });
        stats
    }

    /// Latest sample and its paired stats; `None` until the first update.
    pub fn read(&self) -> Option<(PoseSample, PoseStats)> {
        self.lock().as_ref().map(|cell| (cell.sample, cell.stats))
    }

    /// Latest sample only, for the point-cloud ingest path's cross-stream
    /// read. Uses this store's own lock; callers never take a second lock
    /// while holding it.
    pub fn latest_sample(&self) -> Option<PoseSample> {
        self.lock().as_ref().map(|cell| cell.sample)
    }

    fn lock(&self) -> MutexGuard<'_, Option<PoseCell>> {
        // A poisoned lock only means a panicking writer; the cell itself is
        // always a complete pair, so recover the guard.
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
