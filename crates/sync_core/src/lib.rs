//! # Sync Core
//!
//! Dual-stream pose/point-cloud synchronization core.
//!
//! Responsibilities:
//! - Latest-sample stores for the pose and point-cloud streams, each guarded
//!   by its own exclusive region
//! - Cross-stream alignment: resolve the pose valid at a point-cloud frame's
//!   timestamp and derive its placement transform
//! - Periodic, consistent telemetry snapshots that never block ingest
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sync_core::{PoseStore, PointCloudStore, SnapshotPublisher};
//!
//! let pose_store = Arc::new(PoseStore::new());
//! let cloud_store = Arc::new(PointCloudStore::new());
//!
//! // Ingest callbacks write into the stores...
//! pose_store.update(sample);
//!
//! // ...while the publisher ticks on its own schedule.
//! let publisher = SnapshotPublisher::new(
//!     pose_store.clone(),
//!     cloud_store.clone(),
//!     std::time::Duration::from_millis(100),
//! );
//! let handle = publisher.spawn(snapshot_tx);
//! ```

mod aligner;
mod cloud_store;
mod pose_store;
mod publisher;
mod transform;

pub use aligner::{AlignOutcome, FrameAligner};
pub use cloud_store::PointCloudStore;
pub use pose_store::PoseStore;
pub use publisher::{PublisherHandle, PublisherReport, SnapshotPublisher};

// Re-export contract types that appear in this crate's public API
pub use contracts::{PointCloudFrame, PointCloudStats, PoseSample, PoseStats, Snapshot};
