//! # Ingestion
//!
//! Stream wiring between the fusion session and the synchronization core.
//!
//! Responsibilities:
//! - Register the pose and point-cloud callbacks on a `FusionSession`
//! - Drive `PoseStore`, `FrameAligner` and `PointCloudStore` from those
//!   callbacks (no intermediate queueing: each store keeps the latest
//!   sample only)
//! - Per-stream ingest counters
//! - Mock session with a pose-history ring for hardware-free runs
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ingestion::{MockFusionSession, MockSessionConfig, StreamRouter};
//! use sync_core::{PointCloudStore, PoseStore};
//!
//! let session = Arc::new(MockFusionSession::new(MockSessionConfig::default()));
//! let router = StreamRouter::new(session, Arc::new(PoseStore::new()), Arc::new(PointCloudStore::new()));
//! router.connect()?;
//! // ... streams flow into the stores ...
//! router.disconnect();
//! ```

mod history;
mod metrics;
mod mock;
mod router;

// Re-exports
pub use contracts::{PointCloudFrame, PoseSample};
pub use history::PoseHistory;
pub use metrics::{IngestionMetrics, MetricsSnapshot};
pub use mock::{MockFusionSession, MockSessionConfig};
pub use router::StreamRouter;
