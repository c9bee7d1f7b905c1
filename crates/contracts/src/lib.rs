//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses the fusion service clock (seconds, f64) as primary clock
//! - Pose and point-cloud timestamps are comparable; `0.0` passed to a pose
//!   query means "most recent available"

mod blueprint;
mod error;
mod frames;
mod point_cloud;
mod pose;
mod session;
mod sink;
mod snapshot;

pub use blueprint::*;
pub use error::*;
pub use frames::*;
pub use point_cloud::*;
pub use pose::*;
pub use session::{FusionSession, PointCloudCallback, PoseCallback, SessionCallbacks, LATEST_POSE};
pub use sink::*;
pub use snapshot::*;
