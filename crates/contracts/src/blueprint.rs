//! PipelineBlueprint - Config Loader output
//!
//! Describes a complete pipeline run: session parameters, publisher cadence,
//! output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Config schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline configuration blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// Config schema version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Fusion session parameters
    #[serde(default)]
    pub session: SessionConfig,

    /// Snapshot publisher parameters
    #[serde(default)]
    pub publisher: PublisherConfig,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Fusion session parameters
///
/// The rates drive the mock session; a hardware-backed session would ignore
/// them and deliver at the device's native cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pose stream rate (Hz), must be > 0
    #[serde(default = "default_pose_rate_hz")]
    pub pose_rate_hz: f64,

    /// Depth stream rate (Hz), must be > 0
    #[serde(default = "default_depth_rate_hz")]
    pub depth_rate_hz: f64,

    /// Points per generated depth frame
    #[serde(default = "default_depth_points")]
    pub depth_points: u32,

    /// Pose samples retained for historical pose queries
    #[serde(default = "default_pose_history_depth")]
    pub pose_history_depth: usize,

    /// Flip the reported pose status every N pose updates (mock only).
    /// Exercises status-transition counting downstream; off by default.
    #[serde(default)]
    pub status_flip_every: Option<u64>,
}

fn default_pose_rate_hz() -> f64 {
    100.0
}

fn default_depth_rate_hz() -> f64 {
    5.0
}

fn default_depth_points() -> u32 {
    4096
}

fn default_pose_history_depth() -> usize {
    256
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pose_rate_hz: default_pose_rate_hz(),
            depth_rate_hz: default_depth_rate_hz(),
            depth_points: default_depth_points(),
            pose_history_depth: default_pose_history_depth(),
            status_flip_every: None,
        }
    }
}

/// Snapshot publisher parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Tick period in milliseconds, must be > 0
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Capacity of the snapshot channel toward the dispatcher
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_period_ms() -> u64 {
    100
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name (unique, non-empty)
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Worker queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Sink-specific parameters (e.g. `addr`, `base_path`, `format`)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured log summary per snapshot
    Log,
    /// JSONL file on disk
    File,
    /// UDP fire-and-forget upload
    Network,
}
