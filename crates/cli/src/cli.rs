//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pointcloud Syncer - dual-stream pose/point-cloud synchronization pipeline
#[derive(Parser, Debug)]
#[command(
    name = "pointcloud-syncer",
    author,
    version,
    about = "Pose/point-cloud synchronization pipeline",
    long_about = "Synchronizes the two streams of a depth-sensing fusion session \n\
                  (6-DoF pose updates and point-cloud frames), aligns each frame \n\
                  with the pose valid at its timestamp, and publishes periodic \n\
                  telemetry snapshots to configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "POINTCLOUD_SYNCER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "POINTCLOUD_SYNCER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the synchronization pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "POINTCLOUD_SYNCER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the snapshot publisher period from configuration (ms)
    #[arg(long, env = "POINTCLOUD_SYNCER_PERIOD_MS")]
    pub period_ms: Option<u64>,

    /// Maximum number of snapshots to publish (0 = unlimited)
    #[arg(long, default_value = "0", env = "POINTCLOUD_SYNCER_MAX_SNAPSHOTS")]
    pub max_snapshots: u64,

    /// Run duration in seconds (0 = until interrupted)
    #[arg(long, default_value = "0", env = "POINTCLOUD_SYNCER_DURATION")]
    pub duration: u64,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9100", env = "POINTCLOUD_SYNCER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration details
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
