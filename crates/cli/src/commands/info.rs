//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    config_path: String,
    version: String,
    session: SessionInfo,
    publisher: PublisherInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    sinks: Option<Vec<SinkInfo>>,
    sink_count: usize,
}

#[derive(Serialize)]
struct SessionInfo {
    pose_rate_hz: f64,
    depth_rate_hz: f64,
    depth_points: u32,
    pose_history_depth: usize,
}

#[derive(Serialize)]
struct PublisherInfo {
    period_ms: u64,
    channel_capacity: usize,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let sinks = args.sinks.then(|| {
        blueprint
            .sinks
            .iter()
            .map(|sink| SinkInfo {
                name: sink.name.clone(),
                sink_type: format!("{:?}", sink.sink_type),
                queue_capacity: sink.queue_capacity,
            })
            .collect()
    });

    let config_info = ConfigInfo {
        config_path: args.config.display().to_string(),
        version: format!("{:?}", blueprint.version),
        session: SessionInfo {
            pose_rate_hz: blueprint.session.pose_rate_hz,
            depth_rate_hz: blueprint.session.depth_rate_hz,
            depth_points: blueprint.session.depth_points,
            pose_history_depth: blueprint.session.pose_history_depth,
        },
        publisher: PublisherInfo {
            period_ms: blueprint.publisher.period_ms,
            channel_capacity: blueprint.publisher.channel_capacity,
        },
        sinks,
        sink_count: blueprint.sinks.len(),
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&config_info).context("Failed to serialize info")?;
        println!("{}", json);
    } else {
        print_info(&config_info);
    }

    Ok(())
}

fn print_info(info: &ConfigInfo) {
    println!("\n=== Configuration: {} ===\n", info.config_path);
    println!("Version: {}", info.version);

    println!("\nSession:");
    println!("  Pose rate: {} Hz", info.session.pose_rate_hz);
    println!("  Depth rate: {} Hz", info.session.depth_rate_hz);
    println!("  Depth points: {}", info.session.depth_points);
    println!("  Pose history depth: {}", info.session.pose_history_depth);

    println!("\nPublisher:");
    println!("  Period: {} ms", info.publisher.period_ms);
    println!("  Channel capacity: {}", info.publisher.channel_capacity);

    println!("\nSinks: {}", info.sink_count);
    if let Some(ref sinks) = info.sinks {
        for sink in sinks {
            println!(
                "  - {} ({}, queue {})",
                sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}
