//! Configuration validation
//!
//! Rules:
//! - session rates and publisher period strictly positive
//! - sink names non-empty and unique
//! - network sinks carry a parseable `addr` param
//! - queue and channel capacities non-zero

use std::collections::HashSet;

use contracts::{CoreError, PipelineBlueprint, SinkType};

/// Validate a blueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), CoreError> {
    validate_session(blueprint)?;
    validate_publisher(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_session(blueprint: &PipelineBlueprint) -> Result<(), CoreError> {
    let session = &blueprint.session;

    if session.pose_rate_hz <= 0.0 {
        return Err(CoreError::config_validation(
            "session.pose_rate_hz",
            format!("must be > 0, got {}", session.pose_rate_hz),
        ));
    }
    if session.depth_rate_hz <= 0.0 {
        return Err(CoreError::config_validation(
            "session.depth_rate_hz",
            format!("must be > 0, got {}", session.depth_rate_hz),
        ));
    }
    if session.pose_history_depth == 0 {
        return Err(CoreError::config_validation(
            "session.pose_history_depth",
            "must be >= 1",
        ));
    }
    if let Some(0) = session.status_flip_every {
        return Err(CoreError::config_validation(
            "session.status_flip_every",
            "must be >= 1 when set",
        ));
    }
    Ok(())
}

fn validate_publisher(blueprint: &PipelineBlueprint) -> Result<(), CoreError> {
    let publisher = &blueprint.publisher;

    if publisher.period_ms == 0 {
        return Err(CoreError::config_validation(
            "publisher.period_ms",
            "must be >= 1",
        ));
    }
    if publisher.channel_capacity == 0 {
        return Err(CoreError::config_validation(
            "publisher.channel_capacity",
            "must be >= 1",
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &PipelineBlueprint) -> Result<(), CoreError> {
    let mut seen = HashSet::new();

    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(CoreError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(CoreError::config_validation(
                format!("sinks[{idx}].name"),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(CoreError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "must be >= 1",
            ));
        }
        if sink.sink_type == SinkType::Network {
            let addr = sink.params.get("addr").ok_or_else(|| {
                CoreError::config_validation(
                    format!("sinks[{}].params.addr", sink.name),
                    "network sink requires an 'addr' parameter",
                )
            })?;
            addr.parse::<std::net::SocketAddr>().map_err(|e| {
                CoreError::config_validation(
                    format!("sinks[{}].params.addr", sink.name),
                    format!("invalid socket address '{addr}': {e}"),
                )
            })?;
        }
    }
    Ok(())
}
