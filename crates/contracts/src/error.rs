//! Layered error definitions
//!
//! Categorized by source: config / session / alignment / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum CoreError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Session Errors =====
    /// Fusion service connection error
    #[error("session connect error: {message}")]
    SessionConnect { message: String },

    /// Pose query failed; recoverable per frame, the caller falls back
    #[error("pose query failed at t={timestamp}: {message}")]
    PoseQuery { timestamp: f64, message: String },

    /// Calibration extrinsics could not be fetched
    #[error("extrinsics unavailable: {message}")]
    ExtrinsicsUnavailable { message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create session connection error
    pub fn session_connect(message: impl Into<String>) -> Self {
        Self::SessionConnect {
            message: message.into(),
        }
    }

    /// Create pose query error
    pub fn pose_query(timestamp: f64, message: impl Into<String>) -> Self {
        Self::PoseQuery {
            timestamp,
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
