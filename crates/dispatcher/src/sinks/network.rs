//! NetworkSink - UDP fire-and-forget snapshot upload

use std::collections::HashMap;
use std::net::SocketAddr;

use contracts::{CoreError, Snapshot, TelemetrySink};
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max datagram size (UDP practical limit)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{addr_str}': {e}"))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{other}'")),
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends snapshots over UDP
///
/// Best-effort by design: a lost datagram or a dead receiver never surfaces
/// as an error to the pipeline.
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(&config.addr).await?;

        debug!(sink = %name, target = %config.addr, "network sink connected");

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, CoreError> {
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| CoreError::sink_write("network", e))?;

        Self::new(name, config)
            .await
            .map_err(|e| CoreError::SinkConnection {
                sink_name: "network".to_string(),
                message: e.to_string(),
            })
    }

    fn serialize(&self, snapshot: &Snapshot) -> Result<Vec<u8>, String> {
        match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(snapshot).map_err(|e| format!("json error: {e}"))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(snapshot).map_err(|e| format!("bincode error: {e}"))
            }
        }
    }
}

impl TelemetrySink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_write",
        skip(self, snapshot),
        fields(sink = %self.name, seq = snapshot.seq)
    )]
    async fn write(&mut self, snapshot: &Snapshot) -> Result<(), CoreError> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| CoreError::sink_write(&self.name, "socket not connected"))?;

        let data = self
            .serialize(snapshot)
            .map_err(|e| CoreError::sink_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "datagram exceeds max packet size"
            );
        }

        match socket.send(&data).await {
            Ok(sent) => {
                debug!(sink = %self.name, seq = snapshot.seq, bytes = sent, "sent");
            }
            Err(e) => {
                // Fire-and-forget: log, never fail the pipeline
                error!(sink = %self.name, error = %e, "udp send failed");
            }
        }
        Ok(())
    }

    #[instrument(name = "network_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CoreError> {
        // UDP doesn't buffer
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CoreError> {
        self.socket = None;
        debug!(sink = %self.name, "network sink closed");
        Ok(())
    }
}
