//! FileSink - appends snapshots to a JSONL file on disk

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use contracts::{CoreError, Snapshot, TelemetrySink};
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./telemetry"));

        Self { base_path }
    }
}

/// Sink that appends one JSON line per snapshot
///
/// Each run writes a fresh wall-clock-stamped file under the base directory.
/// Output is buffered; the worker flushes on shutdown.
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        let filename = format!("snapshots-{}.jsonl", Local::now().format("%Y%m%d-%H%M%S"));
        let path = config.base_path.join(filename);
        let writer = BufWriter::new(File::create(&path)?);

        let name = name.into();
        debug!(sink = %name, path = %path.display(), "file sink opened");

        Ok(Self { name, path, writer })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(b"\n")
    }
}

impl TelemetrySink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, snapshot),
        fields(sink = %self.name, seq = snapshot.seq)
    )]
    async fn write(&mut self, snapshot: &Snapshot) -> Result<(), CoreError> {
        self.append(snapshot).map_err(|e| {
            error!(sink = %self.name, seq = snapshot.seq, error = %e, "write failed");
            CoreError::sink_write(&self.name, e.to_string())
        })
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), CoreError> {
        self.writer
            .flush()
            .map_err(|e| CoreError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), CoreError> {
        self.writer
            .flush()
            .map_err(|e| CoreError::sink_write(&self.name, e.to_string()))?;
        debug!(sink = %self.name, path = %self.path.display(), "file sink closed");
        Ok(())
    }
}
