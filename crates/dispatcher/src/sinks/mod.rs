//! Sink implementations

mod file;
mod log;
mod network;

pub use file::{FileSink, FileSinkConfig};
pub use log::LogSink;
pub use network::{NetworkFormat, NetworkSink, NetworkSinkConfig};
