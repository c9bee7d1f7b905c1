//! # Dispatcher
//!
//! Snapshot fan-out to configured sinks.
//!
//! Each sink runs on its own worker task behind an isolated bounded queue, so
//! a slow or failing sink can neither stall the publisher nor the other
//! sinks. Queue-full snapshots are dropped and counted, matching the
//! pipeline's latest-wins discipline.

mod dispatcher;
mod error;
mod handle;
mod metrics;
mod sinks;

pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, FileSinkConfig, LogSink, NetworkFormat, NetworkSink, NetworkSinkConfig};
