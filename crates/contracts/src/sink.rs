//! TelemetrySink trait - Dispatcher output interface
//!
//! Defines the abstract interface for snapshot sinks.

use crate::{CoreError, Snapshot};

/// Snapshot output trait
///
/// All sink implementations must implement this trait. Failures are isolated
/// per sink and never feed back into the synchronization core.
#[trait_variant::make(TelemetrySink: Send)]
pub trait LocalTelemetrySink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one snapshot
    ///
    /// # Errors
    /// Returns a write error (should include context)
    async fn write(&mut self, snapshot: &Snapshot) -> Result<(), CoreError>;

    /// Flush buffered output (if any)
    async fn flush(&mut self) -> Result<(), CoreError>;

    /// Close the sink
    async fn close(&mut self) -> Result<(), CoreError>;
}
