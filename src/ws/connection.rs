//! The connection capability consumed by the registry.

use thiserror::Error;

/// Errors a connection can report while being torn down or written to.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection already closed")]
    Closed,

    #[error("teardown failed: {0}")]
    Teardown(String),
}

/// A live bidirectional connection owned by the transport layer.
pub trait Connection: Send + Sync {
    /// Point-in-time liveness poll.
    fn is_closed(&self) -> bool;

    /// Release the underlying resources. Connections without a teardown
    /// of their own keep the default no-op.
    fn destroy(&self) -> Result<(), ConnectionError> {
        Ok(())
    }
}
