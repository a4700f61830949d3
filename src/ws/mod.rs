//! Long-lived connection bookkeeping.
//!
//! # Data Flow
//! ```text
//! Upgrade accepted (http/websocket.rs)
//!     → registry.register(key, connection)
//!
//! Application code addressing a key
//!     → registry.get(key) / registry.accept(key, visitor)
//!     → closed connections swept after the pass
//!
//! Shutdown
//!     → registry.release_resources()
//!     → destroy every tracked connection, then clear
//! ```
//!
//! # Design Decisions
//! - Per-key buckets in a sharded map; unrelated keys never contend
//! - Buckets are copy-on-write: readers iterate a snapshot
//! - Liveness is polled (`is_closed`), never pushed
//! - Teardown is one-shot and best-effort

pub mod connection;
pub mod registry;

pub use connection::{Connection, ConnectionError};
pub use registry::ConnectionRegistry;
