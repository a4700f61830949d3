//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests
//!     → Release owned resources (connection registry) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Each owner of sub-resources exposes one teardown method
//! - Teardown tolerates partial failure and runs once

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
