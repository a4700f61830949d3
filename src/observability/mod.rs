//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (key, method, path, route) rather than formatted text
//! - Request ID generated at the edge and propagated on responses
//! - Metric updates are cheap and safe to call without an exporter

pub mod logging;
pub mod metrics;
