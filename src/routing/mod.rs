//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup / reload):
//!     route-definition lines
//!     → builder.rs (tokenize, resolve targets)
//!     → pattern.rs (compile path templates)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path)
//!     → table.rs (ordered scan)
//!     → pattern.rs (segment-by-segment match)
//!     → Return: handler + parameters, or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - First match wins, in registration order
//! - `*` routes answer to every supported method
//! - Build errors abort the build; no partial tables

pub mod builder;
pub mod method;
pub mod pattern;
pub mod table;

pub use builder::{BuildError, RouteTableBuilder};
pub use method::{HttpMethod, MethodFilter};
pub use pattern::{Params, PathMatch, PathPattern, PatternError, Segment};
pub use table::{NotFound, Resolved, Route, RouteTable};
