//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     ├─ GET <websocket.path> → websocket.rs (upgrade, register under key)
//!     └─ anything else → route table dispatch
//!            → handler (actions.rs for the built-in controller actions)
//!            → Outcome rendered as a response
//! ```

pub mod actions;
pub mod server;
pub mod websocket;

pub use actions::connection_actions;
pub use server::{AppState, HttpServer};
pub use websocket::WsConnection;
