//! Request-dispatch core: a route table mapping requests to handlers and a
//! registry of live WebSocket connections keyed by application strings.

pub mod config;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod ws;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteTable, RouteTableBuilder};
pub use ws::ConnectionRegistry;
