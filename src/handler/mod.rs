//! Request handlers.
//!
//! # Data Flow
//! ```text
//! Route file target
//!     → builder resolves it once (resolver.rs for named actions,
//!       builtin.rs for `echo:` / `staticDir:`)
//!     → Handler stored in the immutable route table
//!
//! Matched request
//!     → RequestContext (context.rs) filled with parameters
//!     → Handler::invoke
//!     → Outcome, rendered by the HTTP layer
//! ```
//!
//! # Design Decisions
//! - Handlers are synchronous and transport-free; file bodies are read by
//!   the HTTP layer from an `Outcome::File`
//! - Built-ins are concrete types so callers can inspect them

pub mod builtin;
pub mod context;
pub mod resolver;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub use builtin::{Echo, StaticDir};
pub use context::RequestContext;
pub use resolver::{placeholder_action, ActionRegistry, HandlerResolver};

/// What a handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Text(String),
    Json(serde_json::Value),
    /// Serve the file at this path.
    File(PathBuf),
    BadRequest(String),
    NotFound,
}

/// An application-supplied controller action.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, ctx: &RequestContext) -> Outcome;
}

impl<F> RequestHandler for F
where
    F: Fn(&RequestContext) -> Outcome + Send + Sync,
{
    fn handle(&self, ctx: &RequestContext) -> Outcome {
        self(ctx)
    }
}

/// The target a route invokes, resolved at build time.
#[derive(Clone)]
pub enum Handler {
    Action {
        name: String,
        handler: Arc<dyn RequestHandler>,
    },
    StaticDir(StaticDir),
    Echo(Echo),
}

impl Handler {
    pub fn invoke(&self, ctx: &RequestContext) -> Outcome {
        match self {
            Handler::Action { handler, .. } => handler.handle(ctx),
            Handler::StaticDir(dir) => dir.handle(ctx),
            Handler::Echo(echo) => echo.handle(ctx),
        }
    }

    /// Whether the route pattern should match as a prefix.
    pub fn wants_prefix(&self) -> bool {
        matches!(self, Handler::StaticDir(_))
    }

    pub fn action_name(&self) -> Option<&str> {
        match self {
            Handler::Action { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Action { name, .. } => f.debug_struct("Action").field("name", name).finish(),
            Handler::StaticDir(dir) => fmt::Debug::fmt(dir, f),
            Handler::Echo(echo) => fmt::Debug::fmt(echo, f),
        }
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Action { name, .. } => write!(f, "{name}"),
            Handler::StaticDir(dir) => write!(f, "staticDir:{}", dir.base().display()),
            Handler::Echo(echo) => write!(f, "echo: {}", echo.message()),
        }
    }
}
