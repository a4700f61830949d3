//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Resolve (method, path) to the first matching route
//! - Bind extracted parameters into the request context before invoking
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan, first match wins, no specificity scoring
//! - Explicit `NotFound` rather than a silent default

use std::fmt;

use serde_json::json;
use thiserror::Error;

use crate::handler::{Handler, Outcome, RequestContext};
use crate::routing::method::{HttpMethod, MethodFilter};
use crate::routing::pattern::{Params, PathPattern};

/// No route matched the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no route for {method} {path}")]
pub struct NotFound {
    pub method: HttpMethod,
    pub path: String,
}

/// A (method, path pattern, handler) binding.
#[derive(Debug, Clone)]
pub struct Route {
    method: MethodFilter,
    pattern: PathPattern,
    handler: Handler,
}

impl Route {
    /// Prefix-matching handlers get a prefix pattern.
    pub fn new(method: MethodFilter, pattern: PathPattern, handler: Handler) -> Self {
        let pattern = if handler.wants_prefix() {
            pattern.into_prefix()
        } else {
            pattern
        };
        Self {
            method,
            pattern,
            handler,
        }
    }

    pub fn method(&self) -> MethodFilter {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.pattern, self.handler)
    }
}

/// A successful resolution.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub route: &'a Route,
    pub params: Params,
    pub remainder: Option<String>,
}

impl Resolved<'_> {
    pub fn handler(&self) -> &Handler {
        &self.route.handler
    }

    /// Summary used by `routes-cli resolve`.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "route": self.route.to_string(),
            "handler": self.handler().to_string(),
            "params": self.params,
            "remainder": self.remainder,
        })
    }
}

/// Ordered, immutable set of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route whose method and pattern both match.
    pub fn resolve(&self, method: HttpMethod, path: &str) -> Result<Resolved<'_>, NotFound> {
        self.routes
            .iter()
            .filter(|route| route.method.matches(method))
            .find_map(|route| {
                route.pattern.matches(path).map(|m| Resolved {
                    route,
                    params: m.params,
                    remainder: m.remainder,
                })
            })
            .ok_or_else(|| NotFound {
                method,
                path: path.to_string(),
            })
    }

    /// Resolve the context's method and path, bind path parameters into it
    /// and run the handler.
    pub fn dispatch(&self, ctx: &mut RequestContext) -> Result<Outcome, NotFound> {
        let resolved = self.resolve(ctx.method(), ctx.path())?;
        for (name, value) in resolved.params.iter() {
            ctx.param(name, value);
        }
        ctx.set_remainder(resolved.remainder.clone());

        tracing::trace!(
            method = %ctx.method(),
            path = %ctx.path(),
            route = %resolved.route,
            "Route matched"
        );

        Ok(resolved.handler().invoke(ctx))
    }
}
