//! Controller actions that expose the connection registry to route files.
//!
//! ```text
//! GET  /rooms/{key}/count      Connections.count
//! GET  /connections            Connections.total
//! POST /rooms/{key}/broadcast  Connections.broadcast
//! ```

use std::sync::Arc;

use serde_json::json;

use crate::handler::{ActionRegistry, Outcome, RequestContext};
use crate::http::websocket::WsConnection;
use crate::ws::ConnectionRegistry;

/// Actions bound to `registry`, ready to be used as a route resolver.
pub fn connection_actions(registry: Arc<ConnectionRegistry<WsConnection>>) -> ActionRegistry {
    let mut actions = ActionRegistry::new();

    let r = registry.clone();
    actions.register("Connections.count", move |ctx: &RequestContext| {
        let Some(key) = ctx.get_param("key") else {
            return Outcome::BadRequest("missing key parameter".into());
        };
        Outcome::Json(json!({ "key": key, "connections": r.get(key).len() }))
    });

    let r = registry.clone();
    actions.register("Connections.total", move |_: &RequestContext| {
        Outcome::Json(json!({ "connections": r.count(), "keys": r.keys().len() }))
    });

    let r = registry;
    actions.register("Connections.broadcast", move |ctx: &RequestContext| {
        let Some(key) = ctx.get_param("key") else {
            return Outcome::BadRequest("missing key parameter".into());
        };

        let mut delivered = 0usize;
        r.accept(key, |conn| match conn.send_text(ctx.body()) {
            Ok(()) => delivered += 1,
            Err(e) => tracing::debug!(connection_id = %conn.id(), error = %e, "Broadcast skipped"),
        });

        Outcome::Json(json!({ "key": key, "delivered": delivered }))
    });

    actions
}
