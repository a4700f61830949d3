//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router: WebSocket endpoint plus a catch-all dispatcher
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch requests through the active route table
//! - Render handler outcomes as HTTP responses
//! - Swap in rebuilt route tables
//! - Release the connection registry on shutdown

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handler::{Outcome, RequestContext};
use crate::http::websocket::{ws_handler, WsConnection};
use crate::observability::metrics;
use crate::routing::{HttpMethod, RouteTable};
use crate::ws::ConnectionRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<ArcSwap<RouteTable>>,
    pub registry: Arc<ConnectionRegistry<WsConnection>>,
}

/// HTTP host for the route table and the connection registry.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server serving `routes`.
    pub fn new(
        config: AppConfig,
        routes: RouteTable,
        registry: Arc<ConnectionRegistry<WsConnection>>,
    ) -> Self {
        metrics::record_route_count(routes.len());

        let state = AppState {
            routes: Arc::new(ArcSwap::from_pointee(routes)),
            registry,
        };

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router: Router<AppState> = Router::new();
        if config.websocket.enabled {
            router = router.route(&config.websocket.path, get(ws_handler));
        }

        router
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Tables arriving on `route_updates` replace the active one; requests
    /// already resolving keep the table they loaded.
    pub async fn run(
        self,
        listener: TcpListener,
        route_updates: Option<mpsc::UnboundedReceiver<RouteTable>>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.routes.load().len(),
            "HTTP server starting"
        );

        if let Some(mut updates) = route_updates {
            let routes = self.state.routes.clone();
            tokio::spawn(async move {
                while let Some(table) = updates.recv().await {
                    tracing::info!(routes = table.len(), "Route table swapped");
                    metrics::record_route_count(table.len());
                    routes.store(Arc::new(table));
                }
            });
        }

        let state = self.state.clone();
        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown requested, releasing connections");
                state.registry.release_resources();
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Tear down everything the server owns.
    pub fn release_resources(&self) {
        self.state.registry.release_resources();
    }
}

/// Catch-all handler: resolve through the route table and run the handler.
async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();

    let response = match HttpMethod::try_from(&method) {
        Ok(http_method) => {
            let mut ctx = RequestContext::new(http_method, path.as_str())
                .with_body(String::from_utf8_lossy(&body));
            for (name, value) in query {
                ctx.param(name, value);
            }

            let dispatched = {
                let table = state.routes.load();
                table.dispatch(&mut ctx)
            };

            match dispatched {
                Ok(outcome) => render(outcome).await,
                Err(e) => {
                    tracing::debug!(error = %e, "No route matched");
                    metrics::record_not_found();
                    not_found()
                }
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, path = %path, "Unsupported method");
            metrics::record_not_found();
            not_found()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16());
    response
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

async fn render(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Text(text) => text.into_response(),
        Outcome::Json(value) => Json(value).into_response(),
        Outcome::File(path) => match tokio::fs::read(&path).await {
            Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response(),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Static file unavailable");
                not_found()
            }
        },
        Outcome::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        Outcome::NotFound => not_found(),
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("a/file1.txt")), "text/plain; charset=utf-8");
        assert_eq!(content_type(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }
}
