//! Dispatch server.
//!
//! ```text
//!   Client Request
//!   ──────────────▶ http server ──▶ route table ──▶ handler ──▶ Response
//!                        │
//!                        └── /ws/{key} ──▶ connection registry
//!                                               ▲
//!                         controller actions ───┘ (count, broadcast)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use dispatch_core::config::{load_config, RoutesWatcher};
use dispatch_core::handler::HandlerResolver;
use dispatch_core::http::{connection_actions, HttpServer};
use dispatch_core::lifecycle::Shutdown;
use dispatch_core::observability::{logging, metrics};
use dispatch_core::routing::RouteTableBuilder;
use dispatch_core::ws::ConnectionRegistry;

#[derive(Parser)]
#[command(name = "dispatch-core")]
#[command(about = "Route-table HTTP dispatcher with a WebSocket connection registry", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "conf/dispatch.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init(&config.observability);
    tracing::info!("dispatch-core v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes_file = ?config.routes.file,
        inline_routes = config.routes.inline.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Single registry for the whole process, handed to the actions and the server.
    let registry = Arc::new(ConnectionRegistry::new());
    let resolver: Arc<dyn HandlerResolver> = Arc::new(connection_actions(registry.clone()));

    // Fail fast: a broken route file never starts serving.
    let table = RouteTableBuilder::new(resolver.as_ref())
        .build_sources(config.routes.file.as_deref(), &config.routes.inline)?;
    tracing::info!(routes = table.len(), "Route table built");

    let (_watcher, route_updates) = match (&config.routes.file, config.routes.watch) {
        (Some(file), true) => {
            let (watcher, rx) = RoutesWatcher::new(file, config.routes.inline.clone(), resolver.clone());
            (Some(watcher.run()?), Some(rx))
        }
        _ => (None, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, table, registry);
    server.run(listener, route_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
