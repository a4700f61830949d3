//! Routes file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::handler::HandlerResolver;
use crate::routing::{RouteTable, RouteTableBuilder};

/// Watches the routes file and rebuilds the table when it changes.
pub struct RoutesWatcher {
    path: PathBuf,
    inline: Vec<String>,
    resolver: Arc<dyn HandlerResolver>,
    update_tx: mpsc::UnboundedSender<RouteTable>,
}

impl RoutesWatcher {
    /// Create a new RoutesWatcher.
    ///
    /// Returns the watcher and a receiver for rebuilt tables.
    pub fn new(
        path: &Path,
        inline: Vec<String>,
        resolver: Arc<dyn HandlerResolver>,
    ) -> (Self, mpsc::UnboundedReceiver<RouteTable>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                inline,
                resolver,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// A rebuild that fails is logged and dropped; the running table stays.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            inline,
            resolver,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Routes file change detected, rebuilding...");
                        let builder = RouteTableBuilder::new(resolver.as_ref());
                        match builder.build_sources(Some(&path), &inline) {
                            Ok(table) => {
                                let _ = update_tx.send(table);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to rebuild routes: {}. Keeping current table.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Routes watcher started");
        Ok(watcher)
    }
}
