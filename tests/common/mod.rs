//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dispatch_core::handler::{placeholder_action, RequestHandler};
use dispatch_core::routing::{RouteTable, RouteTableBuilder};
use dispatch_core::ws::{Connection, ConnectionError};

/// Resolver that accepts any action name; the handler answers with its own name.
pub fn named_resolver(name: &str) -> Option<Arc<dyn RequestHandler>> {
    placeholder_action(name)
}

/// Build a table from route lines with [`named_resolver`].
pub fn table(source: &str) -> RouteTable {
    RouteTableBuilder::new(&named_resolver)
        .build_str(source)
        .expect("routes should build")
}

/// Connection whose liveness the test controls.
#[derive(Default)]
pub struct MockConnection {
    closed: AtomicBool,
    pub destroyed: AtomicUsize,
}

impl MockConnection {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Connection for MockConnection {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn destroy(&self) -> Result<(), ConnectionError> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Poll `check` until it holds or `timeout` passes.
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
