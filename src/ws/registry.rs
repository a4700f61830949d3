//! Connections grouped by an application-defined key.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::observability::metrics;
use crate::ws::connection::Connection;

type Bucket<C> = Arc<ArcSwap<Vec<Arc<C>>>>;

/// Tracks live connections by string key. Several connections may share a
/// key, and nothing stops one connection from being registered under
/// several keys (or twice under the same key).
pub struct ConnectionRegistry<C: Connection + ?Sized> {
    buckets: DashMap<String, Bucket<C>>,
    released: AtomicBool,
}

impl<C: Connection + ?Sized> ConnectionRegistry<C> {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
            released: AtomicBool::new(false),
        }
    }

    /// Append `connection` to the bucket for `key`, creating it on first use.
    ///
    /// Concurrent callers racing to create the same bucket all land in the
    /// one that wins. Ignored once [`release_resources`](Self::release_resources)
    /// has run.
    pub fn register(&self, key: impl Into<String>, connection: Arc<C>) {
        let key = key.into();
        if self.released.load(Ordering::Acquire) {
            tracing::warn!(key = %key, "Registry released, ignoring connection");
            return;
        }

        let bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| Arc::new(ArcSwap::from_pointee(Vec::new())))
            .value()
            .clone();

        bucket.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(connection.clone());
            next
        });

        metrics::record_connection_registered();
        tracing::debug!(key = %key, connections = bucket.load().len(), "Connection registered");
    }

    /// Live connections under `key`. Closed ones are left out and swept.
    pub fn get(&self, key: &str) -> Vec<Arc<C>> {
        let mut live = Vec::new();
        self.accept(key, |conn| live.push(conn.clone()));
        live
    }

    /// Call `visitor` once per live connection under `key`, in registration
    /// order. Connections found closed are removed after the pass. An
    /// unknown key is a no-op.
    pub fn accept<F>(&self, key: &str, mut visitor: F)
    where
        F: FnMut(&Arc<C>),
    {
        let Some(bucket) = self.bucket(key) else {
            return;
        };

        let snapshot = bucket.load_full();
        let mut closed: Vec<Arc<C>> = Vec::new();
        for conn in snapshot.iter() {
            if conn.is_closed() {
                closed.push(conn.clone());
                continue;
            }
            visitor(conn);
        }

        if !closed.is_empty() {
            bucket.rcu(|current| {
                current
                    .iter()
                    .filter(|c| !closed.iter().any(|dead| Arc::ptr_eq(c, dead)))
                    .cloned()
                    .collect::<Vec<_>>()
            });
            metrics::record_connections_swept(closed.len());
            tracing::debug!(key = %key, swept = closed.len(), "Swept closed connections");
        }
    }

    /// Tracked connections across all keys. May include connections that
    /// closed but have not been swept yet.
    pub fn count(&self) -> usize {
        self.buckets.iter().map(|entry| entry.value().load().len()).sum()
    }

    /// Tracked connections under `key`, with the same caveat as [`count`](Self::count).
    pub fn count_by_key(&self, key: &str) -> usize {
        self.bucket(key).map(|b| b.load().len()).unwrap_or(0)
    }

    /// Keys that currently have a bucket.
    pub fn keys(&self) -> Vec<String> {
        self.buckets.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Destroy every tracked connection and clear the registry.
    ///
    /// A failing destroy is logged and does not stop the others. Runs once;
    /// later calls do nothing and later registrations are ignored.
    pub fn release_resources(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        let buckets: Vec<(String, Bucket<C>)> = self
            .buckets
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut destroyed = 0usize;
        let mut failed = 0usize;
        for (key, bucket) in &buckets {
            for conn in bucket.load().iter() {
                match conn.destroy() {
                    Ok(()) => destroyed += 1,
                    Err(e) => {
                        failed += 1;
                        tracing::warn!(key = %key, error = %e, "Failed to destroy connection");
                    }
                }
            }
        }

        self.buckets.clear();
        metrics::record_connections_destroyed(destroyed);
        tracing::info!(destroyed, failed, "Connection registry released");
    }

    fn bucket(&self, key: &str) -> Option<Bucket<C>> {
        self.buckets.get(key).map(|entry| entry.value().clone())
    }
}

impl<C: Connection + ?Sized> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::ConnectionError;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct MockConnection {
        closed: AtomicBool,
        destroyed: AtomicUsize,
        fail_destroy: bool,
    }

    impl MockConnection {
        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    impl Connection for MockConnection {
        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }

        fn destroy(&self) -> Result<(), ConnectionError> {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            if self.fail_destroy {
                Err(ConnectionError::Teardown("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = ConnectionRegistry::new();
        let a = Arc::new(MockConnection::default());
        let b = Arc::new(MockConnection::default());

        registry.register("room", a.clone());
        registry.register("room", b.clone());
        registry.register("other", a.clone());

        assert_eq!(registry.count(), 3);
        assert_eq!(registry.count_by_key("room"), 2);
        assert_eq!(registry.count_by_key("missing"), 0);

        let live = registry.get("room");
        assert_eq!(live.len(), 2);
        assert!(Arc::ptr_eq(&live[0], &a));
        assert!(Arc::ptr_eq(&live[1], &b));
    }

    #[test]
    fn test_accept_unknown_key_is_noop() {
        let registry: ConnectionRegistry<MockConnection> = ConnectionRegistry::new();
        let mut visited = 0;
        registry.accept("nobody", |_| visited += 1);
        assert_eq!(visited, 0);
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn test_closed_connections_are_swept() {
        let registry = ConnectionRegistry::new();
        let live = Arc::new(MockConnection::default());
        let dead = Arc::new(MockConnection::default());
        registry.register("room", live.clone());
        registry.register("room", dead.clone());

        registry.accept("room", |_| {});
        assert_eq!(registry.count_by_key("room"), 2);

        dead.close();
        // Closed but not yet swept.
        assert_eq!(registry.count_by_key("room"), 2);

        let mut visited = Vec::new();
        registry.accept("room", |c| visited.push(c.clone()));
        assert_eq!(visited.len(), 1);
        assert!(Arc::ptr_eq(&visited[0], &live));
        assert_eq!(registry.count_by_key("room"), 1);
    }

    #[test]
    fn test_duplicate_registration_is_allowed() {
        let registry = ConnectionRegistry::new();
        let conn = Arc::new(MockConnection::default());
        registry.register("room", conn.clone());
        registry.register("room", conn.clone());
        assert_eq!(registry.count_by_key("room"), 2);

        // Sweeping removes every entry for the closed connection.
        conn.close();
        assert!(registry.get("room").is_empty());
        assert_eq!(registry.count_by_key("room"), 0);
    }

    #[test]
    fn test_release_resources_survives_failures() {
        let registry = ConnectionRegistry::new();
        let failing = Arc::new(MockConnection {
            fail_destroy: true,
            ..Default::default()
        });
        let ok = Arc::new(MockConnection::default());
        registry.register("a", failing.clone());
        registry.register("b", ok.clone());

        registry.release_resources();

        assert_eq!(failing.destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(ok.destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(registry.count(), 0);
        assert!(registry.is_released());

        // Terminal: nothing is tracked afterwards and nothing is destroyed twice.
        registry.register("a", ok.clone());
        registry.release_resources();
        assert_eq!(registry.count(), 0);
        assert_eq!(ok.destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_trait_objects() {
        let registry: ConnectionRegistry<dyn Connection> = ConnectionRegistry::new();
        let conn: Arc<dyn Connection> = Arc::new(MockConnection::default());
        registry.register("room", conn);
        assert_eq!(registry.get("room").len(), 1);
    }
}
