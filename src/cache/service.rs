//! Cache-proxy service boundary: routed single-value calls and entry streams.
//!
//! The real proxy lives elsewhere; this module fixes the contract shape the
//! harness is exercised against and supplies an in-memory fake whose streams
//! are produced on their own thread, so captures genuinely cross threads.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::thread;

use parking_lot::RwLock;
use tracing::debug;

use crate::cache::store::TriggeredStore;
use crate::cache::trigger::EntryTrigger;
use crate::core::errors::{ProbeError, Result};
use crate::probe::sink::StreamSink;

/// Routing identity of a logical cache: scope plus cache name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheAddress {
    pub scope: String,
    pub name: String,
}

impl CacheAddress {
    #[must_use]
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }

    fn unknown(&self) -> ProbeError {
        ProbeError::UnknownCache {
            scope: self.scope.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for CacheAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.name)
    }
}

/// Cache-proxy RPC shape: single-value calls plus a push-stream of entries.
pub trait ProxyService<K, V>: Send + Sync {
    fn get(&self, addr: &CacheAddress, key: &K) -> Result<Option<V>>;

    fn put(&self, addr: &CacheAddress, key: K, value: V) -> Result<Option<V>>;

    fn remove(&self, addr: &CacheAddress, key: &K) -> Result<Option<V>>;

    /// Push every entry to `sink` as a value, then exactly one terminal
    /// signal, from the service's own producer context. An unknown address
    /// surfaces as the stream's error outcome, not as a panic.
    fn stream_entries(&self, addr: &CacheAddress, sink: Arc<dyn StreamSink<(K, V), ProbeError>>);
}

/// Shared handle on one logical cache's backing store.
pub type SharedStore<K, V> = Arc<RwLock<TriggeredStore<K, V>>>;

/// In-memory fake proxy routing by [`CacheAddress`].
///
/// Mutations through the proxy and direct mutations on a cache handle go
/// through the same [`TriggeredStore`], so both observe the same triggers.
pub struct InMemoryProxy<K, V> {
    caches: RwLock<HashMap<CacheAddress, SharedStore<K, V>>>,
}

impl<K, V> InMemoryProxy<K, V>
where
    K: Eq + Hash + Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// Handle on the named cache, creating it if absent. The handle mutates
    /// the same store the proxy routes to.
    pub fn ensure_cache(&self, addr: &CacheAddress) -> SharedStore<K, V> {
        let mut caches = self.caches.write();
        Arc::clone(
            caches
                .entry(addr.clone())
                .or_insert_with(|| Arc::new(RwLock::new(TriggeredStore::new()))),
        )
    }

    /// Register a trigger on an existing cache.
    pub fn register_trigger(
        &self,
        addr: &CacheAddress,
        trigger: Arc<dyn EntryTrigger<K, V>>,
    ) -> Result<()> {
        let store = self.lookup(addr)?;
        store.write().register_trigger(trigger);
        Ok(())
    }

    fn lookup(&self, addr: &CacheAddress) -> Result<SharedStore<K, V>> {
        self.caches
            .read()
            .get(addr)
            .cloned()
            .ok_or_else(|| addr.unknown())
    }
}

impl<K, V> Default for InMemoryProxy<K, V>
where
    K: Eq + Hash + Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ProxyService<K, V> for InMemoryProxy<K, V>
where
    K: Eq + Hash + Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, addr: &CacheAddress, key: &K) -> Result<Option<V>> {
        Ok(self.lookup(addr)?.read().get(key).cloned())
    }

    fn put(&self, addr: &CacheAddress, key: K, value: V) -> Result<Option<V>> {
        self.lookup(addr)?.write().put(key, value)
    }

    fn remove(&self, addr: &CacheAddress, key: &K) -> Result<Option<V>> {
        self.lookup(addr)?.write().remove(key)
    }

    fn stream_entries(&self, addr: &CacheAddress, sink: Arc<dyn StreamSink<(K, V), ProbeError>>) {
        let resolved = self.lookup(addr);
        let addr = addr.clone();
        thread::spawn(move || match resolved {
            Ok(store) => {
                let entries = store.read().snapshot_ordered();
                debug!(cache = %addr, count = entries.len(), "streaming entries");
                for entry in entries {
                    sink.on_next(entry);
                }
                // Streaming-receiver spelling; same terminal event.
                sink.on_completed();
            }
            Err(fault) => sink.on_error(fault),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::recorder::StreamProbe;
    use std::time::Duration;

    fn addr() -> CacheAddress {
        CacheAddress::new("test-scope", "people")
    }

    #[test]
    fn address_display_is_scope_slash_name() {
        assert_eq!(addr().to_string(), "test-scope/people");
    }

    #[test]
    fn proxy_routes_single_value_calls_by_address() {
        let proxy: InMemoryProxy<String, i32> = InMemoryProxy::new();
        let people = addr();
        let things = CacheAddress::new("test-scope", "things");
        proxy.ensure_cache(&people);
        proxy.ensure_cache(&things);

        proxy.put(&people, "a".into(), 1).expect("put people");
        proxy.put(&things, "a".into(), 2).expect("put things");

        assert_eq!(proxy.get(&people, &"a".to_string()).expect("get"), Some(1));
        assert_eq!(proxy.get(&things, &"a".to_string()).expect("get"), Some(2));
        assert_eq!(
            proxy.remove(&people, &"a".to_string()).expect("remove"),
            Some(1)
        );
        assert_eq!(proxy.get(&people, &"a".to_string()).expect("get"), None);
    }

    #[test]
    fn unknown_cache_is_a_coded_error() {
        let proxy: InMemoryProxy<String, i32> = InMemoryProxy::new();
        let err = proxy
            .get(&addr(), &"missing".to_string())
            .expect_err("unrouted address");
        assert_eq!(err.code(), "SPB-4102");
    }

    #[test]
    fn streaming_an_unknown_cache_errors_the_stream() {
        let proxy: InMemoryProxy<String, i32> = InMemoryProxy::new();
        let probe: Arc<StreamProbe<(String, i32), ProbeError>> = Arc::new(StreamProbe::new());
        proxy.stream_entries(&addr(), probe.clone());

        assert!(probe.await_terminal(Duration::from_secs(10)));
        let cause = probe.first_error().expect("stream error outcome");
        assert_eq!(cause.code(), "SPB-4102");
        probe.assert_value_count(0).expect("no values streamed");
    }

    #[test]
    fn stream_delivers_ordered_entries_then_completes() {
        let proxy: InMemoryProxy<String, i32> = InMemoryProxy::new();
        let cache = addr();
        proxy.ensure_cache(&cache);
        for (key, value) in [("b", 2), ("a", 1), ("c", 3)] {
            proxy.put(&cache, key.into(), value).expect("seed");
        }

        let probe: Arc<StreamProbe<(String, i32), ProbeError>> = Arc::new(StreamProbe::new());
        proxy.stream_entries(&cache, probe.clone());

        assert!(probe.await_terminal(Duration::from_secs(10)));
        probe
            .assert_complete()
            .and_then(|p| p.assert_value_count(3))
            .expect("clean entry stream");
        assert_eq!(
            probe.values(),
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 3)
            ]
        );
    }
}
