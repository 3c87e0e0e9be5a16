//! In-memory keyed store with trigger interception on every mutation.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::cache::trigger::{EntryTrigger, TriggerEntry};
use crate::core::errors::Result;

/// Keyed store whose every mutation runs the registered trigger pipeline
/// before committing. A vetoed mutation leaves the store untouched.
pub struct TriggeredStore<K, V> {
    entries: HashMap<K, V>,
    triggers: Vec<Arc<dyn EntryTrigger<K, V>>>,
}

impl<K, V> TriggeredStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            triggers: Vec::new(),
        }
    }

    pub fn register_trigger(&mut self, trigger: Arc<dyn EntryTrigger<K, V>>) {
        self.triggers.push(trigger);
    }

    /// Insert or update, returning the previous value.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.commit(key, Some(value))
    }

    /// Remove, returning the previous value. Removing an absent key is a
    /// no-op and runs no triggers.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>> {
        if !self.entries.contains_key(key) {
            return Ok(None);
        }
        self.commit(key.clone(), None)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn commit(&mut self, key: K, pending: Option<V>) -> Result<Option<V>> {
        let original = self.entries.get(&key).cloned();
        let mut entry = TriggerEntry::new(key.clone(), original, pending);
        for trigger in &self.triggers {
            trigger.before_commit(&mut entry)?;
        }
        match entry.into_pending() {
            Some(value) => Ok(self.entries.insert(key, value)),
            None => {
                let previous = self.entries.remove(&key);
                debug!(removed = previous.is_some(), "entry removed");
                Ok(previous)
            }
        }
    }
}

impl<K, V> TriggeredStore<K, V>
where
    K: Eq + Hash + Clone + Ord,
    V: Clone,
{
    /// Key-ordered clone of every entry, for deterministic streaming.
    #[must_use]
    pub fn snapshot_ordered(&self) -> Vec<(K, V)> {
        let mut entries: Vec<(K, V)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl<K, V> Default for TriggeredStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
