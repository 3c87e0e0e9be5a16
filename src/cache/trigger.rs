//! Entry-mutation interception: triggers run before a store commit.

use crate::core::errors::{ProbeError, Result};

/// Pending mutation of a single key's entry, as seen by a trigger.
///
/// `original` is the committed value before the mutation; `pending` is what
/// will be committed (absent for a removal). Triggers may rewrite or clear
/// the pending value, or veto the whole mutation by returning an error.
#[derive(Debug)]
pub struct TriggerEntry<K, V> {
    key: K,
    original: Option<V>,
    pending: Option<V>,
}

impl<K, V> TriggerEntry<K, V> {
    pub(crate) fn new(key: K, original: Option<V>, pending: Option<V>) -> Self {
        Self {
            key,
            original,
            pending,
        }
    }

    /// Key whose entry is being mutated.
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Committed value before this mutation, if the key existed.
    #[must_use]
    pub fn original(&self) -> Option<&V> {
        self.original.as_ref()
    }

    /// Value about to be committed, absent for a removal.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.pending.as_ref()
    }

    /// Replace the value that will be committed.
    pub fn set_value(&mut self, value: V) {
        self.pending = Some(value);
    }

    /// Turn the mutation into a removal.
    pub fn remove(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_insert(&self) -> bool {
        self.original.is_none() && self.pending.is_some()
    }

    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.pending.is_none()
    }

    pub(crate) fn into_pending(self) -> Option<V> {
        self.pending
    }
}

/// Interceptor invoked around a single key's mutation before it commits.
///
/// A proxied mutation must observe the same interception as a direct one;
/// the store runs every registered trigger on every mutation path.
pub trait EntryTrigger<K, V>: Send + Sync {
    /// Inspect or rewrite the pending entry. An error vetoes the mutation
    /// and leaves the store untouched.
    fn before_commit(&self, entry: &mut TriggerEntry<K, V>) -> Result<()>;
}

/// Convenience constructor for the veto error triggers return.
#[must_use]
pub fn veto(reason: impl Into<String>) -> ProbeError {
    ProbeError::TriggerVeto {
        reason: reason.into(),
    }
}
