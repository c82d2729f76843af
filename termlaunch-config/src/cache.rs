//! Per-scope memoization for resolved setting values.
//!
//! Each [`crate::Entry`] owns one [`ScopeCache`]. A value is computed at most
//! once per scope between clears, so producers that log diagnostics only log
//! once per invalid value.

use crate::scope::Scope;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Cache of resolved values keyed by [`Scope`].
///
/// The producer is supplied at the call site. The lock is released while the
/// producer runs so a producer may consult the same cache for another scope
/// (scoped reads fall back to the global value this way).
#[derive(Debug)]
pub struct ScopeCache<V> {
    values: Mutex<HashMap<Scope, V>>,
}

impl<V> Default for ScopeCache<V> {
    fn default() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> ScopeCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `scope`, computing it with `producer` on a miss.
    pub fn get<F>(&self, scope: &Scope, producer: F) -> V
    where
        F: FnOnce(&Scope) -> V,
    {
        if let Some(value) = self.values.lock().get(scope) {
            return value.clone();
        }

        log::trace!("Setting cache miss for scope '{}'", scope);
        let computed = producer(scope);

        // First stored value wins so every caller sees the same result.
        self.values
            .lock()
            .entry(scope.clone())
            .or_insert(computed)
            .clone()
    }

    /// Return the cached value for `scope` without computing anything.
    pub fn get_cache(&self, scope: &Scope) -> Option<V> {
        self.values.lock().get(scope).cloned()
    }

    /// Drop the value for one scope, or every scope when `scope` is `None`.
    pub fn clear(&self, scope: Option<&Scope>) {
        let mut values = self.values.lock();
        match scope {
            Some(scope) => {
                values.remove(scope);
            }
            None => values.clear(),
        }
    }

    /// Number of scopes currently holding a value.
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}
