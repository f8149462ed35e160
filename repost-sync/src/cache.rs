//! Run-scoped memoizing resolver.
//!
//! Every lookup is checked against the in-memory map before the store is
//! asked. Only successful lookups are stored: a failed key is looked up
//! remotely again on its next reference.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Key for taxonomy term lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermKey {
    pub term_set_id: String,
    pub label: String,
}

/// Key for field descriptor lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub list: String,
    pub internal_name: String,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub failures: usize,
}

#[derive(Debug)]
pub struct ResolverCache<K, V> {
    kind: &'static str,
    entries: HashMap<K, V>,
    stats: CacheStats,
}

impl<K, V> ResolverCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Empty cache; `kind` names the entity in log output.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Cached value for `key`, or the result of `lookup`. Errors are returned
    /// to the caller and never cached.
    pub fn try_resolve<E, F>(&mut self, key: &K, lookup: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(value) = self.entries.get(key) {
            self.stats.hits += 1;
            return Ok(value.clone());
        }
        self.stats.misses += 1;
        match lookup(key) {
            Ok(value) => {
                self.entries.insert(key.clone(), value.clone());
                Ok(value)
            }
            Err(err) => {
                self.stats.failures += 1;
                Err(err)
            }
        }
    }

    /// Like [`try_resolve`](Self::try_resolve), but a failure is logged and
    /// reported as `None`.
    pub fn resolve<E, F>(&mut self, key: &K, lookup: F) -> Option<V>
    where
        E: fmt::Display,
        F: FnOnce(&K) -> Result<V, E>,
    {
        match self.try_resolve(key, lookup) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(kind = self.kind, key = ?key, error = %err, "unable to resolve");
                None
            }
        }
    }
}
