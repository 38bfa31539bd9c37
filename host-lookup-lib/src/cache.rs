//! Shared resolution cache.
//!
//! Maps host names to addresses that were already resolved during this run,
//! so a resolver can skip the external lookup. Reads take a shared lock and
//! may run in parallel; writes take the exclusive lock.
//!
//! The cache is append-only: once a name has an address it is never
//! replaced. Failed lookups are never stored.

use crate::types::MAX_CACHE_CAPACITY;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Thread-safe host name to address map for a single run.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    addresses: RwLock<HashMap<String, String>>,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache pre-sized for `capacity` names.
    ///
    /// The hint is capped at `MAX_CACHE_CAPACITY`; the cache still grows
    /// past it on demand.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            addresses: RwLock::new(HashMap::with_capacity(capacity.min(MAX_CACHE_CAPACITY))),
        }
    }

    /// Look up a previously resolved address.
    pub fn get(&self, name: &str) -> Option<String> {
        self.addresses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Remember `address` for `name`.
    ///
    /// Returns `false` and leaves the cache untouched when the name is
    /// already present or `address` is empty.
    pub fn put(&self, name: &str, address: &str) -> bool {
        if address.is_empty() {
            return false;
        }

        let mut addresses = self
            .addresses
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if addresses.contains_key(name) {
            return false;
        }
        addresses.insert(name.to_string(), address.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.addresses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Number of cached names.
    pub fn len(&self) -> usize {
        self.addresses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
