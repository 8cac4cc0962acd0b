//! Response cache shared by every request handler.
//!
//! Entries expire a fixed TTL after they are written and are evicted lazily,
//! the next time their key is read. There is no background sweep.
//!
//! Concurrent misses on the same key are not coalesced: two handlers that
//! both miss will both fetch upstream and both write, and the last write
//! wins. Each read-check and each write is atomic on its own.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A cached upstream payload.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// TTL cache of upstream payloads keyed by request path.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Return the live value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.read();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Re-check under the write lock; a concurrent writer may have refreshed it.
        let mut entries = self.write();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                debug!("evicting expired cache entry for {}", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key`, expiring `ttl` from now.
    pub fn insert(&self, key: &str, value: Value) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.write().insert(key.to_string(), entry);
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Values are immutable JSON, so a poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}
