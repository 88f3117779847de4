//! Process-wide TTL cache for provider payloads
//!
//! One store is shared by every orchestration run in the process; the key
//! is (provider kind, normalized target). Entries expire by TTL and are
//! evicted lazily by the read that observes the expiry - there is no
//! background sweeper. Writes to the same key are last-write-wins.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::Target;
use crate::provider::{ProviderKind, RawRecord};

struct CacheEntry {
    value: Vec<RawRecord>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Time-bounded memo of raw provider responses.
#[derive(Default)]
pub struct LookupCache {
    entries: Mutex<HashMap<(ProviderKind, String), CacheEntry>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a live entry, evicting it first if its TTL has lapsed.
    pub fn get(&self, kind: ProviderKind, target: &Target) -> Option<Vec<RawRecord>> {
        let key = (kind, target.as_str().to_string());
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        if entries.get(&key).is_some_and(|entry| entry.is_expired()) {
            entries.remove(&key);
            return None;
        }
        entries.get(&key).map(|entry| entry.value.clone())
    }

    /// Store a payload. Overwrites any previous entry for the key.
    pub fn put(&self, kind: ProviderKind, target: &Target, value: Vec<RawRecord>, ttl: Duration) {
        let key = (kind, target.as_str().to_string());
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}
