//! In-memory TTL cache backing cached GETs
//!
//! Provides a `TtlCache` that stores cloneable values under string keys with
//! per-entry expiry. Reads are lazy about expiry: an expired entry is removed
//! at read time and reported as a miss, so a stale value can never be
//! resurrected.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;

/// A single cached value with its write time and lifetime
#[derive(Debug)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the value was written
    stored_at: Instant,
    /// How long the value stays fresh after `stored_at`
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) < self.ttl
    }

    fn expires_at(&self) -> Instant {
        self.stored_at + self.ttl
    }
}

/// In-memory key→value cache with per-entry TTL and lazy expiry
///
/// All methods take `&self`; the cache is safe to share behind an `Arc` across
/// tasks. An optional `max_entries` cap bounds memory for long-running
/// processes: when an insert of a new key would exceed the cap, expired
/// entries are purged first, and if the cache is still full the entry closest
/// to expiry is evicted. Writes are never rejected.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    max_entries: Option<usize>,
}

impl<V: Clone> TtlCache<V> {
    /// Creates an uncapped cache with the given default TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            max_entries: None,
        }
    }

    /// Caps the cache at `max_entries` entries
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Looks up a key, returning the value only while it is still fresh
    ///
    /// An expired entry is removed before returning `None`, so a later write
    /// under the same key starts from a clean slate and an expired read is
    /// indistinguishable from a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        if !entry.is_fresh(Instant::now()) {
            // Release the read guard before removing
            drop(entry);
            self.entries.remove(key);
            debug!("cache expired: {key}");
            return None;
        }
        Some(entry.value.clone())
    }

    /// Stores a value under `key` with the cache's default TTL
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    /// Stores a value under `key` with an explicit TTL
    ///
    /// Unconditionally overwrites any existing entry; the freshness clock
    /// restarts at the time of this write.
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        if let Some(cap) = self.max_entries {
            if !self.entries.contains_key(&key) && self.entries.len() >= cap {
                self.make_room();
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Removes the entry for `key`; no-op when absent
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Empties the cache (logout / explicit cache-busting)
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Current entry count, including not-yet-collected expired entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frees at least one slot: drops expired entries, then the entry closest
    /// to expiry if none were expired
    fn make_room(&self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        if self.entries.len() < before {
            debug!("cache purged {} expired entries", before - self.entries.len());
            return;
        }

        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.expires_at())
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            debug!("cache evicting {key} to stay under cap");
            self.entries.remove(&key);
        }
    }
}
