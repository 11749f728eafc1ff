//! Fee Snapshot Cache Module
//!
//! Two independent tiers keyed by [`FeeCacheKey`]:
//!
//! - the primary tier holds snapshots for a limited time and a limited number
//!   of keys, evicting expired entries first and then the least recently used;
//! - the last-known-good tier holds the latest successful snapshot per key with
//!   no expiry and is only overwritten by a newer success.
//!
//! Both tiers are concurrent maps; a lookup followed by an insert for the same
//! key may race and recompute once, which is harmless.
use crate::{
    config::{ChainProfile, FeeModel},
    constants::{DEFAULT_FEE_CACHE_CAPACITY, DEFAULT_FEE_CACHE_TTL_SECS, MIN_FEE_CACHE_TTL_SECS},
    models::FeeSnapshot,
};
use dashmap::DashMap;
use log::{debug, info};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeeCacheKey {
    pub chain_key: String,
    pub fee_model: FeeModel,
    /// Effective precise flag; precise and standard entries never mix.
    pub precise: bool,
}

impl FeeCacheKey {
    pub fn new(chain: &ChainProfile, precise: bool) -> Self {
        Self {
            chain_key: chain.key.clone(),
            fee_model: chain.fee_model,
            precise,
        }
    }
}

/// Represents an entry in the primary tier.
#[derive(Clone, Debug)]
pub struct FeeCacheEntry {
    pub snapshot: Arc<FeeSnapshot>,
    pub stored_at: Instant,
    pub last_accessed: Instant,
}

impl FeeCacheEntry {
    fn new(snapshot: Arc<FeeSnapshot>) -> Self {
        let now = Instant::now();
        Self {
            snapshot,
            stored_at: now,
            last_accessed: now,
        }
    }

    /// Checks if the entry outlived `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// Thread-safe two-tier fee snapshot cache
#[derive(Debug)]
pub struct FeeCache {
    /// TTL and capacity bounded snapshots
    entries: DashMap<FeeCacheKey, FeeCacheEntry>,
    /// Latest successful snapshot per key, kept indefinitely
    last_known_good: DashMap<FeeCacheKey, Arc<FeeSnapshot>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for FeeCache {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_FEE_CACHE_TTL_SECS),
            DEFAULT_FEE_CACHE_CAPACITY as usize,
        )
    }
}

impl FeeCache {
    /// Creates a cache; `ttl` is raised to the minimum and `capacity` to one.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            last_known_good: DashMap::new(),
            ttl: ttl.max(Duration::from_secs(MIN_FEE_CACHE_TTL_SECS)),
            capacity: capacity.max(1),
        }
    }

    #[cfg(test)]
    fn with_raw_ttl(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            ..Self::new(ttl, capacity)
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the primary-tier snapshot if present and not expired.
    pub fn get(&self, key: &FeeCacheKey) -> Option<Arc<FeeSnapshot>> {
        {
            let mut entry = self.entries.get_mut(key)?;
            if !entry.is_expired(self.ttl) {
                entry.last_accessed = Instant::now();
                return Some(entry.snapshot.clone());
            }
        }

        debug!("fee cache entry for {} expired", key.chain_key);
        self.entries
            .remove_if(key, |_, entry| entry.is_expired(self.ttl));
        None
    }

    /// Stores a fresh snapshot in both tiers.
    pub fn insert(&self, key: FeeCacheKey, snapshot: FeeSnapshot) -> Arc<FeeSnapshot> {
        let snapshot = Arc::new(snapshot);

        if !self.entries.contains_key(&key) {
            self.make_room();
        }
        self.entries
            .insert(key.clone(), FeeCacheEntry::new(snapshot.clone()));
        self.last_known_good.insert(key.clone(), snapshot.clone());

        info!(
            "Updated fee snapshot for {} (precise: {})",
            key.chain_key, key.precise
        );
        snapshot
    }

    /// Returns the latest successful snapshot regardless of age.
    pub fn last_known_good(&self, key: &FeeCacheKey) -> Option<Arc<FeeSnapshot>> {
        self.last_known_good.get(key).map(|entry| entry.clone())
    }

    /// Removes the primary-tier entry; the last-known-good copy survives.
    pub fn remove(&self, key: &FeeCacheKey) -> Option<Arc<FeeSnapshot>> {
        self.entries.remove(key).map(|(_, entry)| entry.snapshot)
    }

    /// Clears both tiers
    pub fn clear(&self) {
        self.entries.clear();
        self.last_known_good.clear();
    }

    /// Returns the number of primary-tier entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the primary tier is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self) {
        if self.entries.len() < self.capacity {
            return;
        }

        self.entries.retain(|_, entry| !entry.is_expired(self.ttl));

        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.last_accessed)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    debug!("evicting least recently used fee entry {}", key.chain_key);
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}
