// SPDX-License-Identifier: Apache-2.0

use pawhaven_model::PetRecord;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Collection tag under which the all-pets view is cached.
pub const PETS_COLLECTION: &str = "pets";

#[derive(Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub invalidations: AtomicU64,
}

/// Keyed cache of listing snapshots.
///
/// The consistency contract lives here: every successful mutation calls
/// [`ListingCache::invalidate`] with the collection tag, so the next list
/// read goes back to the store instead of serving a stale snapshot. A
/// disabled cache answers every lookup with a miss and the service falls
/// through to the store on each read.
pub struct ListingCache {
    enabled: bool,
    entries: Mutex<HashMap<String, Vec<PetRecord>>>,
    pub stats: CacheStats,
}

impl ListingCache {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Mutex::new(HashMap::new()),
            stats: CacheStats::default(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<PetRecord>> {
        if !self.enabled {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some(pets) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(pets.clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub async fn put(&self, key: &str, pets: Vec<PetRecord>) {
        if !self.enabled {
            return;
        }
        self.entries.lock().await.insert(key.to_string(), pets);
    }

    /// Drops the snapshot under `key`. Returns whether one was cached; the
    /// invalidation is counted either way so mutation traffic stays visible
    /// even with the cache disabled.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().await.remove(key).is_some()
    }
}
