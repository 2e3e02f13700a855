//! Append-only cache of fetched grids keyed by `(cycle, variable)`.
//!
//! An analysis never changes once published, so entries are written once
//! on the miss path and never evicted or replaced. Lookups are exact: a
//! missing key is a miss even if a neighbouring cycle is cached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use firewx_common::{AnalysisCycle, VariableGrid, VariableName};
use metrics::counter;
use tokio::sync::RwLock;

/// Cache key.
pub type GridKey = (AnalysisCycle, VariableName);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate in percent.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Shared, concurrently readable grid cache.
#[derive(Default)]
pub struct GridCache {
    entries: RwLock<HashMap<GridKey, Arc<VariableGrid>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GridCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a grid, recording a hit or miss.
    pub async fn get(&self, key: &GridKey) -> Option<Arc<VariableGrid>> {
        let found = self.entries.read().await.get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            counter!("grid_cache_hits_total").increment(1);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            counter!("grid_cache_misses_total").increment(1);
        }
        found
    }

    /// Store a grid. If another task stored the same key first, that
    /// entry is kept and returned.
    pub async fn insert(&self, key: GridKey, grid: Arc<VariableGrid>) -> Arc<VariableGrid> {
        let mut entries = self.entries.write().await;
        entries.entry(key).or_insert(grid).clone()
    }

    pub async fn contains(&self, key: &GridKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().await.len(),
        }
    }
}
