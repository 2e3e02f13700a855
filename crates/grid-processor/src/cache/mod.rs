//! Process-local grid cache.

mod grid_cache;

pub use grid_cache::{CacheStats, GridCache, GridKey};
