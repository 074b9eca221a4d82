//! Bounded LRU cache with count and age limits.
//!
//! The cache maps opaque keys to heavyweight payload handles and keeps them
//! in recency order: the least recently touched entry is always the next to
//! go. Two limits apply (a maximum entry count and a maximum time since last
//! access), plus a recurring trim pass that enforces both in the background.
//!
//! # Features
//!
//! - **O(1) operations**: lookup-with-promotion, insert, remove, and
//!   single-entry eviction are all constant time
//! - **Get-or-create**: [`PageCache::get_or_insert_with`] produces a missing
//!   payload exactly once, so expensive pages are never built twice
//! - **Deferred destruction**: evicted payloads can be dropped on a
//!   background task, keeping destructor cost off the access path
//! - **Pressure hooks**: memory-pressure and backgrounding signals forward
//!   to registered callbacks; policy stays with the caller
//! - **Metrics**: optional hit/miss/eviction statistics
//! - **Testable**: clock abstraction for deterministic age-limit tests
//!
//! # Examples
//!
//! ## Count-limited cache
//! ```
//! use pagecache::{CacheConfig, PageCache};
//!
//! let cache: PageCache<u32, String> = PageCache::new(CacheConfig::count_limited(100));
//! cache.insert(1, "page one".to_string());
//! assert_eq!(cache.get(&1), Some("page one".to_string()));
//! ```
//!
//! ## Get-or-create with lazy construction
//! ```
//! use pagecache::{CacheConfig, PageCache};
//!
//! let cache: PageCache<u32, String> = PageCache::new(CacheConfig::default());
//!
//! let page = cache.get_or_insert_with(7, || {
//!     // Expensive construction only runs on a miss
//!     "rendered".to_string()
//! });
//! assert_eq!(page, "rendered");
//! ```
//!
//! ## Dual limits and pressure wiring
//! ```
//! use std::time::Duration;
//!
//! use pagecache::{CacheConfig, PageCache};
//!
//! let config = CacheConfig::builder()
//!     .count_limit(50)
//!     .age_limit(Duration::from_secs(600))
//!     .build();
//!
//! let cache: PageCache<String, Vec<u8>> = PageCache::new(config);
//! cache.set_memory_pressure_hook(|cache| cache.remove_all());
//! ```

mod config;
mod core;
mod reclaim;
mod stats;

// Re-export public API
pub use config::{CacheConfig, CacheConfigBuilder, ConfigError, DEFAULT_AUTO_TRIM_INTERVAL};
pub use core::PageCache;
pub use stats::CacheStats;
