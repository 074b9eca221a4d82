//! Bounded LRU cache for heavyweight page objects.
//!
//! `pagecache` keeps expensive-to-recreate payloads behind opaque keys with
//! count and age limits, O(1) access-with-promotion, and optional deferred
//! destruction of evicted payloads on a background task.
//!
//! The crate has two layers:
//! - [`index::OrderedIndex`]: a policy-free hash index combined with an
//!   intrusive recency list (the ordered-container primitive)
//! - [`cache::PageCache`]: the policy layer adding limits, timestamps, trim
//!   passes, pressure hooks, and the recurring auto-trim task
//!
//! # Threading model
//!
//! The cache is built for one logical owner (e.g. a UI thread) driving all
//! mutation. Internally a single lock serializes the index, so sharing
//! handles across threads is safe but unarbitrated. Deferred destruction is
//! the only asynchronous side channel: ownership of evicted payloads
//! transfers to a background task and their drop completes at some later
//! point.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod index;
pub mod time;

// Re-export commonly used types for convenience
// ------------------------------
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheStats, ConfigError, PageCache,
    DEFAULT_AUTO_TRIM_INTERVAL,
};
pub use index::{Entry, NodeId, OrderedIndex};
pub use time::{Clock, MockClock, SystemClock, TimerHandle};
