//! Bounded LRU page cache.
//!
//! [`PageCache`] layers count and age limits over the ordered index: every
//! read or write hit stamps the entry and promotes it to the head of the
//! recency list, and evictions always take the tail. Evicted payloads can be
//! destroyed on a background task so the access path never pays destructor
//! cost.
//!
//! Cache handles are cheap clones over shared state. Mutation is serialized
//! by a single internal lock; the recurring auto-trim task takes the same
//! lock, so trim passes and foreground operations never interleave node
//! mutations. The cache is intended to be driven by one logical owner; the
//! lock makes concurrent access safe, not fair.

use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::config::CacheConfig;
use super::reclaim::{Discard, Reclaimer};
use super::stats::{CacheStats, MetricsCollector};
use crate::index::{Entry, OrderedIndex};
use crate::time::{recurring, Clock, SystemClock, TimerHandle};

type PressureHook<K, V, C> = Arc<dyn Fn(&PageCache<K, V, C>) + Send + Sync>;

/// LRU cache with count and age limits for heavyweight page objects.
///
/// Values are handles to expensive-to-recreate payloads (typically
/// `Arc<Page>`); a hit returns a clone of the handle. Limits are enforced
/// lazily: each insert evicts at most one tail entry, bulk correction happens
/// through [`trim_to_count`](Self::trim_to_count) /
/// [`trim_to_age`](Self::trim_to_age) and the recurring auto-trim pass.
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash`)
/// - `V`: Payload handle type (must be `Clone`)
/// - `C`: Clock type for age tracking (defaults to [`SystemClock`])
///
/// # Example
/// ```
/// use pagecache::{CacheConfig, PageCache};
///
/// let cache: PageCache<String, i32> = PageCache::new(CacheConfig::count_limited(2));
/// cache.insert("a".to_string(), 1);
/// cache.insert("b".to_string(), 2);
/// cache.insert("c".to_string(), 3); // Evicts "a"
///
/// assert!(!cache.contains(&"a".to_string()));
/// assert_eq!(cache.get(&"b".to_string()), Some(2));
/// ```
pub struct PageCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    inner: Arc<Inner<K, V, C>>,
}

struct State<K, V>
where
    K: Eq + Hash,
{
    index: OrderedIndex<K, V>,
    count_limit: Option<usize>,
    age_limit: Option<Duration>,
    defer_destruction: bool,
}

impl<K, V> State<K, V>
where
    K: Eq + Hash,
{
    fn over_count_limit(&self) -> bool {
        self.count_limit.map_or(false, |limit| self.index.len() > limit)
    }
}

struct Hooks<K, V, C>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    memory_pressure: Option<PressureHook<K, V, C>>,
    entered_background: Option<PressureHook<K, V, C>>,
}

impl<K, V, C> Hooks<K, V, C>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    fn new() -> Self {
        Self { memory_pressure: None, entered_background: None }
    }
}

struct Inner<K, V, C>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    state: Mutex<State<K, V>>,
    hooks: Mutex<Hooks<K, V, C>>,
    metrics: MetricsCollector,
    track_metrics: bool,
    reclaimer: Reclaimer<K, V>,
    timer: TimerHandle,
    clock: C,
}

impl<K, V> PageCache<K, V, SystemClock>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    /// Create a cache with the given configuration using the system clock.
    ///
    /// The recurring auto-trim task and the deferred-destruction worker are
    /// spawned on the ambient tokio runtime; without one, auto-trim is
    /// disabled and destruction is inline (both logged).
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> PageCache<K, V, C>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    /// Create a cache with a custom clock (useful for testing age limits).
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        let CacheConfig { count_limit, age_limit, auto_trim_interval, defer_destruction, track_metrics } =
            config;

        let inner = Arc::new_cyclic(|weak: &Weak<Inner<K, V, C>>| {
            let timer = if auto_trim_interval.is_zero() {
                warn!("auto-trim disabled: zero interval");
                let inert = TimerHandle::new();
                inert.cancel();
                inert
            } else {
                let weak = weak.clone();
                recurring(auto_trim_interval, move || {
                    // A dead Weak means the last cache handle is gone; the
                    // cancelled flag stops the loop shortly after.
                    if let Some(inner) = weak.upgrade() {
                        PageCache { inner }.auto_trim();
                    }
                })
            };

            Inner {
                state: Mutex::new(State {
                    index: OrderedIndex::new(),
                    count_limit,
                    age_limit,
                    defer_destruction,
                }),
                hooks: Mutex::new(Hooks::new()),
                metrics: MetricsCollector::new(),
                track_metrics,
                reclaimer: Reclaimer::new(),
                timer,
                clock,
            }
        });

        Self { inner }
    }

    /// Look up a value, promoting the entry to most recently used.
    ///
    /// Returns `None` when the key is absent. A hit stamps the entry with the
    /// current time.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();
        match state.index.lookup(key) {
            Some(id) => {
                state.index.touch(id, now);
                state.index.move_to_head(id);
                let value = state.index.value(id).clone();
                drop(state);
                self.record(MetricsCollector::record_hit);
                Some(value)
            }
            None => {
                drop(state);
                self.record(MetricsCollector::record_miss);
                None
            }
        }
    }

    /// Get the value for `key`, or produce and insert one on a miss.
    ///
    /// `producer` runs exactly once, synchronously, only on a miss, and
    /// outside the cache lock. It must not operate on this cache itself;
    /// reentrant calls are unsupported. The inserted entry is subject to the
    /// same single-step count-limit check as [`insert`](Self::insert).
    ///
    /// # Example
    /// ```
    /// use pagecache::{CacheConfig, PageCache};
    ///
    /// let cache: PageCache<u32, String> = PageCache::new(CacheConfig::default());
    /// let page = cache.get_or_insert_with(7, || "rendered page".to_string());
    /// assert_eq!(page, "rendered page");
    /// ```
    pub fn get_or_insert_with<F>(&self, key: K, producer: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        let value = producer();
        self.insert(key, value.clone());
        value
    }

    /// Insert or overwrite a value, promoting the entry to most recently
    /// used.
    ///
    /// After a fresh insertion, if the count limit is exceeded the single
    /// least recently used entry is evicted. One insert never evicts more
    /// than one entry; use [`trim_to_count`](Self::trim_to_count) after
    /// tightening a limit.
    pub fn insert(&self, key: K, value: V) {
        let now = self.inner.clock.now();
        let (evicted, defer) = {
            let mut state = self.inner.state.lock();
            match state.index.lookup(&key) {
                Some(id) => {
                    state.index.replace_value(id, value);
                    state.index.touch(id, now);
                    state.index.move_to_head(id);
                    (None, state.defer_destruction)
                }
                None => {
                    state.index.insert_at_head(key, value, now);
                    self.record(MetricsCollector::record_insert);
                    let evicted =
                        if state.over_count_limit() { state.index.remove_tail() } else { None };
                    (evicted, state.defer_destruction)
                }
            }
        };

        if let Some(entry) = evicted {
            self.record(|metrics| metrics.record_count_evictions(1));
            trace!("evicted tail entry over count limit");
            self.dispose(vec![entry], defer);
        }
    }

    /// Upsert-or-remove: `Some(value)` behaves as [`insert`](Self::insert),
    /// `None` as [`remove`](Self::remove).
    pub fn set(&self, key: K, value: Option<V>) {
        match value {
            Some(value) => self.insert(key, value),
            None => self.remove(&key),
        }
    }

    /// Remove the entry for `key`; no-op when absent.
    pub fn remove(&self, key: &K) {
        let (removed, defer) = {
            let mut state = self.inner.state.lock();
            let removed = state.index.lookup(key).map(|id| state.index.remove(id));
            (removed, state.defer_destruction)
        };

        if let Some(entry) = removed {
            self.dispose(vec![entry], defer);
        }
    }

    /// Drop every entry.
    ///
    /// The storage is swapped for a fresh one in `O(1)`; with deferral on,
    /// the old storage's destruction happens entirely off this thread, so a
    /// full clear never blocks on payload destructor cost.
    pub fn remove_all(&self) {
        let (storage, defer) = {
            let mut state = self.inner.state.lock();
            (mem::take(&mut state.index), state.defer_destruction)
        };

        if storage.is_empty() {
            return;
        }
        debug!(entries = storage.len(), "clearing cache");
        if defer {
            self.inner.reclaimer.discard(Discard::Storage(storage));
        } else {
            drop(storage);
        }
    }

    /// Presence check without promotion.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.inner.state.lock().index.lookup(key).is_some()
    }

    /// Read a value without promoting the entry or stamping its age.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<V> {
        let state = self.inner.state.lock();
        state.index.lookup(key).map(|id| state.index.value(id).clone())
    }

    /// Current number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.lock().index.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict tail entries until at most `count` remain.
    ///
    /// `count == 0` is equivalent to [`remove_all`](Self::remove_all).
    /// Evicted entries are destroyed as one batch, not one deferral hop per
    /// entry.
    pub fn trim_to_count(&self, count: usize) {
        if count == 0 {
            return self.remove_all();
        }

        let (batch, defer) = {
            let mut state = self.inner.state.lock();
            let mut batch = Vec::new();
            while state.index.len() > count {
                match state.index.remove_tail() {
                    Some(entry) => batch.push(entry),
                    None => break,
                }
            }
            (batch, state.defer_destruction)
        };

        if batch.is_empty() {
            return;
        }
        self.record(|metrics| metrics.record_count_evictions(batch.len() as u64));
        debug!(evicted = batch.len(), "trimmed cache to count");
        self.dispose(batch, defer);
    }

    /// Evict tail entries whose last access is older than `age`.
    ///
    /// Recency order makes this a prefix trim of the tail: the walk stops at
    /// the first entry within the age budget. `age == 0` is equivalent to
    /// [`remove_all`](Self::remove_all).
    pub fn trim_to_age(&self, age: Duration) {
        if age.is_zero() {
            return self.remove_all();
        }

        let now = self.inner.clock.now();
        let (batch, defer) = {
            let mut state = self.inner.state.lock();
            let mut batch = Vec::new();
            loop {
                let tail = match state.index.tail() {
                    Some(tail) => tail,
                    None => break,
                };
                if now.duration_since(state.index.last_access(tail)) <= age {
                    break;
                }
                if let Some(entry) = state.index.remove_tail() {
                    batch.push(entry);
                }
            }
            (batch, state.defer_destruction)
        };

        if batch.is_empty() {
            return;
        }
        self.record(|metrics| metrics.record_age_evictions(batch.len() as u64));
        debug!(evicted = batch.len(), "trimmed cache to age");
        self.dispose(batch, defer);
    }

    /// Configured count limit.
    #[must_use]
    pub fn count_limit(&self) -> Option<usize> {
        self.inner.state.lock().count_limit
    }

    /// Change the count limit.
    ///
    /// Takes effect on subsequent inserts and trim passes; existing excess
    /// entries are not evicted until then.
    pub fn set_count_limit(&self, limit: Option<usize>) {
        self.inner.state.lock().count_limit = limit;
    }

    /// Configured age limit.
    #[must_use]
    pub fn age_limit(&self) -> Option<Duration> {
        self.inner.state.lock().age_limit
    }

    /// Change the age limit. Takes effect on subsequent trim passes.
    pub fn set_age_limit(&self, limit: Option<Duration>) {
        self.inner.state.lock().age_limit = limit;
    }

    /// Whether evicted payloads are destroyed on the background task.
    #[must_use]
    pub fn defer_destruction(&self) -> bool {
        self.inner.state.lock().defer_destruction
    }

    /// Enable or disable deferred destruction for subsequent evictions.
    pub fn set_defer_destruction(&self, defer: bool) {
        self.inner.state.lock().defer_destruction = defer;
    }

    /// Handle for the recurring auto-trim task.
    ///
    /// Already cancelled when the cache was built without a runtime or with a
    /// zero interval. Cancelling it stops automatic trimming without
    /// affecting any other cache behavior.
    #[must_use]
    pub fn auto_trim_handle(&self) -> TimerHandle {
        self.inner.timer.clone()
    }

    /// Register the callback invoked by
    /// [`notify_memory_pressure`](Self::notify_memory_pressure).
    ///
    /// The cache takes no action of its own on pressure; callers typically
    /// wire this to a trim or a clear.
    pub fn set_memory_pressure_hook<F>(&self, hook: F)
    where
        F: Fn(&Self) + Send + Sync + 'static,
    {
        self.inner.hooks.lock().memory_pressure = Some(Arc::new(hook));
    }

    /// Register the callback invoked by
    /// [`notify_entered_background`](Self::notify_entered_background).
    pub fn set_background_hook<F>(&self, hook: F)
    where
        F: Fn(&Self) + Send + Sync + 'static,
    {
        self.inner.hooks.lock().entered_background = Some(Arc::new(hook));
    }

    /// Signal memory pressure. Invokes the registered hook, if any, with
    /// this cache; the hook may freely call trim or clear operations.
    pub fn notify_memory_pressure(&self) {
        let hook = self.inner.hooks.lock().memory_pressure.clone();
        if let Some(hook) = hook {
            trace!("memory pressure signalled");
            hook(self);
        }
    }

    /// Signal that the owning application moved to the background. Invokes
    /// the registered hook, if any, with this cache.
    pub fn notify_entered_background(&self) {
        let hook = self.inner.hooks.lock().entered_background.clone();
        if let Some(hook) = hook {
            trace!("background transition signalled");
            hook(self);
        }
    }

    /// Statistics snapshot. All counters read zero unless the cache was
    /// configured with `track_metrics`.
    pub fn stats(&self) -> CacheStats {
        let (len, count_limit) = {
            let state = self.inner.state.lock();
            (state.index.len(), state.count_limit)
        };
        self.inner.metrics.snapshot(len, count_limit)
    }

    /// One pass of the recurring trim: count limit first, then age limit.
    fn auto_trim(&self) {
        let (count_limit, age_limit) = {
            let state = self.inner.state.lock();
            (state.count_limit, state.age_limit)
        };
        trace!("auto-trim pass");
        if let Some(limit) = count_limit {
            self.trim_to_count(limit);
        }
        if let Some(age) = age_limit {
            self.trim_to_age(age);
        }
    }

    fn dispose(&self, entries: Vec<Entry<K, V>>, defer: bool) {
        if entries.is_empty() {
            return;
        }
        if defer {
            self.inner.reclaimer.discard(Discard::Batch(entries));
        } else {
            drop(entries);
        }
    }

    fn record(&self, record: impl FnOnce(&MetricsCollector)) {
        if self.inner.track_metrics {
            record(&self.inner.metrics);
        }
    }
}

impl<K, V, C> Clone for PageCache<K, V, C>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<K, V, C> fmt::Debug for PageCache<K, V, C>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PageCache")
            .field("len", &state.index.len())
            .field("count_limit", &state.count_limit)
            .field("age_limit", &state.age_limit)
            .finish()
    }
}

impl<K, V, C> Drop for Inner<K, V, C>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    fn drop(&mut self) {
        self.timer.cancel();
        let state = self.state.get_mut();
        if state.defer_destruction && !state.index.is_empty() {
            let storage = mem::take(&mut state.index);
            self.reclaimer.discard(Discard::Storage(storage));
        }
        debug!("page cache torn down");
    }
}
