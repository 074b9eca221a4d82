//! Deferred payload destruction.
//!
//! Evicted entries can carry heavyweight payloads whose destructors are too
//! expensive for the access path. The reclaimer ships them to a background
//! task that drops them; ownership transfers into the channel and the caller
//! never waits on the drop.
//!
//! Deferral is a pure optimization: with no active runtime (or when the
//! worker has gone away) destruction happens inline and behavior is
//! unchanged.

use std::hash::Hash;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{trace, warn};

use crate::index::{Entry, OrderedIndex};

/// Work shipped to the background drop task.
#[derive(Debug)]
pub(crate) enum Discard<K, V>
where
    K: Eq + Hash,
{
    /// A batch of evicted entries (one channel hop per trim pass, not per
    /// entry).
    Batch(Vec<Entry<K, V>>),
    /// A whole swapped-out storage, from a bulk clear.
    Storage(OrderedIndex<K, V>),
}

impl<K, V> Discard<K, V>
where
    K: Eq + Hash,
{
    fn entry_count(&self) -> usize {
        match self {
            Self::Batch(entries) => entries.len(),
            Self::Storage(storage) => storage.len(),
        }
    }
}

/// Hand-off point for payloads whose destruction is deferred.
#[derive(Debug)]
pub(crate) struct Reclaimer<K, V>
where
    K: Eq + Hash,
{
    tx: Option<UnboundedSender<Discard<K, V>>>,
}

impl<K, V> Reclaimer<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + 'static,
{
    /// Spawn the background drop task on the current runtime.
    ///
    /// Without an active runtime the reclaimer degrades to inline drops.
    pub(crate) fn new() -> Self {
        match Handle::try_current() {
            Ok(runtime) => {
                let (tx, mut rx) = mpsc::unbounded_channel::<Discard<K, V>>();
                runtime.spawn(async move {
                    while let Some(discard) = rx.recv().await {
                        trace!(entries = discard.entry_count(), "reclaiming evicted payloads");
                        drop(discard);
                    }
                });
                Self { tx: Some(tx) }
            }
            Err(_) => {
                warn!("deferred destruction unavailable: no active tokio runtime");
                Self { tx: None }
            }
        }
    }

    /// Whether a background worker is attached.
    pub(crate) fn is_deferred(&self) -> bool {
        self.tx.is_some()
    }

    /// Ship a discard to the worker, or drop it inline when none exists.
    pub(crate) fn discard(&self, discard: Discard<K, V>) {
        match &self.tx {
            Some(tx) => {
                // Worker gone (runtime shut down): fall back to inline drop.
                if let Err(rejected) = tx.send(discard) {
                    drop(rejected.0);
                }
            }
            None => drop(discard),
        }
    }
}
