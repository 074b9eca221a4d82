//! Cancellable recurring timer.
//!
//! Drives the cache's periodic trim pass. The spawned task is an unbounded,
//! self-perpetuating loop; the handle's cancel flag is the only way to stop
//! it, so owners must cancel on teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::warn;

/// Handle used to cancel a recurring timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub(crate) fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// Cancel the timer. The task exits at its next tick.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether the timer has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Spawn a recurring timer on the current tokio runtime.
///
/// The first tick fires one full `interval` after the call, not immediately.
/// When no runtime is active the timer is returned already cancelled and
/// never fires.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use pagecache::time::recurring;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = recurring(Duration::from_secs(1), || {
///         println!("tick");
///     });
///
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     handle.cancel();
/// }
/// ```
pub fn recurring<F>(interval: Duration, mut callback: F) -> TimerHandle
where
    F: FnMut() + Send + 'static,
{
    let handle = TimerHandle::new();
    let flag = handle.clone();

    match Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await; // Skip first immediate tick

                while !flag.is_cancelled() {
                    ticker.tick().await;
                    if !flag.is_cancelled() {
                        callback();
                    }
                }
            });
        }
        Err(_) => {
            warn!("recurring timer not started: no active tokio runtime");
            handle.cancel();
        }
    }

    handle
}
