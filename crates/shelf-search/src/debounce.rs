//! Debounce primitive
//!
//! Holds back a rapidly changing value until it has been stable for a quiet
//! period. At most one timer is armed at any moment: every [`Debouncer::set`]
//! aborts the previous timer before arming a new one, and dropping the
//! debouncer aborts whatever is still pending.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Debounced value
///
/// The output is published on a [`watch`] channel. Must be used from within
/// a Tokio runtime, since timers are spawned tasks.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    output: Arc<watch::Sender<T>>,
    /// The single armed timer, if any
    pending: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create debouncer whose output starts at `initial`
    #[must_use]
    pub fn new(initial: T, quiet: Duration) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            quiet,
            output: Arc::new(tx),
            pending: None,
        }
    }

    /// Feed a new input value
    ///
    /// Re-arms the timer. The output only changes once the timer fires,
    /// never synchronously, even with a zero quiet period.
    pub fn set(&mut self, value: T) {
        self.cancel();

        let output = Arc::clone(&self.output);
        let quiet = self.quiet;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let changed = output.send_if_modified(|current| {
                if *current == value {
                    false
                } else {
                    *current = value;
                    true
                }
            });
            if changed {
                tracing::trace!(quiet_ms = quiet.as_millis(), "debounced value settled");
            }
        }));
    }

    /// Cancel any pending timer and set the output immediately
    ///
    /// For explicit actions (clearing, picking a suggestion) that should not
    /// wait out the quiet period.
    pub fn reset(&mut self, value: T) {
        self.cancel();
        self.output.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Abort the pending timer without emitting
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Check if a timer is armed and has not fired yet
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Current output value
    #[must_use]
    pub fn current(&self) -> T {
        self.output.borrow().clone()
    }

    /// Subscribe to output changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.output.subscribe()
    }

    /// Configured quiet period
    #[inline]
    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
