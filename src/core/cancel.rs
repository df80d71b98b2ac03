//! Cooperative cancellation for long translation jobs
//!
//! A [`CancellationSignal`] is cloned into whoever may need to stop a job
//! (Ctrl+C handler, HTTP handler, test). The pipeline checks it between units
//! and between retry attempts, and wakes early from backoff or pacing sleeps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Wakes all current waiters once.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is requested. Returns immediately if already set.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel() is not missed.
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Per-job stop condition: external signal plus optional deadline
#[derive(Debug, Clone)]
pub struct StopCondition {
    signal: CancellationSignal,
    deadline: Option<Instant>,
}

impl StopCondition {
    pub fn new(signal: CancellationSignal, timeout: Option<Duration>) -> Self {
        Self {
            signal,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    pub fn should_stop(&self) -> bool {
        self.signal.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Sleep for `duration`, waking early on cancellation or deadline.
    ///
    /// Returns `true` if the full duration elapsed.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.should_stop();
        }

        let wake_at = Instant::now() + duration;
        let cutoff = match self.deadline {
            Some(deadline) if deadline < wake_at => deadline,
            _ => wake_at,
        };

        tokio::select! {
            _ = tokio::time::sleep_until(cutoff) => cutoff == wake_at && !self.signal.is_cancelled(),
            _ = self.signal.cancelled() => false,
        }
    }
}
