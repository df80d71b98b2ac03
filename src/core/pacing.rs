//! Inter-unit pacing and ordered progress notification

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::cancel::StopCondition;

/// Fixed wait between units to stay under backend rate limits
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Wait before the next unit. Returns `false` if interrupted by `stop`.
    pub async fn pause(&self, stop: &StopCondition) -> bool {
        if !self.delay.is_zero() {
            debug!("Pacing for {:?}", self.delay);
        }
        stop.sleep(self.delay).await
    }
}

/// Caller hook receiving `(completed, total)`, both 1-based
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Invokes an optional [`ProgressCallback`], isolating the pipeline from panics in it
#[derive(Clone, Default)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback }
    }

    pub fn report(&self, completed: usize, total: usize) {
        let Some(callback) = &self.callback else {
            return;
        };

        if catch_unwind(AssertUnwindSafe(|| callback(completed, total))).is_err() {
            warn!("Progress callback panicked at {}/{}; continuing", completed, total);
        }
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
