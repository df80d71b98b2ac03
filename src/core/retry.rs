//! Bounded retry with linear backoff around a single unit

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::cancel::StopCondition;
use crate::core::client::{BackendFactory, TranslationBackend};
use crate::core::errors::BackendError;
use crate::core::models::{TranslationRequest, Unit, UnitOutcome};

/// How many times to try a unit and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn from_request(request: &TranslationRequest) -> Self {
        Self::new(request.max_retries, request.backoff_base())
    }

    /// Wait before `attempt` (1-based). Attempt 2 waits 2x base, attempt 3 waits 3x.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.backoff_base * attempt
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs one unit through fresh backend handles until it succeeds or the
/// attempt budget runs out. Never returns an error: exhaustion produces a
/// failed outcome carrying the last backend error.
#[derive(Debug)]
pub struct RetryExecutor<'a, F> {
    factory: &'a F,
    policy: RetryPolicy,
}

impl<'a, F: BackendFactory> RetryExecutor<'a, F> {
    pub fn new(factory: &'a F, policy: RetryPolicy) -> Self {
        Self { factory, policy }
    }

    async fn attempt(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, BackendError> {
        let backend = self.factory.create()?;
        backend.translate_unit(text, source_lang, target_lang).await
    }

    /// Translate `unit`, retrying on [`BackendError`].
    ///
    /// `stop` is checked before each retry and interrupts the backoff sleep;
    /// the first attempt always runs.
    pub async fn execute(
        &self,
        unit: &Unit,
        source_lang: &str,
        target_lang: &str,
        stop: &StopCondition,
    ) -> UnitOutcome {
        let mut last_error = BackendError::new("no attempt made");
        let mut attempts = 0;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                let delay = self.policy.delay_before(attempt);
                debug!(
                    "Chunk {}: waiting {:?} before attempt {}/{}",
                    unit.index + 1,
                    delay,
                    attempt,
                    self.policy.max_attempts
                );
                if stop.should_stop() || !stop.sleep(delay).await {
                    warn!("Chunk {}: retries stopped by cancellation", unit.index + 1);
                    break;
                }
            }

            attempts = attempt;
            match self.attempt(&unit.text, source_lang, target_lang).await {
                Ok(translation) => {
                    if attempt > 1 {
                        info!("Chunk {} translated after {} attempts", unit.index + 1, attempt);
                    }
                    return UnitOutcome::succeeded(unit.index, translation, attempt);
                }
                Err(e) => {
                    warn!(
                        "Chunk {} attempt {}/{} failed: {}",
                        unit.index + 1,
                        attempt,
                        self.policy.max_attempts,
                        e
                    );
                    last_error = e;
                }
            }
        }

        warn!(
            "Chunk {} failed permanently after {} attempts: {}",
            unit.index + 1,
            attempts,
            last_error
        );
        UnitOutcome::failed(unit.index, &last_error.message, attempts)
    }
}
