//! Long-text translation orchestrator
//!
//! Drives chunking, per-unit retry, pacing and progress reporting, strictly
//! one unit at a time in source order, and joins the outcomes into a single
//! string. Backend failures degrade the affected unit to an inline failure
//! marker; they never abort the job or surface as an error.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::cancel::{CancellationSignal, StopCondition};
use crate::core::chunker::split_into_units;
use crate::core::client::{BackendFactory, HttpBackendFactory, TranslationBackend};
use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;
use crate::core::models::{
    TranslationReport, TranslationRequest, Unit, UnitOutcome, AUTO_DETECT, UNKNOWN_LANGUAGE,
};
use crate::core::pacing::{Pacer, ProgressCallback, ProgressReporter};
use crate::core::retry::{RetryExecutor, RetryPolicy};

/// Failure message for units skipped because the job was stopped
pub const CANCELLED_MESSAGE: &str = "translation cancelled";

/// Units and outcomes of one top-level call. Lives only for that call.
struct TranslationSession {
    units: Vec<Unit>,
    outcomes: Vec<UnitOutcome>,
    cancelled: bool,
}

impl TranslationSession {
    fn new(units: Vec<Unit>) -> Self {
        let outcomes = Vec::with_capacity(units.len());
        Self {
            units,
            outcomes,
            cancelled: false,
        }
    }

    fn total(&self) -> usize {
        self.units.len()
    }

    fn record(&mut self, outcome: UnitOutcome) -> usize {
        debug_assert_eq!(outcome.index, self.outcomes.len());
        self.outcomes.push(outcome);
        self.outcomes.len()
    }

    fn finish(self, started_at: chrono::DateTime<Utc>) -> TranslationReport {
        debug_assert_eq!(self.outcomes.len(), self.units.len());
        TranslationReport::from_outcomes(self.outcomes, self.cancelled, started_at)
    }
}

/// Sequential long-text translator over a swappable backend.
///
/// Holds only immutable configuration and the backend factory; every call
/// gets its own session and stop condition, so clones can run concurrently.
pub struct AsyncTranslator<F = HttpBackendFactory> {
    factory: Arc<F>,
    config: Arc<TranslatorConfig>,
}

impl<F> Clone for AsyncTranslator<F> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            config: Arc::clone(&self.config),
        }
    }
}

impl<F> std::fmt::Debug for AsyncTranslator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncTranslator")
            .field("config", &self.config)
            .finish()
    }
}

impl AsyncTranslator<HttpBackendFactory> {
    /// Create a translator talking to the configured HTTP endpoint
    pub fn from_config(config: TranslatorConfig) -> Result<Self> {
        let factory = HttpBackendFactory::from_config(&config);
        Self::new(factory, config)
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::from_config(TranslatorConfig::from_env()?)
    }
}

impl<F: BackendFactory> AsyncTranslator<F> {
    /// Create a new translator; fails only on invalid configuration
    pub fn new(factory: F, config: TranslatorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            factory: Arc::new(factory),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Request for `text` with this translator's configured settings
    pub fn request(&self, text: impl Into<String>) -> TranslationRequest {
        TranslationRequest::from_config(text, &self.config)
    }

    fn request_for(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationRequest {
        TranslationRequest {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            ..self.request(text)
        }
    }

    /// Translate `text`, returning the joined output with inline failure markers
    pub async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> String {
        self.translate_with_limit(text, source_lang, target_lang, self.config.unit_size_limit)
            .await
    }

    /// Same as [`translate`](Self::translate) with an explicit unit size limit
    pub async fn translate_with_limit(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        unit_limit: usize,
    ) -> String {
        let request = self
            .request_for(text, source_lang, target_lang)
            .with_unit_size_limit(unit_limit);
        self.translate_request(&request, None, None).await.text
    }

    /// Translate with a progress hook called once per unit, in order
    pub async fn translate_with_progress(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        progress: ProgressCallback,
    ) -> String {
        let request = self.request_for(text, source_lang, target_lang);
        self.translate_request(&request, Some(progress), None).await.text
    }

    /// Translate a book excerpt, letting the backend detect the source language
    pub async fn translate_excerpt(&self, excerpt: &str, target_lang: &str) -> String {
        self.translate(excerpt, AUTO_DETECT, target_lang).await
    }

    /// Detect the language of `text`, or [`UNKNOWN_LANGUAGE`] on any failure
    pub async fn detect_language(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return UNKNOWN_LANGUAGE.to_string();
        }

        let detected = match self.factory.create() {
            Ok(backend) => backend.detect_language(text).await,
            Err(e) => Err(e),
        };

        match detected {
            Ok(code) => {
                debug!("Detected language: {}", code);
                code
            }
            Err(e) => {
                warn!("Language detection failed: {}", e);
                UNKNOWN_LANGUAGE.to_string()
            }
        }
    }

    /// Translate and return per-unit outcomes alongside the joined text.
    ///
    /// `cancel` stops this call only; without one the job runs to completion
    /// or until the configured job timeout.
    pub async fn translate_request(
        &self,
        request: &TranslationRequest,
        progress: Option<ProgressCallback>,
        cancel: Option<&CancellationSignal>,
    ) -> TranslationReport {
        let started_at = Utc::now();

        if request.text.trim().is_empty() {
            debug!("Empty input, nothing to translate");
            return TranslationReport::empty(started_at);
        }

        let limit = request.unit_size_limit.max(1);
        let char_len = request.text.chars().count();
        let units = if char_len <= limit {
            vec![Unit::new(0, request.text.as_str())]
        } else {
            split_into_units(&request.text, limit)
        };

        info!(
            "Translating {} chars ({} -> {}) in {} chunk(s)",
            char_len,
            request.source_lang,
            request.target_lang,
            units.len()
        );

        let signal = cancel.cloned().unwrap_or_default();
        let stop = StopCondition::new(signal, self.config.job_timeout());
        let progress = ProgressReporter::new(progress);
        let executor = RetryExecutor::new(self.factory.as_ref(), RetryPolicy::from_request(request));
        let pacer = Pacer::new(request.inter_unit_delay());

        let mut session = TranslationSession::new(units);
        let total = session.total();

        for position in 0..total {
            if position > 0 && !session.cancelled && !pacer.pause(&stop).await {
                session.cancelled = true;
            }
            if stop.should_stop() {
                session.cancelled = true;
            }

            let unit = &session.units[position];
            let outcome = if session.cancelled {
                UnitOutcome::failed(unit.index, CANCELLED_MESSAGE, 0)
            } else {
                let outcome = executor
                    .execute(unit, &request.source_lang, &request.target_lang, &stop)
                    .await;
                if !outcome.is_success() && stop.should_stop() {
                    session.cancelled = true;
                }
                outcome
            };

            debug!("Chunk {}/{}: {}", position + 1, total, outcome.status);
            let completed = session.record(outcome);
            progress.report(completed, total);
        }

        let report = session.finish(started_at);
        if report.cancelled {
            warn!(
                "Translation stopped early: {}/{} chunk(s) failed or skipped",
                report.failed_count, report.unit_count
            );
        } else if report.has_failures() {
            warn!(
                "Translation finished with {}/{} failed chunk(s)",
                report.failed_count, report.unit_count
            );
        } else {
            info!("Translation finished: {} chunk(s)", report.unit_count);
        }

        report
    }
}
