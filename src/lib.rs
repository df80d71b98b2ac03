//! Book Translator - long-text translation over a swappable backend
//!
//! Splits arbitrarily large text into sentence-aligned units, translates them
//! one at a time with bounded retry, backoff and pacing, and joins the results
//! into one string. A unit that keeps failing is replaced by an inline
//! failure marker instead of aborting the job.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;
pub mod processors;
pub mod server;
pub mod cli;

// Re-export key types for convenience
pub use crate::core::{
    cancel::CancellationSignal,
    chunker::split_into_units,
    client::{BackendFactory, HttpBackend, HttpBackendFactory, TranslationBackend},
    config::TranslatorConfig,
    errors::{BackendError, TranslationError},
    models::{TranslationReport, TranslationRequest, Unit, UnitOutcome, UnitStatus},
    pacing::ProgressCallback,
    retry::RetryPolicy,
    translator::AsyncTranslator,
};

pub use crate::processors::book::BookProcessor;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
