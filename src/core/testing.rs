//! Stub backends shared by unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::client::{BackendFactory, TranslationBackend};
use crate::core::errors::BackendError;

type Responder = dyn Fn(&str, usize) -> Result<String, BackendError> + Send + Sync;

/// Backend whose answer is computed from the text and the global call number
pub(crate) struct StubBackend {
    calls: Arc<AtomicUsize>,
    respond: Arc<Responder>,
    detected: Option<&'static str>,
}

#[async_trait]
impl TranslationBackend for StubBackend {
    async fn translate_unit(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, BackendError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (self.respond)(text, call)
    }

    async fn detect_language(&self, text: &str) -> Result<String, BackendError> {
        match self.detected {
            Some(code) => Ok(code.to_string()),
            None => Err(BackendError::new(format!("cannot detect {:?}", text))),
        }
    }
}

/// Factory that counts handles created and calls made across all of them
#[derive(Clone)]
pub(crate) struct StubFactory {
    calls: Arc<AtomicUsize>,
    handles: Arc<AtomicUsize>,
    respond: Arc<Responder>,
    detected: Option<&'static str>,
}

impl StubFactory {
    /// `respond(text, call)` where `call` is 1-based across the whole factory
    pub(crate) fn new<R>(respond: R) -> Self
    where
        R: Fn(&str, usize) -> Result<String, BackendError> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            handles: Arc::new(AtomicUsize::new(0)),
            respond: Arc::new(respond),
            detected: None,
        }
    }

    /// Make language detection succeed with `code`
    pub(crate) fn with_detected(mut self, code: &'static str) -> Self {
        self.detected = Some(code);
        self
    }

    pub(crate) fn uppercase() -> Self {
        Self::new(|text, _| Ok(text.to_uppercase()))
    }

    pub(crate) fn failing(message: &'static str) -> Self {
        Self::new(move |_, _| Err(BackendError::new(message)))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn handles_created(&self) -> usize {
        self.handles.load(Ordering::SeqCst)
    }
}

impl BackendFactory for StubFactory {
    type Backend = StubBackend;

    fn create(&self) -> Result<StubBackend, BackendError> {
        self.handles.fetch_add(1, Ordering::SeqCst);
        Ok(StubBackend {
            calls: Arc::clone(&self.calls),
            respond: Arc::clone(&self.respond),
            detected: self.detected,
        })
    }
}
