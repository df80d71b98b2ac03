//! Backend adapter: one opaque text-in/text-out call per unit

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::BackendError;
use crate::core::models::AUTO_DETECT;

/// An external translation service
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate one unit of text
    async fn translate_unit(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, BackendError>;

    /// Detect the language of `text`, returning its code
    async fn detect_language(&self, _text: &str) -> Result<String, BackendError> {
        Err(BackendError::new("language detection not supported"))
    }
}

/// Builds a fresh backend handle for every attempt.
///
/// Handles are never reused across attempts, so a broken connection cannot
/// leak into a retry. Failing to build a handle counts as a failed attempt.
pub trait BackendFactory: Send + Sync {
    type Backend: TranslationBackend;

    fn create(&self) -> Result<Self::Backend, BackendError>;
}

impl<F, B> BackendFactory for F
where
    F: Fn() -> Result<B, BackendError> + Send + Sync,
    B: TranslationBackend,
{
    type Backend = B;

    fn create(&self) -> Result<B, BackendError> {
        self()
    }
}

/// Client for a Google-Translate-compatible `translate_a/single` endpoint
#[derive(Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    /// Create a backend with its own connection pool
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

/// Map our language codes to what the endpoint expects
fn backend_lang_code(code: &str) -> String {
    match code.to_ascii_lowercase().as_str() {
        "zh-cn" | "zh" => "zh-CN".to_string(),
        "zh-tw" => "zh-TW".to_string(),
        other => other.to_string(),
    }
}

/// Concatenate translated segments from `[[["seg", "orig", ...], ...], ...]`
fn parse_translation(json: &serde_json::Value) -> Result<String, BackendError> {
    let segments = json
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| BackendError::new("no translation in response"))?;

    let translation: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|t| t.as_str()))
        .collect();

    if translation.is_empty() {
        return Err(BackendError::new("empty translation in response"));
    }

    Ok(translation)
}

/// Source language the endpoint detected, element `[2]` of the response
fn parse_detected_language(json: &serde_json::Value) -> Result<String, BackendError> {
    json.get(2)
        .and_then(|l| l.as_str())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_ascii_lowercase())
        .ok_or_else(|| BackendError::new("no detected language in response"))
}

impl HttpBackend {
    async fn send(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<serde_json::Value, BackendError> {
        let source = backend_lang_code(source_lang);
        let target = backend_lang_code(target_lang);

        debug!("POST {} ({} -> {}, {} chars)", self.endpoint, source, target, text.chars().count());

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("client", "gtx"), ("sl", source.as_str()), ("tl", target.as_str()), ("dt", "t")])
            .form(&[("q", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::status(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::new(format!("invalid response: {}", e)))
    }
}

#[async_trait]
impl TranslationBackend for HttpBackend {
    async fn translate_unit(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, BackendError> {
        let json = self.send(text, source_lang, target_lang).await?;
        parse_translation(&json)
    }

    async fn detect_language(&self, text: &str) -> Result<String, BackendError> {
        let json = self.send(text, AUTO_DETECT, "en").await?;
        parse_detected_language(&json)
    }
}

/// Builds one [`HttpBackend`] per attempt
#[derive(Debug, Clone)]
pub struct HttpBackendFactory {
    endpoint: String,
    timeout: Duration,
}

impl HttpBackendFactory {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.endpoint.clone(), config.timeout())
    }
}

impl BackendFactory for HttpBackendFactory {
    type Backend = HttpBackend;

    fn create(&self) -> Result<HttpBackend, BackendError> {
        HttpBackend::new(self.endpoint.clone(), self.timeout)
    }
}
