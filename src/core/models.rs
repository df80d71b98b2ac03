//! Core data models for translation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::core::config::TranslatorConfig;

/// Sentinel source language asking the backend to detect it
pub const AUTO_DETECT: &str = "auto";

/// Returned by language detection when the backend cannot tell
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Returned for blank input; no backend call is made
pub const EMPTY_INPUT_MESSAGE: &str = "No text to translate";

/// Prefix shared by every failure marker, usable for substring detection
pub const FAILURE_MARKER_PREFIX: &str = "Translation failed for chunk";

/// Languages known to work with the default backend: (code, English name)
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh-cn", "Chinese (Simplified)"),
    ("hi", "Hindi"),
    ("kn", "Kannada"),
    ("ar", "Arabic"),
];

/// All supported languages as (code, English name) pairs
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    SUPPORTED_LANGUAGES
}

/// Look up the English name of a supported language code (case-insensitive)
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Format the inline marker for a unit that exhausted its retries.
///
/// `index` is the 0-based unit index; the marker names the 1-based ordinal.
pub fn failure_marker(index: usize, message: &str) -> String {
    format!("[{} {}: {}]", FAILURE_MARKER_PREFIX, index + 1, message)
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    /// Maximum unit length in characters
    pub unit_size_limit: usize,
    /// Attempts per unit, including the first
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub inter_unit_delay_ms: u64,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        let defaults = TranslatorConfig::default();
        Self {
            text: text.into(),
            source_lang: AUTO_DETECT.to_string(),
            target_lang: target_lang.into(),
            unit_size_limit: defaults.unit_size_limit,
            max_retries: defaults.max_retries,
            backoff_base_ms: defaults.backoff_base_ms,
            inter_unit_delay_ms: defaults.inter_unit_delay_ms,
        }
    }

    /// Build a request carrying the pipeline settings of `config`
    pub fn from_config(text: impl Into<String>, config: &TranslatorConfig) -> Self {
        Self {
            text: text.into(),
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            unit_size_limit: config.unit_size_limit,
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
            inter_unit_delay_ms: config.inter_unit_delay_ms,
        }
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }

    pub fn with_unit_size_limit(mut self, limit: usize) -> Self {
        self.unit_size_limit = limit;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base_ms = base.as_millis() as u64;
        self
    }

    pub fn with_inter_unit_delay(mut self, delay: Duration) -> Self {
        self.inter_unit_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn inter_unit_delay(&self) -> Duration {
        Duration::from_millis(self.inter_unit_delay_ms)
    }
}

/// A sentence-aligned slice of the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    /// 0-based position in the source
    pub index: usize,
    pub text: String,
    /// Length in characters, not bytes
    pub char_len: usize,
}

impl Unit {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            index,
            text,
            char_len,
        }
    }
}

/// Terminal state of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Succeeded,
    Failed,
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Succeeded => write!(f, "succeeded"),
            UnitStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Result of processing one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOutcome {
    pub index: usize,
    pub status: UnitStatus,
    /// Translated text, or the failure marker
    pub payload: String,
    /// Backend attempts actually made (0 when cancelled before starting)
    pub attempts: u32,
}

impl UnitOutcome {
    pub fn succeeded(index: usize, translation: String, attempts: u32) -> Self {
        Self {
            index,
            status: UnitStatus::Succeeded,
            payload: translation,
            attempts,
        }
    }

    pub fn failed(index: usize, message: &str, attempts: u32) -> Self {
        Self {
            index,
            status: UnitStatus::Failed,
            payload: failure_marker(index, message),
            attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UnitStatus::Succeeded
    }
}

/// Structured result of one top-level translation call
#[derive(Debug, Clone, Serialize)]
pub struct TranslationReport {
    /// Joined output, identical to what the string API returns
    pub text: String,
    pub outcomes: Vec<UnitOutcome>,
    pub unit_count: usize,
    pub failed_count: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TranslationReport {
    /// Report for blank input: sentinel text, no units
    pub fn empty(started_at: DateTime<Utc>) -> Self {
        Self {
            text: EMPTY_INPUT_MESSAGE.to_string(),
            outcomes: Vec::new(),
            unit_count: 0,
            failed_count: 0,
            cancelled: false,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Join outcome payloads with a single space
    pub fn from_outcomes(
        outcomes: Vec<UnitOutcome>,
        cancelled: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        let text = outcomes
            .iter()
            .map(|o| o.payload.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let failed_count = outcomes.iter().filter(|o| !o.is_success()).count();

        Self {
            text,
            unit_count: outcomes.len(),
            failed_count,
            outcomes,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }

    /// 0-based indices of failed units
    pub fn failed_units(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    #[test]
    fn test_failure_marker_uses_ordinal() {
        assert_eq!(
            failure_marker(1, "HTTP 500"),
            "[Translation failed for chunk 2: HTTP 500]"
        );
        assert!(failure_marker(0, "x").contains(FAILURE_MARKER_PREFIX));
    }

    #[test]
    fn test_language_lookup() {
        assert_eq!(language_name("zh-CN"), Some("Chinese (Simplified)"));
        assert_eq!(language_name("kn"), Some("Kannada"));
        assert_eq!(language_name("xx"), None);

        let codes: Vec<&str> = supported_languages().iter().map(|(c, _)| *c).collect();
        assert_eq!(codes.len(), 13);
        assert!(codes.contains(&"zh-cn"));
        assert!(codes.iter().all(|c| language_name(c).is_some()));
    }

    #[test]
    fn test_unit_counts_chars() {
        let unit = Unit::new(0, "héllo");
        assert_eq!(unit.char_len, 5);
    }

    #[test]
    fn test_request_builder() {
        let request = TranslationRequest::new("Hola.", "en")
            .with_source_lang("es")
            .with_unit_size_limit(100)
            .with_backoff_base(Duration::from_millis(250));

        assert_eq!(request.source_lang, "es");
        assert_eq!(request.unit_size_limit, 100);
        assert_eq!(request.backoff_base(), Duration::from_millis(250));
        assert_eq!(request.max_retries, 3);
    }

    #[test]
    fn test_report_joins_and_counts() {
        let outcomes = vec![
            UnitOutcome::succeeded(0, "A".to_string(), 1),
            UnitOutcome::failed(1, "boom", 3),
            UnitOutcome::succeeded(2, "C".to_string(), 2),
        ];
        let report = TranslationReport::from_outcomes(outcomes, false, Utc::now());

        assert_eq!(report.text, "A [Translation failed for chunk 2: boom] C");
        assert_eq!(report.failed_units(), vec![1]);
        assert!(report.has_failures());

        assert_json_include!(
            actual: serde_json::to_value(&report).unwrap(),
            expected: json!({
                "unit_count": 3,
                "failed_count": 1,
                "cancelled": false,
                "outcomes": [
                    { "index": 0, "status": "succeeded", "payload": "A", "attempts": 1 },
                    { "index": 1, "status": "failed" },
                    { "index": 2, "status": "succeeded", "attempts": 2 }
                ]
            })
        );
    }

    #[test]
    fn test_empty_report() {
        let report = TranslationReport::empty(Utc::now());
        assert_eq!(report.text, EMPTY_INPUT_MESSAGE);
        assert_eq!(report.unit_count, 0);
        assert!(!report.has_failures());
    }
}
