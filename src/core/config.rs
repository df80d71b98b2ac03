//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{language_name, AUTO_DETECT};

/// Default Google-Translate-compatible endpoint
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Prefix for environment overrides layered over a config file
const ENV_PREFIX: &str = "BOOK_TRANSLATOR";

/// Configuration for translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Maximum unit length in characters (not bytes or tokens)
    pub unit_size_limit: usize,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub inter_unit_delay_ms: u64,
    pub source_lang: String,
    pub target_lang: String,
    /// Whole-job deadline; checked between units and retries
    pub job_timeout_ms: Option<u64>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 30000,
            unit_size_limit: 4500,
            max_retries: 3,
            backoff_base_ms: 1000,
            inter_unit_delay_ms: 1000,
            source_lang: AUTO_DETECT.to_string(),
            target_lang: "en".to_string(),
            job_timeout_ms: None,
        }
    }
}

/// Read and parse an environment variable, falling back to `default` when unset
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| TranslationError::ConfigError {
            message: format!("{} has invalid value '{}': {}", key, raw, e),
        }),
        Err(_) => Ok(default),
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let endpoint = std::env::var("TRANSLATE_ENDPOINT").unwrap_or(defaults.endpoint);
        let source_lang = std::env::var("SOURCE_LANG").unwrap_or(defaults.source_lang);
        let target_lang = std::env::var("TARGET_LANG").unwrap_or(defaults.target_lang);

        let job_timeout_ms = match std::env::var("JOB_TIMEOUT_MS") {
            Ok(_) => Some(env_or("JOB_TIMEOUT_MS", 0u64)?),
            Err(_) => None,
        };

        Ok(Self {
            endpoint,
            timeout_ms: env_or("REQUEST_TIMEOUT_MS", defaults.timeout_ms)?,
            unit_size_limit: env_or("UNIT_SIZE_LIMIT", defaults.unit_size_limit)?,
            max_retries: env_or("MAX_RETRIES", defaults.max_retries)?,
            backoff_base_ms: env_or("BACKOFF_BASE_MS", defaults.backoff_base_ms)?,
            inter_unit_delay_ms: env_or("INTER_UNIT_DELAY_MS", defaults.inter_unit_delay_ms)?,
            source_lang,
            target_lang,
            job_timeout_ms,
        })
    }

    /// Load from a JSON, YAML or TOML file, with `BOOK_TRANSLATOR_*` overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TranslationError::FileError {
                path: path.display().to_string(),
                message: "config file not found".to_string(),
            });
        }

        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| {
            Err(TranslationError::ConfigError {
                message: message.to_string(),
            })
        };

        if self.endpoint.trim().is_empty() {
            return fail("endpoint is required");
        }

        if self.target_lang.trim().is_empty() {
            return fail("target_lang is required");
        }

        if self.unit_size_limit == 0 {
            return fail("unit_size_limit must be greater than 0");
        }

        if self.max_retries == 0 {
            return fail("max_retries must be at least 1");
        }

        if self.timeout_ms == 0 {
            return fail("timeout_ms must be greater than 0");
        }

        if language_name(&self.target_lang).is_none() {
            warn!("Target language '{}' is not in the supported list", self.target_lang);
        }

        if self.source_lang != AUTO_DETECT && language_name(&self.source_lang).is_none() {
            warn!("Source language '{}' is not in the supported list", self.source_lang);
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_validation() {
        let config = TranslatorConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_limit() {
        let config = TranslatorConfig {
            unit_size_limit: 0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_retries() {
        let config = TranslatorConfig {
            max_retries: 0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_language_only_warns() {
        let config = TranslatorConfig {
            target_lang: "tlh".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial_json_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"unit_size_limit": 2000, "target_lang": "fr"}}"#).unwrap();

        let config = TranslatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.unit_size_limit, 2000);
        assert_eq!(config.target_lang, "fr");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translator.json");
        let config = TranslatorConfig {
            job_timeout_ms: Some(60000),
            ..Default::default()
        };

        config.to_file(&path).unwrap();
        assert_eq!(TranslatorConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = TranslatorConfig::from_file("/nonexistent/translator.json").unwrap_err();
        assert!(matches!(err, TranslationError::FileError { .. }));
    }
}
