//! Custom error types for translation operations

use thiserror::Error;

/// Failure of a single backend call.
///
/// This is the only error the retry loop consumes. Timeouts, throttling,
/// authentication and server-side failures all collapse into it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    /// Human-readable description, embedded verbatim in failure markers
    pub message: String,
}

impl BackendError {
    /// Create a backend error from any displayable message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Backend answered with a non-success HTTP status
    pub fn status(status: u16, body: &str) -> Self {
        let body = body.trim();
        if body.is_empty() {
            Self::new(format!("backend returned HTTP {}", status))
        } else {
            Self::new(format!("backend returned HTTP {}: {}", status, body))
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(format!("request timed out: {}", err))
        } else {
            Self::new(err.to_string())
        }
    }
}

/// Errors raised by the surfaces around the pipeline (config, files, server)
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Request rejected before any backend call
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        path: String,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Layered config loading error
    #[error("Config source error: {0}")]
    ConfigSourceError(#[from] config::ConfigError),
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display_is_message() {
        let err = BackendError::new("connection reset");
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_backend_error_status() {
        assert_eq!(
            BackendError::status(429, "").to_string(),
            "backend returned HTTP 429"
        );
        assert_eq!(
            BackendError::status(503, " busy \n").to_string(),
            "backend returned HTTP 503: busy"
        );
    }

    #[test]
    fn test_surface_errors_convert_with_question_mark() {
        fn read(path: &str) -> Result<serde_json::Value> {
            let raw = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        assert!(matches!(
            read("/definitely/not/here.json"),
            Err(TranslationError::IoError(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let err = read(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_config_error_display() {
        let err = TranslationError::ConfigError {
            message: "unit_size_limit must be greater than 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Configuration error: unit_size_limit must be greater than 0"
        );
    }
}
