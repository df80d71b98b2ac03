//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::client::{BackendFactory, HttpBackendFactory};
use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::models::{supported_languages, TranslationReport};
use crate::core::translator::AsyncTranslator;

/// Application state
pub struct AppState<F = HttpBackendFactory> {
    translator: AsyncTranslator<F>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Serialize)]
struct LanguageInfo {
    code: String,
    name: String,
}

/// Languages list response
#[derive(Serialize)]
struct LanguagesResponse {
    object: String,
    data: Vec<LanguageInfo>,
}

/// Translation request body
#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub unit_size_limit: Option<usize>,
}

impl TranslateRequest {
    fn validate(&self) -> Result<(), TranslationError> {
        if self.unit_size_limit == Some(0) {
            return Err(TranslationError::InvalidRequest {
                message: "unit_size_limit must be greater than 0".to_string(),
            });
        }
        if self.target_lang.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(TranslationError::InvalidRequest {
                message: "target_lang must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Translation response: joined text plus the per-chunk report
#[derive(Serialize)]
pub struct TranslateResponse {
    pub translation: String,
    pub report: TranslationReport,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Supported languages handler
async fn get_languages() -> Json<LanguagesResponse> {
    let data = supported_languages()
        .iter()
        .map(|(code, name)| LanguageInfo {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect();

    Json(LanguagesResponse {
        object: "list".to_string(),
        data,
    })
}

/// Translation handler
async fn translate<F: BackendFactory + 'static>(
    State(state): State<Arc<AppState<F>>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = payload.validate() {
        warn!("Rejected request: {}", e);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: ErrorDetail {
                    message: e.to_string(),
                    code: Some("invalid_request".to_string()),
                },
            }),
        ));
    }

    let mut request = state.translator.request(payload.text);
    if let Some(source_lang) = payload.source_lang {
        request = request.with_source_lang(source_lang);
    }
    if let Some(target_lang) = payload.target_lang {
        request.target_lang = target_lang;
    }
    if let Some(limit) = payload.unit_size_limit {
        request = request.with_unit_size_limit(limit);
    }

    let report = state.translator.translate_request(&request, None, None).await;
    if report.has_failures() {
        warn!(
            "Request finished with {}/{} failed chunk(s)",
            report.failed_count, report.unit_count
        );
    }

    Ok(Json(TranslateResponse {
        translation: report.text.clone(),
        report,
    }))
}

/// Build the router over any backend
pub fn router<F: BackendFactory + 'static>(translator: AsyncTranslator<F>) -> Router {
    let state = Arc::new(AppState { translator });

    Router::new()
        .route("/", get(health_check))
        .route("/v1/languages", get(get_languages))
        .route("/translate", post(translate::<F>))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    let translator = AsyncTranslator::from_config(config)?;
    let app = router(translator);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
