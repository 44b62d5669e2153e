//! Axum REST API handlers

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
    extract::{multipart::MultipartError, State, Multipart, Query, DefaultBodyLimit, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tower_http::services::ServeDir;
use tracing::{error, warn};

use crate::service::{ConversionError, ConversionService, ImageSettings, ImageUpload};

use super::dto::*;

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<ConversionService>,
    pub start_time: Instant,
}

/// Router options taken from the server config
#[derive(Debug, Clone)]
pub struct RouterOptions<'a> {
    pub static_dir: Option<&'a Path>,
    pub max_upload_bytes: usize,
}

impl Default for RouterOptions<'_> {
    fn default() -> Self {
        Self {
            static_dir: None,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Create the REST API router
pub fn create_rest_router(state: Arc<AppState>, options: RouterOptions<'_>) -> Router {
    let process = Router::new()
        .route("/api/process-image", post(process_image_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_advisor_credentials));

    let router = Router::new()
        .merge(process)
        .route("/api/history", get(history_handler))
        .route("/health", get(health_handler));

    // Single-page form
    let router = match options.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    };

    router
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reject conversion requests up front when no advisory credential is configured
async fn require_advisor_credentials(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.service.advisor_configured() {
        error!("Rejecting {}: advisory API key is not configured", request.uri().path());
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Advisory API key is not configured", "ADVISOR_NOT_CONFIGURED")),
        )
            .into_response();
    }

    next.run(request).await
}

/// Convert an uploaded image
async fn process_image_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ProcessImageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut upload: Option<ImageUpload> = None;
    let mut settings_json: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error_response)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error_response)?;
                upload = Some(ImageUpload {
                    data: data.to_vec(),
                    file_name,
                    content_type,
                });
            }
            "settings" => {
                settings_json = Some(field.text().await.map_err(multipart_error_response)?);
            }
            _ => {}
        }
    }

    let settings = parse_settings(settings_json.as_deref()).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&format!("Invalid settings: {}", e), "INVALID_SETTINGS")),
        )
    })?;

    let outcome = state.service.convert(upload, settings).await.map_err(conversion_error_response)?;

    Ok(Json(outcome.into()))
}

/// Blank or missing settings mean "all defaults"
fn parse_settings(raw: Option<&str>) -> Result<ImageSettings, serde_json::Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(ImageSettings::default()),
        Some(json) => serde_json::from_str(json),
    }
}

/// Keep the status the multipart layer chose (413 for oversized bodies)
fn multipart_error_response(e: MultipartError) -> (StatusCode, Json<ErrorResponse>) {
    warn!("Rejected multipart body: {}", e);
    (e.status(), Json(ErrorResponse::new(&e.body_text(), "MULTIPART_ERROR")))
}

fn conversion_error_response(e: ConversionError) -> (StatusCode, Json<ErrorResponse>) {
    match &e {
        ConversionError::MissingImage => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&e.to_string(), "MISSING_IMAGE")),
        ),
        ConversionError::InvalidSettings(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&e.to_string(), "INVALID_SETTINGS")),
        ),
        ConversionError::Processing(_) => {
            let details = e.details().unwrap_or_default();
            error!("Image processing failed: {}", details);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(&e.to_string(), "PROCESSING_FAILED").with_details(details)),
            )
        }
    }
}

/// Recent conversions. Always 200 so the page never blocks on the store;
/// an unparseable `limit` falls back to the configured default.
async fn history_handler(
    State(state): State<Arc<AppState>>,
    query: Option<Query<HistoryQuery>>,
) -> Json<HistoryResponse> {
    let limit = query.and_then(|Query(q)| q.limit);
    match state.service.history(limit).await {
        Ok(records) => Json(HistoryResponse {
            images: records.into_iter().map(ImageRecordDto::from).collect(),
            error: None,
        }),
        Err(e) => {
            warn!("Failed to load history: {:#}", e);
            Json(HistoryResponse {
                images: Vec::new(),
                error: Some("Failed to load history".to_string()),
            })
        }
    }
}

/// Health check
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        advisor_configured: state.service.advisor_configured(),
        advisor_model: state.service.advisor_name().map(|s| s.to_string()),
        storage: state.service.storage_backend().to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
