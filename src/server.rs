//! HTTP surface for the generator.
//!
//! Endpoints:
//! - `GET /` service info and whether a logo is loaded
//! - `GET /health` liveness
//! - `POST /upload-logo` multipart `file` (PNG/JPEG), replaces the current logo
//! - `POST /generate-docx` JSON [`LabRecord`], returns the `.docx` as an attachment

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    assets::logo::{CANONICAL_LOGO_NAME, InstitutionLogo, LogoStore},
    foundation::error::LabrecError,
    pipeline::{AssembleOptions, assemble_validated},
    record::model::LabRecord,
    render::docx::DOCX_MEDIA_TYPE,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub assemble: AssembleOptions,
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub logo: LogoStore,
    pub assemble: Arc<AssembleOptions>,
}

impl AppState {
    pub fn new(logo: LogoStore, assemble: AssembleOptions) -> Self {
        Self {
            logo,
            assemble: Arc::new(assemble),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub logo_uploaded: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub filename: &'static str,
}

/// Error body in the `{"detail": ...}` shape clients of the service expect.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
    /// Failing [`LabrecError::stage`], or `"request"` for transport-level rejections.
    pub stage: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            stage: "request",
        }
    }
}

impl From<LabrecError> for ApiError {
    fn from(err: LabrecError) -> Self {
        let status = match &err {
            LabrecError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LabrecError::Asset(_) => StatusCode::BAD_REQUEST,
            LabrecError::Assembly(_) | LabrecError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            stage: err.stage(),
            ..Self::new(status, err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                stage = self.stage,
                detail = %self.detail,
                "request failed"
            );
        } else {
            tracing::warn!(
                status = %self.status,
                stage = self.stage,
                detail = %self.detail,
                "request rejected"
            );
        }
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/upload-logo", post(upload_logo))
        .route("/generate-docx", post(generate_docx))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: ServerConfig, logo: LogoStore) -> anyhow::Result<()> {
    let app = router(AppState::new(logo, config.assemble));

    tracing::info!(bind = %config.bind, "starting lab record service");
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve http")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Lab Record Generator API",
        status: "running",
        version: "1.0",
        logo_uploaded: state.logo.is_present(),
    })
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn upload_logo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            ApiError::new(StatusCode::BAD_REQUEST, format!("invalid multipart body: {e}"))
        })?;
        let Some(field) = field else {
            break;
        };
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("read upload: {e}")))?;

        // Upload checks answer 400 rather than the 422 used for record validation.
        let logo =
            InstitutionLogo::from_upload(file_name.as_deref(), content_type.as_deref(), &bytes)
                .map_err(|e| match e {
                    LabrecError::Validation(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
                    other => ApiError::from(other),
                })?;

        tracing::info!(width = logo.width, height = logo.height, "logo uploaded");
        state.logo.set(logo);
        return Ok(Json(UploadResponse {
            message: "Logo uploaded successfully",
            filename: CANONICAL_LOGO_NAME,
        }));
    }

    Err(ApiError::new(
        StatusCode::BAD_REQUEST,
        "missing multipart field 'file'",
    ))
}

async fn generate_docx(
    State(state): State<AppState>,
    payload: Result<Json<LabRecord>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(record) = payload?;
    record.validate()?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(DOCX_MEDIA_TYPE));
    let disposition = format!("attachment; filename=\"{}\"", record.output_file_name());
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).map_err(|_| {
            ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "register_number cannot be used in a file name header",
            )
        })?,
    );

    let logo = state.logo.get();
    let opts = state.assemble.clone();
    let artifact = tokio::task::spawn_blocking(move || {
        assemble_validated(&record, logo.as_deref(), &opts)
    })
    .await
    .map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("assembly task failed: {e}"),
        )
    })??;

    if let Ok(id) = HeaderValue::from_str(&artifact.build_id.to_string()) {
        headers.insert("x-build-id", id);
    }

    Ok((StatusCode::OK, headers, artifact.bytes).into_response())
}

#[cfg(test)]
#[path = "../tests/unit/server.rs"]
mod tests;
