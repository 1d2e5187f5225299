use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{any, get},
};
use eyre::Result;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error};

use crate::{
    constants::EXPORT_CSV_FILENAME,
    renderer::{HomePage, ToHtml},
    service::{CheckOutcome, Export, ServiceError, SpeedTestService},
    store::StoreError,
    utils::export::{ExportFormat, InvalidExportFormat},
};

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Bind address
    pub bind_addr: SocketAddr,
    /// Enable cors
    pub enable_cors: bool,
}

/// Per-request failures and the responses they map to.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// A measurement cycle failed; reported as JSON to the page script
    #[error(transparent)]
    Check(ServiceError),
    #[error(transparent)]
    InvalidFormat(#[from] InvalidExportFormat),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "success": false, "error": self.to_string() })),
            )
                .into_response(),
            ApiError::Check(e) => {
                error!("Speed test error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "error": e.to_string() })),
                )
                    .into_response()
            }
            ApiError::InvalidFormat(e) => {
                debug!("Rejected export format {:?}", e.0);
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            ApiError::Service(_) | ApiError::Store(_) => {
                error!("Request failed: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}

#[derive(Clone)]
struct AppState {
    service: Arc<SpeedTestService>,
}

/// Runs the HTTP server.
pub async fn run_http_server(config: HttpServerConfig, service: Arc<SpeedTestService>) -> Result<()> {
    let app = create_router(service, config.enable_cors);

    tracing::info!("HTTP server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn create_router(service: Arc<SpeedTestService>, enable_cors: bool) -> Router {
    let mut router = Router::new()
        .route("/", get(index_handler))
        .route("/check-speed", any(check_speed_handler))
        .route("/export/{format}", get(export_handler))
        .with_state(AppState { service })
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET])
                .allow_headers(Any),
        );
    }

    router
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let latest_results = state.service.latest_results()?;
    Ok(Html(
        HomePage {
            latest_results: &latest_results,
        }
        .to_html(),
    ))
}

#[derive(Serialize)]
struct CheckResponse {
    success: bool,
    #[serde(flatten)]
    outcome: CheckOutcome,
}

async fn check_speed_handler(
    State(state): State<AppState>,
    method: Method,
) -> Result<Json<CheckResponse>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }

    let outcome = state.service.check_speed().await.map_err(ApiError::Check)?;
    Ok(Json(CheckResponse {
        success: true,
        outcome,
    }))
}

async fn export_handler(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse()?;

    Ok(match state.service.export(format)? {
        Export::Json(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Export::Csv(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_CSV_FILENAME}\""),
                ),
            ],
            body,
        )
            .into_response(),
    })
}
