//! HTTP API for assessments, pricing, health checks and Prometheus metrics

use assess_lib::{
    health::{ComponentStatus, HealthRegistry},
    observability::AssessMetrics,
    AssessError, AssessmentRequest, AssessmentResult, Assessor, PricingSnapshot, SourceKind,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: AssessMetrics,
    pub assessor: Arc<Assessor>,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, metrics: AssessMetrics, assessor: Arc<Assessor>) -> Self {
        Self {
            health_registry,
            metrics,
            assessor,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// Error response with a stable code
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Assess(AssessError),
}

impl From<AssessError> for ApiError {
    fn from(err: AssessError) -> Self {
        ApiError::Assess(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Assess(err) => {
                let status = match &err {
                    AssessError::UnknownSource(_) => StatusCode::BAD_REQUEST,
                    AssessError::Conflict(_) => StatusCode::CONFLICT,
                    AssessError::Catalog(_) => StatusCode::BAD_GATEWAY,
                    AssessError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, err.code(), err.to_string())
            }
        };

        (status, Json(ErrorBody { error, code })).into_response()
    }
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %err, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Current pricing snapshot
async fn pricing(State(state): State<Arc<AppState>>) -> Result<Json<PricingSnapshot>, ApiError> {
    let result = state.assessor.pricing().await;
    state.health_registry.observe_pricing(&result).await;
    Ok(Json(result?))
}

/// Assess a workbook, detecting its source kind from sheet names
async fn assess_detected(
    State(state): State<Arc<AppState>>,
    request: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<AssessmentResult>, ApiError> {
    let Json(request) = request?;
    let result = state
        .assessor
        .assess_detected(&request.sheets, request.context)
        .await;
    state.health_registry.observe_assessment(&result).await;
    Ok(Json(result?))
}

/// Assess a workbook of a declared source kind
async fn assess_source(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    request: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<AssessmentResult>, ApiError> {
    let source: SourceKind = source.parse()?;
    let Json(request) = request?;
    let result = state
        .assessor
        .assess(&request.sheets, source, request.context)
        .await;
    state.health_registry.observe_assessment(&result).await;
    Ok(Json(result?))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/pricing", get(pricing))
        .route("/api/v1/assessments", post(assess_detected))
        .route("/api/v1/assessments/:source", post(assess_source))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
