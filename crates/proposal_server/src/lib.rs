//! HTTP surface for proposal responses.
//!
//! # Responsibility
//! - Map the submission and listing endpoints onto `ResponseService`.
//! - Translate service outcomes into the JSON envelopes the web form expects.
//!
//! # Invariants
//! - Service calls run on the blocking pool; handlers never block the runtime.
//! - Notification failures never change the HTTP status of a submission.

use axum::body::Bytes;
use axum::extract::{ConnectInfo, FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::error;
use proposal_core::{
    Notifier, ResponseId, ResponseRecord, ResponseService, ResponseStore, StoreError,
    SubmitError, ValidationError,
};
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const SUBMIT_PATH: &str = "/api/proposal/response";
pub const LIST_PATH: &str = "/api/responses";
pub const LIST_BY_PROPOSAL_PATH: &str = "/api/responses/{proposal_id}";
pub const HEALTH_PATH: &str = "/healthz";

const UNKNOWN_SOURCE: &str = "unknown";

/// Service shape used by the binary: store and notifier chosen at startup.
pub type DynResponseService = ResponseService<Box<dyn ResponseStore>, Box<dyn Notifier>>;

/// Shared handler state.
pub struct AppState<S: ResponseStore, N: Notifier> {
    service: Arc<ResponseService<S, N>>,
}

impl<S: ResponseStore, N: Notifier> AppState<S, N> {
    pub fn new(service: Arc<ResponseService<S, N>>) -> Self {
        Self { service }
    }
}

impl<S: ResponseStore, N: Notifier> Clone for AppState<S, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    success: bool,
    message: &'static str,
    id: ResponseId,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Error envelope: `{ "error": "..." }` with a matching status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<SubmitError> for ApiError {
    fn from(value: SubmitError) -> Self {
        match value {
            SubmitError::Validation(ValidationError::MissingField(_)) => {
                Self::BadRequest("Missing required fields")
            }
            SubmitError::Validation(ValidationError::UnsupportedDecision(_)) => {
                Self::BadRequest("Unsupported decision value")
            }
            SubmitError::Storage(_) => Self::Internal("Could not save response"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        error!(
            "event=response_list module=server status=error error_code=store_read_failed error={}",
            value
        );
        Self::Internal("Could not load responses")
    }
}

/// Network origin of the submitter, for audit.
///
/// Prefers the first `X-Forwarded-For` hop, then the TCP peer, then
/// `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAddress(pub String);

impl<S: Send + Sync> FromRequestParts<S> for SourceAddress {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let peer = || {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        };

        Ok(Self(
            forwarded
                .or_else(peer)
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        ))
    }
}

/// Builds the application router with CORS and request tracing.
pub fn router<S, N>(state: AppState<S, N>) -> Router
where
    S: ResponseStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(HEALTH_PATH, get(healthz))
        .route(SUBMIT_PATH, post(submit_response::<S, N>))
        .route(LIST_PATH, get(list_responses::<S, N>))
        .route(LIST_BY_PROPOSAL_PATH, get(list_proposal_responses::<S, N>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: proposal_core::core_version(),
    })
}

async fn submit_response<S, N>(
    State(state): State<AppState<S, N>>,
    SourceAddress(source): SourceAddress,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError>
where
    S: ResponseStore + 'static,
    N: Notifier + 'static,
{
    // Unparseable bodies carry no fields, so they fail as missing fields.
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let service = Arc::clone(&state.service);

    let receipt = run_blocking(move || service.submit(&payload, Some(source))).await??;

    Ok(Json(SubmitResponse {
        success: true,
        message: "Response received",
        id: receipt.id(),
    }))
}

async fn list_responses<S, N>(
    State(state): State<AppState<S, N>>,
) -> Result<Json<Vec<ResponseRecord>>, ApiError>
where
    S: ResponseStore + 'static,
    N: Notifier + 'static,
{
    let service = Arc::clone(&state.service);
    let records = run_blocking(move || service.get_all()).await??;
    Ok(Json(records))
}

async fn list_proposal_responses<S, N>(
    State(state): State<AppState<S, N>>,
    Path(proposal_id): Path<String>,
) -> Result<Json<Vec<ResponseRecord>>, ApiError>
where
    S: ResponseStore + 'static,
    N: Notifier + 'static,
{
    let service = Arc::clone(&state.service);
    let records = run_blocking(move || service.get_by_proposal(&proposal_id)).await??;
    Ok(Json(records))
}

async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|err| {
        error!(
            "event=blocking_task module=server status=error error_code=join_failed error={}",
            err
        );
        ApiError::Internal("Request could not be completed")
    })
}
