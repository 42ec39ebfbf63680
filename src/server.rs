//! HTTP server.
//!
//! Thin JSON surface over [`crate::service`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/search?q=&page=&limit=` | Ranked, highlighted page of results |
//! | `GET`  | `/search/{id}?q=` | One document with its highlight |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Missing search query" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front end
//! on another port can call the API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::client::{IndexClient, OpenSearchClient};
use crate::config::Config;
use crate::error::SearchError;
use crate::models::{DocumentView, SearchPage};
use crate::query::PageParams;
use crate::service::{get_document, search_documents};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    client: Arc<dyn IndexClient>,
}

/// Starts the server against the OpenSearch index named in `[index]`.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let client = Arc::new(OpenSearchClient::new(&config.index)?);
    run_server_with_client(config, client).await
}

/// Starts the server with an explicit index client.
///
/// Used by [`run_server`] and by tests that substitute an in-memory index.
pub async fn run_server_with_client(
    config: &Config,
    client: Arc<dyn IndexClient>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(client);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind = %bind_addr, index = %config.index.name, "search server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router with CORS applied.
pub fn router(client: Arc<dyn IndexClient>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handle_search))
        .route("/search/{id}", get(handle_document))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { client })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Maps a service failure to a response. `failure_message` is the generic
/// text shown when the index is unavailable; details stay in the logs.
fn classify_search_error(err: SearchError, failure_message: &str) -> AppError {
    match err {
        SearchError::InvalidQuery => bad_request("Missing search query"),
        SearchError::DocumentNotFound { .. } => not_found("Document not found"),
        SearchError::IndexUnavailable { .. } => internal(failure_message),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /search ============

/// Raw query-string parameters; coercion happens in [`PageParams::from_raw`].
#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, AppError> {
    let page = PageParams::from_raw(params.page.as_deref(), params.limit.as_deref());
    let query = params.q.unwrap_or_default();

    search_documents(state.client.as_ref(), &query, page)
        .await
        .map(Json)
        .map_err(|e| classify_search_error(e, "Search failed"))
}

// ============ GET /search/{id} ============

#[derive(Debug, Deserialize)]
struct DocumentParams {
    q: Option<String>,
}

async fn handle_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DocumentParams>,
) -> Result<Json<DocumentView>, AppError> {
    get_document(state.client.as_ref(), &id, params.q.as_deref())
        .await
        .map(Json)
        .map_err(|e| classify_search_error(e, "Failed to load document"))
}
