//! Liveness and store readiness.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use moneybook_core::ledger::{EntryStore, LedgerError};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"healthy"` or `"unavailable"`.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// `"ok"` or `"unreachable"`.
    pub store: &'static str,
}

fn health_response(store: Result<(), LedgerError>) -> (StatusCode, HealthResponse) {
    let version = env!("CARGO_PKG_VERSION");
    match store {
        Ok(()) => (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                version,
                store: "ok",
            },
        ),
        Err(e) => {
            warn!(error = %e, "Entry store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse {
                    status: "unavailable",
                    version,
                    store: "unreachable",
                },
            )
        }
    }
}

async fn health_check<S: EntryStore>(State(state): State<AppState<S>>) -> Response {
    let (status, body) = health_response(state.ledger.ping().await);
    (status, Json(body)).into_response()
}

/// Creates the public health route.
pub fn routes<S: EntryStore + 'static>() -> Router<AppState<S>> {
    Router::new().route("/health", get(health_check::<S>))
}
