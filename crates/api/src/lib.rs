//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the money book
//! - Authentication middleware
//! - Response envelope and error mapping

pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use moneybook_core::ledger::{EntryStore, LedgerService};
use moneybook_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
pub struct AppState<S: EntryStore> {
    /// Ledger service over the configured entry store.
    pub ledger: Arc<LedgerService<S>>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
}

impl<S: EntryStore> AppState<S> {
    /// Builds the state from an entry store and a JWT service.
    #[must_use]
    pub fn new(store: Arc<S>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            ledger: Arc::new(LedgerService::new(store)),
            jwt_service,
        }
    }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S: EntryStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            jwt_service: Arc::clone(&self.jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: EntryStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            routes::api_routes_with_auth(Arc::clone(&state.jwt_service)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
