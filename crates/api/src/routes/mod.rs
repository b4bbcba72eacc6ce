//! API route definitions.

use std::sync::Arc;

use axum::{Router, middleware};
use moneybook_core::ledger::EntryStore;
use moneybook_shared::JwtService;

use crate::{AppState, middleware::auth_middleware};

pub mod entries;
pub mod health;

/// Creates the API router; entry routes sit behind the JWT middleware.
pub fn api_routes_with_auth<S: EntryStore + 'static>(
    jwt_service: Arc<JwtService>,
) -> Router<AppState<S>> {
    let protected_routes = Router::new()
        .merge(entries::routes())
        .layer(middleware::from_fn_with_state(jwt_service, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
