//! Money book entry routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use moneybook_core::ledger::{
    CreateEntryInput, EntryKind, EntryStore, LedgerEntry, LedgerError, ModifyEntryInput,
};
use moneybook_shared::{AppError, types::EntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{AppState, error::error_response, middleware::AuthUser, response::success};

/// Creates the entry routes.
pub fn routes<S: EntryStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/entries", post(create_entry::<S>).get(list_entries::<S>))
        .route("/entries/trash", get(list_trash::<S>))
        .route(
            "/entries/{id}",
            get(get_entry::<S>)
                .patch(modify_entry::<S>)
                .delete(delete_entry::<S>),
        )
        .route("/entries/{id}/restore", post(restore_entry::<S>))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Amount as sent by clients: a decimal string or a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    /// `"12.50"`
    Text(String),
    /// `12.5`
    Number(serde_json::Number),
}

impl AmountField {
    /// Parses the amount into a decimal. Sign and scale are checked later.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the value is not a number.
    pub fn parse(&self) -> Result<Decimal, LedgerError> {
        let raw = match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        };

        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| LedgerError::Validation(format!("amount is not a number: {raw:?}")))
    }
}

/// Kind as sent by clients: a name or a legacy numeric code.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KindField {
    /// `"income"` or `"expense"`
    Name(String),
    /// `0` (income) or `1` (expense)
    Code(i64),
}

impl KindField {
    /// Resolves the entry kind.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for unknown names or codes.
    pub fn parse(&self) -> Result<EntryKind, LedgerError> {
        match self {
            Self::Name(name) => EntryKind::parse(name),
            Self::Code(code) => EntryKind::parse(&code.to_string()),
        }
    }
}

/// Request body for creating an entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Free-text label.
    pub description: String,
    /// Positive amount.
    pub amount: AmountField,
    /// Income or expense.
    pub kind: KindField,
}

impl CreateEntryRequest {
    fn into_input(self) -> Result<CreateEntryInput, LedgerError> {
        Ok(CreateEntryInput {
            amount: self.amount.parse()?,
            kind: self.kind.parse()?,
            description: self.description,
        })
    }
}

/// Request body for modifying an entry.
#[derive(Debug, Default, Deserialize)]
pub struct ModifyEntryRequest {
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New amount, required together with `kind`.
    #[serde(default)]
    pub amount: Option<AmountField>,
    /// New kind, required together with `amount`.
    #[serde(default)]
    pub kind: Option<KindField>,
}

impl ModifyEntryRequest {
    fn into_input(self) -> Result<ModifyEntryInput, LedgerError> {
        Ok(ModifyEntryInput {
            amount: self.amount.as_ref().map(AmountField::parse).transpose()?,
            kind: self.kind.as_ref().map(KindField::parse).transpose()?,
            description: self.description,
        })
    }
}

/// Query string of `GET /entries`.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Return this single entry instead of the list.
    pub id: Option<String>,
}

/// Response for an entry.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry ID.
    pub id: EntryId,
    /// Amount as a decimal string.
    pub amount: String,
    /// `income` or `expense`.
    pub kind: &'static str,
    /// Free-text label.
    pub description: String,
    /// Running total as a decimal string.
    pub running_total: String,
    /// Created at timestamp (RFC 3339).
    pub created_at: String,
    /// Updated at timestamp (RFC 3339).
    pub updated_at: String,
    /// Deleted at timestamp (RFC 3339), null while active.
    pub deleted_at: Option<String>,
}

impl From<LedgerEntry> for EntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount.normalize().to_string(),
            kind: entry.kind.as_str(),
            description: entry.description,
            running_total: entry.running_total.normalize().to_string(),
            created_at: entry.created_at.to_rfc3339(),
            updated_at: entry.updated_at.to_rfc3339(),
            deleted_at: entry.deleted_at.map(|at| at.to_rfc3339()),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse an entry ID from a path or query value.
fn parse_entry_id(raw: &str) -> Result<EntryId, AppError> {
    raw.parse::<EntryId>().map_err(AppError::from)
}

/// Turn a JSON body rejection into a ledger validation error.
fn rejection_error(rejection: &JsonRejection) -> LedgerError {
    LedgerError::Validation(rejection.body_text())
}

/// Log a ledger failure and render it.
fn ledger_error_response(err: LedgerError, action: &str) -> Response {
    match &err {
        LedgerError::Store(_) => error!(error = %err, action, "Ledger operation failed"),
        _ => warn!(error = %err, cause = %err.cause(), action, "Ledger request rejected"),
    }
    error_response(&AppError::from(err))
}

fn entry_list(entries: Vec<LedgerEntry>) -> Vec<EntryResponse> {
    entries.into_iter().map(EntryResponse::from).collect()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/entries`
/// Record a new entry on top of the caller's latest entry.
async fn create_entry<S: EntryStore + 'static>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Response {
    let owner_id = auth.owner_id();

    let input = match payload {
        Ok(Json(payload)) => payload.into_input(),
        Err(rejection) => Err(rejection_error(&rejection)),
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => return ledger_error_response(e, "create entry"),
    };

    match state.ledger.create(owner_id, input).await {
        Ok(entry) => {
            info!(
                owner_id = %owner_id,
                entry_id = %entry.id,
                running_total = %entry.running_total,
                "Entry created"
            );
            success(
                StatusCode::CREATED,
                "Entry created",
                EntryResponse::from(entry),
            )
        }
        Err(e) => ledger_error_response(e, "create entry"),
    }
}

/// GET `/entries` or GET `/entries?id={id}`
/// List the caller's entries, or fetch one when `id` is given.
async fn list_entries<S: EntryStore + 'static>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Query(query): Query<ListEntriesQuery>,
) -> Response {
    if let Some(raw_id) = query.id {
        return fetch_entry(&state, &auth, &raw_id).await;
    }

    match state.ledger.list(auth.owner_id()).await {
        Ok(entries) => success(StatusCode::OK, "Entries retrieved", entry_list(entries)),
        Err(e) => ledger_error_response(e, "list entries"),
    }
}

/// GET `/entries/trash`
/// List the caller's soft-deleted entries.
async fn list_trash<S: EntryStore + 'static>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
) -> Response {
    match state.ledger.list_deleted(auth.owner_id()).await {
        Ok(entries) => success(
            StatusCode::OK,
            "Deleted entries retrieved",
            entry_list(entries),
        ),
        Err(e) => ledger_error_response(e, "list deleted entries"),
    }
}

/// GET `/entries/{id}`
async fn get_entry<S: EntryStore + 'static>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Response {
    fetch_entry(&state, &auth, &id).await
}

async fn fetch_entry<S: EntryStore + 'static>(
    state: &AppState<S>,
    auth: &AuthUser,
    raw_id: &str,
) -> Response {
    let id = match parse_entry_id(raw_id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    match state.ledger.get(id, auth.owner_id()).await {
        Ok(entry) => success(StatusCode::OK, "Entry retrieved", EntryResponse::from(entry)),
        Err(e) => ledger_error_response(e, "get entry"),
    }
}

/// PATCH `/entries/{id}`
/// Change amount and kind (together) and optionally the description.
async fn modify_entry<S: EntryStore + 'static>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<ModifyEntryRequest>, JsonRejection>,
) -> Response {
    let owner_id = auth.owner_id();
    let id = match parse_entry_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    let input = match payload {
        Ok(Json(payload)) => payload.into_input(),
        Err(rejection) => Err(rejection_error(&rejection)),
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => return ledger_error_response(e.invalid_request(), "modify entry"),
    };

    match state.ledger.modify(id, owner_id, input).await {
        Ok(entry) => {
            info!(
                owner_id = %owner_id,
                entry_id = %entry.id,
                running_total = %entry.running_total,
                "Entry modified"
            );
            success(StatusCode::OK, "Entry updated", EntryResponse::from(entry))
        }
        Err(e) => ledger_error_response(e, "modify entry"),
    }
}

/// DELETE `/entries/{id}`
/// Soft-delete an entry.
async fn delete_entry<S: EntryStore + 'static>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Response {
    let owner_id = auth.owner_id();
    let id = match parse_entry_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    match state.ledger.delete(id, owner_id).await {
        Ok(deleted) => {
            info!(owner_id = %owner_id, entry_id = %deleted, "Entry deleted");
            success(StatusCode::OK, "Entry deleted", json!({ "id": deleted }))
        }
        Err(e) => ledger_error_response(e, "delete entry"),
    }
}

/// POST `/entries/{id}/restore`
/// Bring back one of the caller's soft-deleted entries.
async fn restore_entry<S: EntryStore + 'static>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Response {
    let owner_id = auth.owner_id();
    let id = match parse_entry_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    match state.ledger.restore_owned(id, owner_id).await {
        Ok(entry) => {
            info!(owner_id = %owner_id, entry_id = %entry.id, "Entry restored");
            success(StatusCode::OK, "Entry restored", EntryResponse::from(entry))
        }
        Err(e) => ledger_error_response(e, "restore entry"),
    }
}
