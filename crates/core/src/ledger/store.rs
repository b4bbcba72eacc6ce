//! Entry store contract consumed by the ledger service.

use moneybook_shared::types::{EntryId, OwnerId};

use super::entry::{EntryFields, LedgerEntry, NewLedgerEntry};
use super::error::LedgerError;

/// Repository trait for money book entry persistence.
///
/// This trait is implemented by the db crate to provide actual database
/// operations, and by [`InMemoryEntryStore`](super::InMemoryEntryStore).
/// "Active" means `deleted_at` is null.
pub trait EntryStore: Send + Sync {
    /// Checks that the store can currently serve requests.
    fn ping(&self) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;

    /// Finds an active entry by ID for the given owner.
    fn find_active_by_id(
        &self,
        id: EntryId,
        owner_id: OwnerId,
    ) -> impl std::future::Future<Output = Result<Option<LedgerEntry>, LedgerError>> + Send;

    /// Finds the owner's most recent active entry, ordered by `updated_at`
    /// then `created_at`, both descending. `excluding` skips one entry.
    fn find_latest_active_by_owner(
        &self,
        owner_id: OwnerId,
        excluding: Option<EntryId>,
    ) -> impl std::future::Future<Output = Result<Option<LedgerEntry>, LedgerError>> + Send;

    /// Lists the owner's active entries, newest `created_at` first.
    fn find_all_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> impl std::future::Future<Output = Result<Vec<LedgerEntry>, LedgerError>> + Send;

    /// Lists the owner's soft-deleted entries, most recently deleted first.
    fn find_deleted_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> impl std::future::Future<Output = Result<Vec<LedgerEntry>, LedgerError>> + Send;

    /// Finds an entry by ID whatever its owner or deletion state.
    fn find_by_id_including_deleted(
        &self,
        id: EntryId,
    ) -> impl std::future::Future<Output = Result<Option<LedgerEntry>, LedgerError>> + Send;

    /// Inserts a new entry, assigning its ID and timestamps.
    fn insert(
        &self,
        entry: NewLedgerEntry,
    ) -> impl std::future::Future<Output = Result<LedgerEntry, LedgerError>> + Send;

    /// Updates amount, kind, running total and (if given) description.
    fn update_fields(
        &self,
        id: EntryId,
        fields: EntryFields,
    ) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;

    /// Marks an entry as deleted by setting `deleted_at`.
    fn soft_delete(
        &self,
        id: EntryId,
    ) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;

    /// Persists every mutable column of `entry` and returns the stored row.
    fn save(
        &self,
        entry: &LedgerEntry,
    ) -> impl std::future::Future<Output = Result<LedgerEntry, LedgerError>> + Send;
}
