//! Process-local entry store.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use moneybook_shared::types::{EntryId, OwnerId};

use super::entry::{EntryFields, LedgerEntry, NewLedgerEntry};
use super::error::LedgerError;
use super::store::EntryStore;

#[derive(Debug)]
struct StoredEntry {
    entry: LedgerEntry,
    /// Insertion order, breaks timestamp ties.
    seq: u64,
}

#[derive(Debug, Default)]
struct State {
    rows: Vec<StoredEntry>,
    next_seq: u64,
}

impl State {
    fn row_mut(&mut self, id: EntryId) -> Result<&mut StoredEntry, LedgerError> {
        self.rows
            .iter_mut()
            .find(|row| row.entry.id == id)
            .ok_or(LedgerError::NotFound(id))
    }
}

/// Entry store kept in memory.
///
/// Used by tests and by the server when `store.backend = "memory"`.
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    state: Mutex<State>,
}

impl InMemoryEntryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::store("in-memory store lock poisoned"))
    }
}

impl EntryStore for InMemoryEntryStore {
    async fn ping(&self) -> Result<(), LedgerError> {
        self.state().map(drop)
    }

    async fn find_active_by_id(
        &self,
        id: EntryId,
        owner_id: OwnerId,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let state = self.state()?;
        Ok(state
            .rows
            .iter()
            .map(|row| &row.entry)
            .find(|e| e.id == id && e.owner_id == owner_id && !e.is_deleted())
            .cloned())
    }

    async fn find_latest_active_by_owner(
        &self,
        owner_id: OwnerId,
        excluding: Option<EntryId>,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let state = self.state()?;
        Ok(state
            .rows
            .iter()
            .filter(|row| {
                row.entry.owner_id == owner_id
                    && !row.entry.is_deleted()
                    && Some(row.entry.id) != excluding
            })
            .max_by_key(|row| (row.entry.updated_at, row.entry.created_at, row.seq))
            .map(|row| row.entry.clone()))
    }

    async fn find_all_by_owner(&self, owner_id: OwnerId) -> Result<Vec<LedgerEntry>, LedgerError> {
        let state = self.state()?;
        let mut rows: Vec<&StoredEntry> = state
            .rows
            .iter()
            .filter(|row| row.entry.owner_id == owner_id && !row.entry.is_deleted())
            .collect();
        rows.sort_by_key(|row| std::cmp::Reverse((row.entry.created_at, row.seq)));
        Ok(rows.into_iter().map(|row| row.entry.clone()).collect())
    }

    async fn find_deleted_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let state = self.state()?;
        let mut rows: Vec<&StoredEntry> = state
            .rows
            .iter()
            .filter(|row| row.entry.owner_id == owner_id && row.entry.is_deleted())
            .collect();
        rows.sort_by_key(|row| std::cmp::Reverse((row.entry.deleted_at, row.seq)));
        Ok(rows.into_iter().map(|row| row.entry.clone()).collect())
    }

    async fn find_by_id_including_deleted(
        &self,
        id: EntryId,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let state = self.state()?;
        Ok(state
            .rows
            .iter()
            .find(|row| row.entry.id == id)
            .map(|row| row.entry.clone()))
    }

    async fn insert(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let now = Utc::now();
        let stored = LedgerEntry {
            id: EntryId::new(),
            owner_id: entry.owner_id,
            amount: entry.amount,
            kind: entry.kind,
            description: entry.description,
            running_total: entry.running_total,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let mut state = self.state()?;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.rows.push(StoredEntry {
            entry: stored.clone(),
            seq,
        });
        Ok(stored)
    }

    async fn update_fields(&self, id: EntryId, fields: EntryFields) -> Result<(), LedgerError> {
        let mut state = self.state()?;
        let row = state.row_mut(id)?;
        row.entry.amount = fields.amount;
        row.entry.kind = fields.kind;
        row.entry.running_total = fields.running_total;
        if let Some(description) = fields.description {
            row.entry.description = description;
        }
        row.entry.updated_at = Utc::now();
        Ok(())
    }

    async fn soft_delete(&self, id: EntryId) -> Result<(), LedgerError> {
        let mut state = self.state()?;
        state.row_mut(id)?.entry.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn save(&self, entry: &LedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let mut state = self.state()?;
        let row = state.row_mut(entry.id)?;
        row.entry.amount = entry.amount;
        row.entry.kind = entry.kind;
        row.entry.description.clone_from(&entry.description);
        row.entry.running_total = entry.running_total;
        row.entry.deleted_at = entry.deleted_at;
        row.entry.updated_at = Utc::now();
        Ok(row.entry.clone())
    }
}
