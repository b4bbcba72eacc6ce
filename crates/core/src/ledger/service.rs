//! Ledger service: running totals and soft-delete state transitions.

use std::sync::Arc;

use moneybook_shared::types::{EntryId, OwnerId};

use super::balance::running_total;
use super::entry::{CreateEntryInput, EntryFields, LedgerEntry, ModifyEntryInput, NewLedgerEntry};
use super::error::LedgerError;
use super::locks::OwnerLocks;
use super::store::EntryStore;
use super::validation::{require_amount_and_kind, validate_amount, validate_description};

/// Money book service.
///
/// Writes that read the owner's latest entry (`create`, `modify`) and the
/// state transitions (`delete`, `restore`) hold the owner's lock, so totals
/// computed for one owner never race each other inside this process.
pub struct LedgerService<S: EntryStore> {
    store: Arc<S>,
    locks: OwnerLocks,
}

impl<S: EntryStore> LedgerService<S> {
    /// Create a new ledger service over `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: OwnerLocks::new(),
        }
    }

    /// Records a new entry on top of the owner's latest active entry.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an invalid amount, a blank description or a
    /// running total out of range, and `Store` if persistence fails.
    pub async fn create(
        &self,
        owner_id: OwnerId,
        input: CreateEntryInput,
    ) -> Result<LedgerEntry, LedgerError> {
        validate_amount(input.amount)?;
        let description = validate_description(&input.description)?;

        let _guard = self.locks.acquire(owner_id).await;

        let previous = self.store.find_latest_active_by_owner(owner_id, None).await?;
        let total = running_total(previous.as_ref(), input.kind, input.amount)?;

        self.store
            .insert(NewLedgerEntry {
                owner_id,
                amount: input.amount,
                kind: input.kind,
                description,
                running_total: total,
            })
            .await
    }

    /// Checks that the underlying store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `Store` if it is not.
    pub async fn ping(&self) -> Result<(), LedgerError> {
        self.store.ping().await
    }

    /// Fetches one active entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry is missing, deleted or owned by
    /// someone else.
    pub async fn get(&self, id: EntryId, owner_id: OwnerId) -> Result<LedgerEntry, LedgerError> {
        self.store
            .find_active_by_id(id, owner_id)
            .await?
            .ok_or(LedgerError::NotFound(id))
    }

    /// Lists the owner's active entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the lookup fails.
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.store.find_all_by_owner(owner_id).await
    }

    /// Lists the owner's soft-deleted entries, most recently deleted first.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the lookup fails.
    pub async fn list_deleted(&self, owner_id: OwnerId) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.store.find_deleted_by_owner(owner_id).await
    }

    /// Replaces an entry's amount and kind (and optionally its description)
    /// and recomputes its running total.
    ///
    /// The new total builds on the owner's latest active entry other than
    /// this one. Later entries are not recomputed.
    ///
    /// # Errors
    ///
    /// Every failure is reported as `InvalidRequest`; the original error is
    /// available through [`LedgerError::cause`].
    pub async fn modify(
        &self,
        id: EntryId,
        owner_id: OwnerId,
        input: ModifyEntryInput,
    ) -> Result<LedgerEntry, LedgerError> {
        self.apply_modification(id, owner_id, input)
            .await
            .map_err(LedgerError::invalid_request)
    }

    async fn apply_modification(
        &self,
        id: EntryId,
        owner_id: OwnerId,
        input: ModifyEntryInput,
    ) -> Result<LedgerEntry, LedgerError> {
        let (amount, kind) = require_amount_and_kind(&input)?;
        let description = input
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        let _guard = self.locks.acquire(owner_id).await;

        self.get(id, owner_id).await?;

        let previous = self
            .store
            .find_latest_active_by_owner(owner_id, Some(id))
            .await?;
        let total = running_total(previous.as_ref(), kind, amount)?;

        self.store
            .update_fields(
                id,
                EntryFields {
                    amount,
                    kind,
                    description,
                    running_total: total,
                },
            )
            .await?;

        self.get(id, owner_id).await
    }

    /// Soft-deletes an entry and returns its ID.
    ///
    /// Running totals of this and every other entry are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry is missing, already deleted or owned by
    /// someone else.
    pub async fn delete(&self, id: EntryId, owner_id: OwnerId) -> Result<EntryId, LedgerError> {
        let _guard = self.locks.acquire(owner_id).await;

        self.get(id, owner_id).await?;
        self.store.soft_delete(id).await?;

        Ok(id)
    }

    /// Reactivates a soft-deleted entry by ID alone, whoever owns it.
    ///
    /// The running total is kept as it was when the entry was deleted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such entry exists and `Validation` if it is
    /// not deleted.
    pub async fn restore(&self, id: EntryId) -> Result<LedgerEntry, LedgerError> {
        let owner_id = self.find_any(id).await?.owner_id;
        self.restore_locked(id, owner_id).await
    }

    /// Reactivates a soft-deleted entry belonging to `owner_id`.
    ///
    /// # Errors
    ///
    /// As [`restore`](Self::restore), with entries of other owners reported
    /// as `NotFound`.
    pub async fn restore_owned(
        &self,
        id: EntryId,
        owner_id: OwnerId,
    ) -> Result<LedgerEntry, LedgerError> {
        let entry = self.find_any(id).await?;
        if entry.owner_id != owner_id {
            return Err(LedgerError::NotFound(id));
        }
        self.restore_locked(id, owner_id).await
    }

    async fn find_any(&self, id: EntryId) -> Result<LedgerEntry, LedgerError> {
        self.store
            .find_by_id_including_deleted(id)
            .await?
            .ok_or(LedgerError::NotFound(id))
    }

    async fn restore_locked(
        &self,
        id: EntryId,
        owner_id: OwnerId,
    ) -> Result<LedgerEntry, LedgerError> {
        let _guard = self.locks.acquire(owner_id).await;

        // State may have changed while waiting for the lock.
        let mut entry = self.find_any(id).await?;
        if !entry.is_deleted() {
            return Err(LedgerError::Validation(format!("entry {id} is not deleted")));
        }

        entry.deleted_at = None;
        self.store.save(&entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::validation::MAX_AMOUNT;
    use crate::ledger::{EntryKind, InMemoryEntryStore};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn service() -> LedgerService<InMemoryEntryStore> {
        LedgerService::new(Arc::new(InMemoryEntryStore::new()))
    }

    fn input(amount: Decimal, kind: EntryKind, description: &str) -> CreateEntryInput {
        CreateEntryInput {
            amount,
            kind,
            description: description.to_string(),
        }
    }

    fn change(amount: Decimal, kind: EntryKind) -> ModifyEntryInput {
        ModifyEntryInput {
            amount: Some(amount),
            kind: Some(kind),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_income_then_expense_running_totals() {
        let svc = service();
        let owner = OwnerId::new();

        let salary = svc
            .create(owner, input(dec!(100), EntryKind::Income, "salary"))
            .await
            .unwrap();
        assert_eq!(salary.running_total, dec!(100));

        let lunch = svc
            .create(owner, input(dec!(30), EntryKind::Expense, "lunch"))
            .await
            .unwrap();
        assert_eq!(lunch.running_total, dec!(70));
    }

    #[tokio::test]
    async fn test_first_expense_goes_negative() {
        let svc = service();
        let entry = svc
            .create(OwnerId::new(), input(dec!(12.5), EntryKind::Expense, "coffee"))
            .await
            .unwrap();

        assert_eq!(entry.running_total, dec!(-12.5));
    }

    #[tokio::test]
    async fn test_owners_have_independent_totals() {
        let svc = service();
        let alice = OwnerId::new();
        let bob = OwnerId::new();

        svc.create(alice, input(dec!(100), EntryKind::Income, "a"))
            .await
            .unwrap();
        let bob_entry = svc
            .create(bob, input(dec!(5), EntryKind::Income, "b"))
            .await
            .unwrap();

        assert_eq!(bob_entry.running_total, dec!(5));
    }

    #[tokio::test]
    async fn test_create_rejects_amount_beyond_storage_range() {
        let svc = service();
        let owner = OwnerId::new();

        let err = svc
            .create(owner, input(Decimal::MAX, EntryKind::Income, "jackpot"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(svc.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_total_out_of_range() {
        let svc = service();
        let owner = OwnerId::new();

        let first = svc
            .create(owner, input(MAX_AMOUNT, EntryKind::Income, "first"))
            .await
            .unwrap();
        assert_eq!(first.running_total, MAX_AMOUNT);

        let err = svc
            .create(owner, input(MAX_AMOUNT, EntryKind::Income, "second"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(svc.list(owner).await.unwrap().len(), 1);

        let spent = svc
            .create(owner, input(MAX_AMOUNT, EntryKind::Expense, "spent"))
            .await
            .unwrap();
        assert_eq!(spent.running_total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_modify_rejects_total_out_of_range() {
        let svc = service();
        let owner = OwnerId::new();

        svc.create(owner, input(MAX_AMOUNT, EntryKind::Income, "savings"))
            .await
            .unwrap();
        let small = svc
            .create(owner, input(dec!(1), EntryKind::Expense, "fee"))
            .await
            .unwrap();

        let err = svc
            .modify(small.id, owner, change(dec!(1), EntryKind::Income))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
        assert!(matches!(err.cause(), LedgerError::Validation(_)));

        let unchanged = svc.get(small.id, owner).await.unwrap();
        assert_eq!(unchanged.running_total, small.running_total);
        assert_eq!(unchanged.kind, EntryKind::Expense);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let svc = service();
        let owner = OwnerId::new();

        for bad in [
            input(Decimal::ZERO, EntryKind::Income, "zero"),
            input(dec!(-1), EntryKind::Income, "negative"),
            input(dec!(1), EntryKind::Income, "   "),
        ] {
            let err = svc.create(owner, bad).await.unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)), "{err:?}");
        }
        assert!(svc.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_owner() {
        let svc = service();
        let owner = OwnerId::new();
        let entry = svc
            .create(owner, input(dec!(10), EntryKind::Income, "gift"))
            .await
            .unwrap();

        assert_eq!(svc.get(entry.id, owner).await.unwrap(), entry);
        assert!(matches!(
            svc.get(entry.id, OwnerId::new()).await,
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            svc.get(EntryId::new(), owner).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let svc = service();
        let owner = OwnerId::new();
        let first = svc
            .create(owner, input(dec!(1), EntryKind::Income, "first"))
            .await
            .unwrap();
        let second = svc
            .create(owner, input(dec!(2), EntryKind::Income, "second"))
            .await
            .unwrap();

        let ids: Vec<EntryId> = svc.list(owner).await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_modify_recomputes_from_latest_other_entry() {
        let svc = service();
        let owner = OwnerId::new();
        svc.create(owner, input(dec!(100), EntryKind::Income, "salary"))
            .await
            .unwrap();
        let lunch = svc
            .create(owner, input(dec!(30), EntryKind::Expense, "lunch"))
            .await
            .unwrap();

        let modified = svc
            .modify(
                lunch.id,
                owner,
                ModifyEntryInput {
                    amount: Some(dec!(45)),
                    kind: Some(EntryKind::Expense),
                    description: Some("team lunch".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(modified.amount, dec!(45));
        assert_eq!(modified.running_total, dec!(55));
        assert_eq!(modified.description, "team lunch");
        assert!(modified.updated_at >= lunch.updated_at);
    }

    #[tokio::test]
    async fn test_modify_keeps_description_when_absent() {
        let svc = service();
        let owner = OwnerId::new();
        let entry = svc
            .create(owner, input(dec!(10), EntryKind::Income, "refund"))
            .await
            .unwrap();

        let modified = svc
            .modify(entry.id, owner, change(dec!(12), EntryKind::Income))
            .await
            .unwrap();

        assert_eq!(modified.description, "refund");
        assert_eq!(modified.running_total, dec!(12));
    }

    #[tokio::test]
    async fn test_modify_same_values_matches_fresh_create() {
        let svc = service();
        let owner = OwnerId::new();
        svc.create(owner, input(dec!(100), EntryKind::Income, "salary"))
            .await
            .unwrap();
        let entry = svc
            .create(owner, input(dec!(30), EntryKind::Expense, "lunch"))
            .await
            .unwrap();

        svc.modify(entry.id, owner, change(dec!(30), EntryKind::Expense))
            .await
            .unwrap();
        let fetched = svc.get(entry.id, owner).await.unwrap();

        assert_eq!(fetched.running_total, entry.running_total);
    }

    #[tokio::test]
    async fn test_modify_without_pair_is_rejected_and_leaves_entry() {
        let svc = service();
        let owner = OwnerId::new();
        let entry = svc
            .create(owner, input(dec!(10), EntryKind::Income, "gift"))
            .await
            .unwrap();

        let partials = [
            ModifyEntryInput {
                amount: Some(dec!(20)),
                ..ModifyEntryInput::default()
            },
            ModifyEntryInput {
                kind: Some(EntryKind::Expense),
                ..ModifyEntryInput::default()
            },
            ModifyEntryInput {
                description: Some("renamed".to_string()),
                ..ModifyEntryInput::default()
            },
        ];

        for partial in partials {
            let err = svc.modify(entry.id, owner, partial).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidRequest(_)));
            assert!(matches!(err.cause(), LedgerError::Validation(_)));
        }

        assert_eq!(svc.get(entry.id, owner).await.unwrap(), entry);
    }

    #[tokio::test]
    async fn test_modify_missing_entry_is_invalid_request() {
        let svc = service();
        let owner = OwnerId::new();
        let entry = svc
            .create(owner, input(dec!(10), EntryKind::Income, "gift"))
            .await
            .unwrap();

        let err = svc
            .modify(entry.id, OwnerId::new(), change(dec!(1), EntryKind::Income))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
        assert!(matches!(err.cause(), LedgerError::NotFound(id) if *id == entry.id));
    }

    #[tokio::test]
    async fn test_delete_hides_entry_and_keeps_totals() {
        let svc = service();
        let owner = OwnerId::new();
        let salary = svc
            .create(owner, input(dec!(100), EntryKind::Income, "salary"))
            .await
            .unwrap();
        let lunch = svc
            .create(owner, input(dec!(30), EntryKind::Expense, "lunch"))
            .await
            .unwrap();

        assert_eq!(svc.delete(salary.id, owner).await.unwrap(), salary.id);

        assert!(matches!(
            svc.get(salary.id, owner).await,
            Err(LedgerError::NotFound(_))
        ));
        let listed = svc.list(owner).await.unwrap();
        assert_eq!(listed, vec![lunch.clone()]);
        assert_eq!(listed[0].running_total, dec!(70));

        let trash = svc.list_deleted(owner).await.unwrap();
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].id, salary.id);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let svc = service();
        let owner = OwnerId::new();
        let entry = svc
            .create(owner, input(dec!(10), EntryKind::Income, "gift"))
            .await
            .unwrap();

        svc.delete(entry.id, owner).await.unwrap();
        assert!(matches!(
            svc.delete(entry.id, owner).await,
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete(EntryId::new(), owner).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_after_delete_builds_on_remaining_latest() {
        let svc = service();
        let owner = OwnerId::new();
        svc.create(owner, input(dec!(100), EntryKind::Income, "salary"))
            .await
            .unwrap();
        let bonus = svc
            .create(owner, input(dec!(50), EntryKind::Income, "bonus"))
            .await
            .unwrap();
        svc.delete(bonus.id, owner).await.unwrap();

        let next = svc
            .create(owner, input(dec!(10), EntryKind::Expense, "snack"))
            .await
            .unwrap();
        assert_eq!(next.running_total, dec!(90));
    }

    #[tokio::test]
    async fn test_restore_returns_entry_with_original_total() {
        let svc = service();
        let owner = OwnerId::new();
        svc.create(owner, input(dec!(100), EntryKind::Income, "salary"))
            .await
            .unwrap();
        let lunch = svc
            .create(owner, input(dec!(30), EntryKind::Expense, "lunch"))
            .await
            .unwrap();
        svc.delete(lunch.id, owner).await.unwrap();

        let restored = svc.restore(lunch.id).await.unwrap();

        assert!(!restored.is_deleted());
        assert_eq!(restored.running_total, dec!(70));
        assert_eq!(svc.get(lunch.id, owner).await.unwrap().running_total, dec!(70));
        assert_eq!(svc.list(owner).await.unwrap().len(), 2);
        assert!(svc.list_deleted(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_active_entry_is_validation_error() {
        let svc = service();
        let owner = OwnerId::new();
        let entry = svc
            .create(owner, input(dec!(10), EntryKind::Income, "gift"))
            .await
            .unwrap();

        assert!(matches!(
            svc.restore(entry.id).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            svc.restore(EntryId::new()).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_restore_owned_checks_owner() {
        let svc = service();
        let owner = OwnerId::new();
        let entry = svc
            .create(owner, input(dec!(10), EntryKind::Income, "gift"))
            .await
            .unwrap();
        svc.delete(entry.id, owner).await.unwrap();

        assert!(matches!(
            svc.restore_owned(entry.id, OwnerId::new()).await,
            Err(LedgerError::NotFound(_))
        ));

        let restored = svc.restore_owned(entry.id, owner).await.unwrap();
        assert_eq!(restored.id, entry.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_keep_a_consistent_chain() {
        let svc = Arc::new(service());
        let owner = OwnerId::new();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move {
                    svc.create(owner, input(dec!(1), EntryKind::Income, "tick"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let mut totals: Vec<Decimal> = svc
            .list(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.running_total)
            .collect();
        totals.sort();
        let expected: Vec<Decimal> = (1..=32).map(Decimal::from).collect();
        assert_eq!(totals, expected);
    }

    /// Store whose writes always fail.
    struct BrokenStore {
        inner: InMemoryEntryStore,
    }

    impl EntryStore for BrokenStore {
        async fn ping(&self) -> Result<(), LedgerError> {
            Err(LedgerError::store("connection reset"))
        }

        async fn find_active_by_id(
            &self,
            id: EntryId,
            owner_id: OwnerId,
        ) -> Result<Option<LedgerEntry>, LedgerError> {
            self.inner.find_active_by_id(id, owner_id).await
        }

        async fn find_latest_active_by_owner(
            &self,
            owner_id: OwnerId,
            excluding: Option<EntryId>,
        ) -> Result<Option<LedgerEntry>, LedgerError> {
            self.inner.find_latest_active_by_owner(owner_id, excluding).await
        }

        async fn find_all_by_owner(
            &self,
            owner_id: OwnerId,
        ) -> Result<Vec<LedgerEntry>, LedgerError> {
            self.inner.find_all_by_owner(owner_id).await
        }

        async fn find_deleted_by_owner(
            &self,
            owner_id: OwnerId,
        ) -> Result<Vec<LedgerEntry>, LedgerError> {
            self.inner.find_deleted_by_owner(owner_id).await
        }

        async fn find_by_id_including_deleted(
            &self,
            id: EntryId,
        ) -> Result<Option<LedgerEntry>, LedgerError> {
            self.inner.find_by_id_including_deleted(id).await
        }

        async fn insert(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
            self.inner.insert(entry).await
        }

        async fn update_fields(
            &self,
            _id: EntryId,
            _fields: EntryFields,
        ) -> Result<(), LedgerError> {
            Err(LedgerError::store("connection reset"))
        }

        async fn soft_delete(&self, _id: EntryId) -> Result<(), LedgerError> {
            Err(LedgerError::store("connection reset"))
        }

        async fn save(&self, _entry: &LedgerEntry) -> Result<LedgerEntry, LedgerError> {
            Err(LedgerError::store("connection reset"))
        }
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let svc = LedgerService::new(Arc::new(BrokenStore {
            inner: InMemoryEntryStore::new(),
        }));
        let owner = OwnerId::new();
        let entry = svc
            .create(owner, input(dec!(10), EntryKind::Income, "gift"))
            .await
            .unwrap();

        assert!(matches!(
            svc.delete(entry.id, owner).await,
            Err(LedgerError::Store(_))
        ));

        let err = svc
            .modify(entry.id, owner, change(dec!(5), EntryKind::Income))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
        assert!(matches!(err.cause(), LedgerError::Store(_)));

        assert!(matches!(svc.ping().await, Err(LedgerError::Store(_))));
        assert!(service().ping().await.is_ok());
    }
}
