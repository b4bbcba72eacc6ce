//! Ledger entry repository for database operations.
//!
//! Implements the money book entry store using SeaORM.

use chrono::Utc;
use moneybook_core::ledger::{
    EntryFields, EntryKind, EntryStore, LedgerEntry, LedgerError, NewLedgerEntry,
};
use moneybook_shared::types::{EntryId, OwnerId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{ledger_entries, sea_orm_active_enums::EntryKind as DbEntryKind};

/// Ledger entry repository implementation.
#[derive(Debug)]
pub struct LedgerEntryRepository {
    db: DatabaseConnection,
}

impl LedgerEntryRepository {
    /// Create a new ledger entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies an update to one row, mapping a missing row to `NotFound`.
    async fn update_row(
        &self,
        id: EntryId,
        model: ledger_entries::ActiveModel,
    ) -> Result<ledger_entries::Model, LedgerError> {
        model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => LedgerError::NotFound(id),
            other => store_error(&other),
        })
    }
}

impl EntryStore for LedgerEntryRepository {
    async fn ping(&self) -> Result<(), LedgerError> {
        self.db.ping().await.map_err(|e| store_error(&e))
    }

    async fn find_active_by_id(
        &self,
        id: EntryId,
        owner_id: OwnerId,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let model = ledger_entries::Entity::find_by_id(id.into_inner())
            .filter(ledger_entries::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(ledger_entries::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| store_error(&e))?;

        Ok(model.map(to_domain))
    }

    async fn find_latest_active_by_owner(
        &self,
        owner_id: OwnerId,
        excluding: Option<EntryId>,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let mut query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(ledger_entries::Column::DeletedAt.is_null());

        if let Some(id) = excluding {
            query = query.filter(ledger_entries::Column::Id.ne(id.into_inner()));
        }

        let model = query
            .order_by_desc(ledger_entries::Column::UpdatedAt)
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .order_by_desc(ledger_entries::Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| store_error(&e))?;

        Ok(model.map(to_domain))
    }

    async fn find_all_by_owner(&self, owner_id: OwnerId) -> Result<Vec<LedgerEntry>, LedgerError> {
        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(ledger_entries::Column::DeletedAt.is_null())
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .order_by_desc(ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| store_error(&e))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_deleted_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(ledger_entries::Column::DeletedAt.is_not_null())
            .order_by_desc(ledger_entries::Column::DeletedAt)
            .order_by_desc(ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| store_error(&e))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_by_id_including_deleted(
        &self,
        id: EntryId,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let model = ledger_entries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| store_error(&e))?;

        Ok(model.map(to_domain))
    }

    async fn insert(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let now = Utc::now().into();

        let active_model = ledger_entries::ActiveModel {
            id: Set(EntryId::new().into_inner()),
            owner_id: Set(entry.owner_id.into_inner()),
            amount: Set(entry.amount),
            kind: Set(to_db_kind(entry.kind)),
            description: Set(entry.description),
            running_total: Set(entry.running_total),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| store_error(&e))?;

        Ok(to_domain(model))
    }

    async fn update_fields(&self, id: EntryId, fields: EntryFields) -> Result<(), LedgerError> {
        let mut model = ledger_entries::ActiveModel {
            id: Set(id.into_inner()),
            amount: Set(fields.amount),
            kind: Set(to_db_kind(fields.kind)),
            running_total: Set(fields.running_total),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        if let Some(description) = fields.description {
            model.description = Set(description);
        }

        self.update_row(id, model).await?;
        Ok(())
    }

    async fn soft_delete(&self, id: EntryId) -> Result<(), LedgerError> {
        let model = ledger_entries::ActiveModel {
            id: Set(id.into_inner()),
            deleted_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        self.update_row(id, model).await?;
        Ok(())
    }

    async fn save(&self, entry: &LedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let model = ledger_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            amount: Set(entry.amount),
            kind: Set(to_db_kind(entry.kind)),
            description: Set(entry.description.clone()),
            running_total: Set(entry.running_total),
            updated_at: Set(Utc::now().into()),
            deleted_at: Set(entry.deleted_at.map(Into::into)),
            ..Default::default()
        };

        let model = self.update_row(entry.id, model).await?;
        Ok(to_domain(model))
    }
}

fn store_error(err: &DbErr) -> LedgerError {
    tracing::error!(error = %err, "ledger entry query failed");
    LedgerError::store(err.to_string())
}

/// Convert domain entry kind to database enum.
const fn to_db_kind(kind: EntryKind) -> DbEntryKind {
    match kind {
        EntryKind::Income => DbEntryKind::Income,
        EntryKind::Expense => DbEntryKind::Expense,
    }
}

/// Convert database entry kind to domain enum.
const fn from_db_kind(kind: DbEntryKind) -> EntryKind {
    match kind {
        DbEntryKind::Income => EntryKind::Income,
        DbEntryKind::Expense => EntryKind::Expense,
    }
}

/// Convert database model to domain entry.
fn to_domain(model: ledger_entries::Model) -> LedgerEntry {
    LedgerEntry {
        id: EntryId::from_uuid(model.id),
        owner_id: OwnerId::from_uuid(model.owner_id),
        amount: model.amount,
        kind: from_db_kind(model.kind),
        description: model.description,
        running_total: model.running_total,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        deleted_at: model.deleted_at.map(|at| at.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    fn model(owner_id: Uuid, running_total: rust_decimal::Decimal) -> ledger_entries::Model {
        let now = Utc::now().into();
        ledger_entries::Model {
            id: Uuid::now_v7(),
            owner_id,
            amount: dec!(30),
            kind: DbEntryKind::Expense,
            description: "lunch".to_string(),
            running_total,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_active_by_id_maps_model() {
        let owner = Uuid::now_v7();
        let row = model(owner, dec!(70));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();
        let repo = LedgerEntryRepository::new(db);

        let entry = repo
            .find_active_by_id(EntryId::from_uuid(row.id), OwnerId::from_uuid(owner))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(entry.id.into_inner(), row.id);
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.amount, dec!(30));
        assert_eq!(entry.running_total, dec!(70));
        assert!(!entry.is_deleted());
    }

    #[tokio::test]
    async fn test_find_latest_returns_none_for_empty_ledger() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ledger_entries::Model>::new()])
            .into_connection();
        let repo = LedgerEntryRepository::new(db);

        let latest = repo
            .find_latest_active_by_owner(OwnerId::new(), None)
            .await
            .unwrap();

        assert!(latest.is_none());
    }

    #[tokio::test]
    async fn test_insert_returns_stored_row() {
        let owner = Uuid::now_v7();
        let row = model(owner, dec!(-30));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();
        let repo = LedgerEntryRepository::new(db);

        let entry = repo
            .insert(NewLedgerEntry {
                owner_id: OwnerId::from_uuid(owner),
                amount: dec!(30),
                kind: EntryKind::Expense,
                description: "lunch".to_string(),
                running_total: dec!(-30),
            })
            .await
            .unwrap();

        assert_eq!(entry.owner_id.into_inner(), owner);
        assert_eq!(entry.running_total, dec!(-30));
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ledger_entries::Model>::new()])
            .into_connection();
        let repo = LedgerEntryRepository::new(db);
        let id = EntryId::new();

        let result = repo.soft_delete(id).await;

        assert!(matches!(result, Err(LedgerError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_query_errors_become_store_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = LedgerEntryRepository::new(db);

        let result = repo.find_all_by_owner(OwnerId::new()).await;

        assert!(matches!(result, Err(LedgerError::Store(_))));
    }

    #[test]
    fn test_kind_conversion_round_trips() {
        for kind in [EntryKind::Income, EntryKind::Expense] {
            assert_eq!(from_db_kind(to_db_kind(kind)), kind);
        }
    }
}
