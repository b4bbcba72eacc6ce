//! Ledger entries migration.
//!
//! Creates the `entry_kind` enum and the `ledger_entries` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS ledger_entries CASCADE; DROP TYPE IF EXISTS entry_kind;",
        )
        .await?;
        Ok(())
    }
}

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TYPE entry_kind AS ENUM ('income', 'expense');

CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    owner_id UUID NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    kind entry_kind NOT NULL,
    description VARCHAR(255) NOT NULL,
    running_total NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT chk_ledger_entries_amount_positive CHECK (amount > 0)
);

-- Latest active entry per owner (running total base)
CREATE INDEX idx_ledger_entries_owner_latest
    ON ledger_entries(owner_id, updated_at DESC, created_at DESC)
    WHERE deleted_at IS NULL;

-- Owner listing, newest first
CREATE INDEX idx_ledger_entries_owner_created
    ON ledger_entries(owner_id, created_at DESC)
    WHERE deleted_at IS NULL;

-- Trash listing
CREATE INDEX idx_ledger_entries_owner_deleted
    ON ledger_entries(owner_id, deleted_at DESC)
    WHERE deleted_at IS NOT NULL;
";
