//! Money book entry domain types.

use chrono::{DateTime, Utc};
use moneybook_shared::types::{EntryId, OwnerId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Whether an entry adds to or subtracts from the owner's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl EntryKind {
    /// Returns the signed contribution of `amount` to the running total.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parses a kind from its name or legacy numeric code (`0` income, `1` expense).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for anything else.
    pub fn parse(value: &str) -> Result<Self, LedgerError> {
        value.parse()
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "0" => Ok(Self::Income),
            "expense" | "1" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!(
                "unrecognized entry kind: {other:?}"
            ))),
        }
    }
}

/// A persisted money book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry ID, assigned by the store.
    pub id: EntryId,
    /// Owning user.
    pub owner_id: OwnerId,
    /// Positive magnitude of the transaction.
    pub amount: Decimal,
    /// Income or expense.
    pub kind: EntryKind,
    /// Free-text label.
    pub description: String,
    /// Owner's balance as of and including this entry.
    pub running_total: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete timestamp; `None` while the entry is active.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Returns true if the entry has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns this entry's signed contribution to the running total.
    #[must_use]
    pub fn contribution(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// Input for creating an entry.
#[derive(Debug, Clone)]
pub struct CreateEntryInput {
    /// Positive amount.
    pub amount: Decimal,
    /// Income or expense.
    pub kind: EntryKind,
    /// Free-text label.
    pub description: String,
}

/// Partial changes to an existing entry.
///
/// `amount` and `kind` travel together; `description` is optional on its own.
#[derive(Debug, Clone, Default)]
pub struct ModifyEntryInput {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New kind.
    pub kind: Option<EntryKind>,
    /// New description, kept unchanged when `None`.
    pub description: Option<String>,
}

/// A fully computed entry ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// Owning user.
    pub owner_id: OwnerId,
    /// Positive amount.
    pub amount: Decimal,
    /// Income or expense.
    pub kind: EntryKind,
    /// Free-text label.
    pub description: String,
    /// Computed running total.
    pub running_total: Decimal,
}

/// Field-level update applied by `modify`.
#[derive(Debug, Clone)]
pub struct EntryFields {
    /// New amount.
    pub amount: Decimal,
    /// New kind.
    pub kind: EntryKind,
    /// New description, kept unchanged when `None`.
    pub description: Option<String>,
    /// Recomputed running total.
    pub running_total: Decimal,
}
