//! Entity re-exports.

pub use super::ledger_entries::Entity as LedgerEntries;
