//! Money book ledger.
//!
//! Entries carry a running total derived from the owner's latest active
//! entry at write time. Deletion is soft: a timestamp hides the entry from
//! reads until it is restored.

pub mod balance;
pub mod entry;
pub mod error;
pub mod locks;
pub mod memory;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use entry::{
    CreateEntryInput, EntryFields, EntryKind, LedgerEntry, ModifyEntryInput, NewLedgerEntry,
};
pub use error::LedgerError;
pub use locks::OwnerLocks;
pub use memory::InMemoryEntryStore;
pub use service::LedgerService;
pub use store::EntryStore;
