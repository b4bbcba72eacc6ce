//! Core business logic for the money book.
//!
//! This crate has no web or database dependencies. Entry types, validation
//! rules, the running-total computation and the store contract live here.
//!
//! # Modules
//!
//! - `ledger` - Entries, running totals, soft delete and restore

pub mod ledger;
