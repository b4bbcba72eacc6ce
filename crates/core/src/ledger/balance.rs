//! Running total calculations.
//!
//! An entry's running total is the running total of the owner's latest
//! active entry before it plus the entry's own signed contribution.

use rust_decimal::Decimal;

use super::entry::{EntryKind, LedgerEntry};
use super::error::LedgerError;
use super::validation::validate_running_total;

/// Computes the running total for a new or modified entry.
///
/// `previous` is the owner's latest active entry at write time, if any.
///
/// # Errors
///
/// Returns `LedgerError::Validation` if the total leaves the storable range.
pub fn running_total(
    previous: Option<&LedgerEntry>,
    kind: EntryKind,
    amount: Decimal,
) -> Result<Decimal, LedgerError> {
    let base = previous.map_or(Decimal::ZERO, |entry| entry.running_total);
    let total = base
        .checked_add(kind.signed(amount))
        .ok_or_else(|| LedgerError::Validation("running total out of range".to_string()))?;
    validate_running_total(total)
}
