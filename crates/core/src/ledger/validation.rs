//! Input validation for money book operations.

use rust_decimal::Decimal;

use super::entry::{EntryKind, ModifyEntryInput};
use super::error::LedgerError;

/// Maximum number of decimal places stored for amounts.
pub const MAX_AMOUNT_SCALE: u32 = 4;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Largest magnitude an amount or running total may have.
///
/// Matches the `NUMERIC(19, 4)` column: 15 integer digits and 4 decimals.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, 4);

/// Validates that an amount is a positive number with at most four decimals
/// and no larger than [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns `LedgerError::Validation` otherwise.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(
            "amount must be a positive number".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::Validation(format!(
            "amount must be at most {MAX_AMOUNT}"
        )));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(LedgerError::Validation(format!(
            "amount supports at most {MAX_AMOUNT_SCALE} decimal places"
        )));
    }
    Ok(())
}

/// Validates a description and returns it trimmed.
///
/// # Errors
///
/// Returns `LedgerError::Validation` if it is blank or too long.
pub fn validate_description(description: &str) -> Result<String, LedgerError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(LedgerError::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Checks that a computed running total still fits in storage.
///
/// # Errors
///
/// Returns `LedgerError::Validation` if its magnitude exceeds [`MAX_AMOUNT`].
pub fn validate_running_total(total: Decimal) -> Result<Decimal, LedgerError> {
    if total.abs() > MAX_AMOUNT {
        return Err(LedgerError::Validation(
            "running total out of range".to_string(),
        ));
    }
    Ok(total)
}

/// Extracts the amount/kind pair a modification must carry.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when either half is missing or the
/// amount is invalid.
pub fn require_amount_and_kind(
    input: &ModifyEntryInput,
) -> Result<(Decimal, EntryKind), LedgerError> {
    match (input.amount, input.kind) {
        (Some(amount), Some(kind)) => {
            validate_amount(amount)?;
            Ok((amount, kind))
        }
        _ => Err(LedgerError::Validation(
            "amount and kind must be supplied together".to_string(),
        )),
    }
}
