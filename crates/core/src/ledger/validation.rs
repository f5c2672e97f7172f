//! Business rule validation for ledger inputs.

use chrono::{Datelike, NaiveDate};
use obra_shared::types::money::CURRENCY_SCALE;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryPatch, ExpensePatch, NewExpense, NewIncome, NewManualEntry};
use crate::closure::{MAX_YEAR, MIN_YEAR};
use crate::tax::DocumentType;

/// Amounts must be strictly positive with at most two decimal places.
///
/// # Errors
///
/// `ZeroAmount`, `NegativeAmount` or `TooManyDecimals`.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount.is_sign_negative() {
        return Err(LedgerError::NegativeAmount);
    }
    if amount.normalize().scale() > CURRENCY_SCALE {
        return Err(LedgerError::TooManyDecimals(amount));
    }
    Ok(())
}

/// Dates must fall in a month that can be closed.
///
/// # Errors
///
/// `DateOutOfRange` for years outside `MIN_YEAR..=MAX_YEAR`.
pub fn validate_date(date: NaiveDate) -> Result<(), LedgerError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(LedgerError::DateOutOfRange(date));
    }
    Ok(())
}

/// # Errors
///
/// `EmptyDescription` when blank.
pub fn validate_description(description: &str) -> Result<(), LedgerError> {
    if description.trim().is_empty() {
        return Err(LedgerError::EmptyDescription);
    }
    Ok(())
}

/// Fiscal invoices (A, B, C) need a number; receipts and VAL may go without.
///
/// # Errors
///
/// `MissingDocumentNumber` for an unnumbered invoice.
pub fn validate_document(
    document_type: Option<DocumentType>,
    document_number: Option<&str>,
) -> Result<(), LedgerError> {
    match document_type {
        Some(document) if document.is_invoice() => {
            if document_number.is_none_or(|number| number.trim().is_empty()) {
                return Err(LedgerError::MissingDocumentNumber(document));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// # Errors
///
/// The first failing rule.
pub fn validate_new_expense(input: &NewExpense) -> Result<(), LedgerError> {
    validate_amount(input.amount)?;
    validate_date(input.date)?;
    validate_description(&input.description)?;
    validate_document(input.document_type, input.document_number.as_deref())
}

/// # Errors
///
/// The first failing rule.
pub fn validate_new_income(input: &NewIncome) -> Result<(), LedgerError> {
    validate_amount(input.amount)?;
    validate_date(input.date)?;
    validate_description(&input.description)
}

/// # Errors
///
/// The first failing rule.
pub fn validate_new_manual_entry(input: &NewManualEntry) -> Result<(), LedgerError> {
    validate_amount(input.amount)?;
    validate_date(input.date)?;
    validate_description(&input.description)
}

/// Validates only the fields the patch sets.
///
/// # Errors
///
/// The first failing rule.
pub fn validate_entry_patch(patch: &EntryPatch) -> Result<(), LedgerError> {
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(date) = patch.date {
        validate_date(date)?;
    }
    if let Some(description) = &patch.description {
        validate_description(description)?;
    }
    Ok(())
}

/// Validates the patch against the expense's resulting document.
///
/// # Errors
///
/// The first failing rule.
pub fn validate_expense_patch(
    patch: &ExpensePatch,
    current_document: DocumentType,
    current_number: Option<&str>,
) -> Result<(), LedgerError> {
    validate_entry_patch(&patch.entry_patch())?;
    let document = patch.document_type.unwrap_or(current_document);
    let number = patch.document_number.as_deref().or(current_number);
    validate_document(Some(document), number)
}
