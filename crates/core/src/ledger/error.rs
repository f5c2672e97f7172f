//! Ledger error types for validation, lookup and closure errors.

use chrono::NaiveDate;
use obra_shared::AppError;
use obra_shared::types::{AccountingEntryId, ExpenseId, IncomeId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::closure::ClosureError;
use crate::tax::DocumentType;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Rejected by the monthly closure guard.
    #[error(transparent)]
    Closure(#[from] ClosureError),

    // ========== Validation Errors ==========
    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Amount has more decimal places than the currency allows.
    #[error("Amount {0} has more than 2 decimal places")]
    TooManyDecimals(Decimal),

    /// Date falls in a year no accounting period can hold.
    #[error("Date {0} is outside the accepted years")]
    DateOutOfRange(NaiveDate),

    /// Description is empty or blank.
    #[error("Description cannot be empty")]
    EmptyDescription,

    /// Fiscal invoices must be numbered.
    #[error("Document type {0} requires a document number")]
    MissingDocumentNumber(DocumentType),

    // ========== Lookup Errors ==========
    /// Accounting entry not found.
    #[error("Accounting entry not found: {0}")]
    EntryNotFound(AccountingEntryId),

    /// Expense not found.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Income not found.
    #[error("Income not found: {0}")]
    IncomeNotFound(IncomeId),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Closure(err) => err.error_code(),
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::TooManyDecimals(_) => "TOO_MANY_DECIMALS",
            Self::DateOutOfRange(_) => "DATE_OUT_OF_RANGE",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::MissingDocumentNumber(_) => "MISSING_DOCUMENT_NUMBER",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::IncomeNotFound(_) => "INCOME_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Closure(err) => err.status_code(),
            Self::ZeroAmount
            | Self::NegativeAmount
            | Self::TooManyDecimals(_)
            | Self::DateOutOfRange(_)
            | Self::EmptyDescription
            | Self::MissingDocumentNumber(_) => 400,
            Self::EntryNotFound(_) | Self::ExpenseNotFound(_) | Self::IncomeNotFound(_) => 404,
        }
    }

    /// Returns true for the closure guard's `PeriodLocked` rejection.
    #[must_use]
    pub const fn is_period_locked(&self) -> bool {
        matches!(self, Self::Closure(ClosureError::PeriodLocked { .. }))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Closure(ClosureError::PeriodLocked { .. }) => Self::PeriodLocked(message),
            LedgerError::Closure(ClosureError::InsufficientRole { .. }) => {
                Self::Forbidden(message)
            }
            LedgerError::Closure(ClosureError::InvalidPeriod { .. })
            | LedgerError::ZeroAmount
            | LedgerError::NegativeAmount
            | LedgerError::TooManyDecimals(_)
            | LedgerError::DateOutOfRange(_)
            | LedgerError::EmptyDescription
            | LedgerError::MissingDocumentNumber(_) => Self::Validation(message),
            LedgerError::EntryNotFound(_)
            | LedgerError::ExpenseNotFound(_)
            | LedgerError::IncomeNotFound(_) => Self::NotFound(message),
        }
    }
}
