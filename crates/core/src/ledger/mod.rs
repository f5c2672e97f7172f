//! Ledger of accounting entries and the movements that feed it.
//!
//! This module provides:
//! - Accounting entries tagged with their `(month, year)` and `month_status`
//! - Expenses (with their tax snapshot) and incomes
//! - Input validation for new movements and patches
//! - Period summaries for the dashboard
//! - Error types for ledger operations

pub mod error;
pub mod summary;
pub mod types;
pub mod validation;

pub use error::LedgerError;
pub use summary::{CurrencyTotals, PeriodSummary};
pub use types::{
    AccountingEntry, EntryPatch, EntryType, Expense, ExpensePatch, Income, NewExpense, NewIncome,
    NewManualEntry,
};
