//! Period summaries for the dashboard.

use std::collections::BTreeMap;

use obra_shared::types::Currency;
use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{AccountingEntry, EntryType, Expense};
use crate::closure::{AccountingPeriod, MonthStatus};

/// Totals for one currency within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyTotals {
    /// Currency of every amount below.
    pub currency: Currency,
    /// Sum of income entries.
    pub income: Decimal,
    /// Sum of expense entries.
    pub expense: Decimal,
    /// Income minus expense.
    pub net: Decimal,
    /// Perceptions charged on the period's expenses.
    pub perceptions: Decimal,
}

impl CurrencyTotals {
    fn empty(currency: Currency) -> Self {
        Self {
            currency,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            net: Decimal::ZERO,
            perceptions: Decimal::ZERO,
        }
    }
}

/// Aggregated view of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// The month.
    pub period: AccountingPeriod,
    /// Its closure status.
    pub status: MonthStatus,
    /// Number of entries in the month.
    pub entry_count: usize,
    /// Number of income entries.
    pub income_count: usize,
    /// Number of expense entries.
    pub expense_count: usize,
    /// Totals, one row per currency, ordered by currency.
    pub totals: Vec<CurrencyTotals>,
}

impl PeriodSummary {
    /// Builds the summary from the month's entries and expenses.
    ///
    /// Entries and expenses outside `period` are ignored.
    #[must_use]
    pub fn build(
        period: AccountingPeriod,
        status: MonthStatus,
        entries: &[AccountingEntry],
        expenses: &[Expense],
    ) -> Self {
        let mut totals: BTreeMap<Currency, CurrencyTotals> = BTreeMap::new();
        let mut income_count = 0;
        let mut expense_count = 0;

        for entry in entries.iter().filter(|e| e.period() == period) {
            let row = totals
                .entry(entry.amount.currency)
                .or_insert_with(|| CurrencyTotals::empty(entry.amount.currency));
            match entry.entry_type {
                EntryType::Income => {
                    row.income += entry.amount.amount;
                    income_count += 1;
                }
                EntryType::Expense => {
                    row.expense += entry.amount.amount;
                    expense_count += 1;
                }
            }
            row.net += entry.signed_amount();
        }

        for expense in expenses.iter().filter(|e| e.period() == period) {
            let row = totals
                .entry(expense.amount.currency)
                .or_insert_with(|| CurrencyTotals::empty(expense.amount.currency));
            row.perceptions += expense.taxes.total_perceptions();
        }

        Self {
            period,
            status,
            entry_count: income_count + expense_count,
            income_count,
            expense_count,
            totals: totals.into_values().collect(),
        }
    }

    /// Totals for a currency, if the month has any movement in it.
    #[must_use]
    pub fn totals_for(&self, currency: Currency) -> Option<&CurrencyTotals> {
        self.totals.iter().find(|t| t.currency == currency)
    }
}
