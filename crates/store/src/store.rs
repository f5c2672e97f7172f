//! In-memory tables backed by `DashMap`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use obra_core::closure::{AccountingPeriod, MonthStatus, PeriodState};
use obra_core::ledger::{AccountingEntry, Expense, Income};
use obra_shared::config::LedgerConfig;
use obra_shared::types::{AccountingEntryId, Currency, ExpenseId, IncomeId};

struct Inner {
    entries: DashMap<AccountingEntryId, AccountingEntry>,
    expenses: DashMap<ExpenseId, Expense>,
    incomes: DashMap<IncomeId, Income>,
    periods: DashMap<AccountingPeriod, PeriodState>,
    val_sequence: AtomicU64,
    currency: Currency,
}

/// Shared handle over every table.
///
/// Cheaply cloneable via `Arc`; all clones see the same data.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Creates an empty store whose inputs default to `currency`.
    #[must_use]
    pub fn new(currency: Currency) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                expenses: DashMap::new(),
                incomes: DashMap::new(),
                periods: DashMap::new(),
                val_sequence: AtomicU64::new(0),
                currency,
            }),
        }
    }

    /// Creates an empty store from the ledger configuration.
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.currency)
    }

    /// Currency applied to inputs that do not name one.
    #[must_use]
    pub fn default_currency(&self) -> Currency {
        self.inner.currency
    }

    pub(crate) fn entries(&self) -> &DashMap<AccountingEntryId, AccountingEntry> {
        &self.inner.entries
    }

    pub(crate) fn expenses(&self) -> &DashMap<ExpenseId, Expense> {
        &self.inner.expenses
    }

    pub(crate) fn incomes(&self) -> &DashMap<IncomeId, Income> {
        &self.inner.incomes
    }

    pub(crate) fn periods(&self) -> &DashMap<AccountingPeriod, PeriodState> {
        &self.inner.periods
    }

    /// Current status of a period. Periods never closed are open.
    #[must_use]
    pub fn period_status(&self, period: AccountingPeriod) -> MonthStatus {
        self.inner
            .periods
            .get(&period)
            .map_or(MonthStatus::Open, |record| record.status)
    }

    /// Issues the next placeholder document number, `VAL-00000001` onwards.
    pub(crate) fn next_val_number(&self) -> String {
        let next = self.inner.val_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("VAL-{next:08}")
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Currency::Ars)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.inner.entries.len())
            .field("expenses", &self.inner.expenses.len())
            .field("incomes", &self.inner.incomes.len())
            .field("periods", &self.inner.periods.len())
            .field("currency", &self.inner.currency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_val_numbers_are_sequential() {
        let store = Store::default();
        assert_eq!(store.next_val_number(), "VAL-00000001");
        assert_eq!(store.next_val_number(), "VAL-00000002");

        let clone = store.clone();
        assert_eq!(clone.next_val_number(), "VAL-00000003");
    }

    #[test]
    fn test_unknown_period_is_open() {
        let store = Store::new(Currency::Usd);
        let period = AccountingPeriod::new(3, 2024).unwrap();
        assert_eq!(store.period_status(period), MonthStatus::Open);
        assert_eq!(store.default_currency(), Currency::Usd);
    }
}
