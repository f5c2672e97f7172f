//! Income repository.

use obra_core::auth::Actor;
use obra_core::closure::AccountingPeriod;
use obra_core::ledger::validation::validate_new_income;
use obra_core::ledger::{AccountingEntry, EntryType, Income, LedgerError, NewIncome};
use obra_shared::types::{IncomeId, Money};
use tracing::{debug, info};

use super::{ensure_can_record, guard};
use crate::Store;

/// Income repository.
#[derive(Debug, Clone)]
pub struct IncomeRepository {
    store: Store,
}

impl IncomeRepository {
    /// Creates a new income repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Records an income and its ledger entry.
    ///
    /// # Errors
    ///
    /// Read-only role, invalid input, or the target month is closed for
    /// the actor.
    pub fn submit(&self, input: NewIncome, actor: Actor) -> Result<Income, LedgerError> {
        let period = AccountingPeriod::from_date(input.date);
        ensure_can_record(actor, period)?;
        validate_new_income(&input)?;
        let status = self.store.period_status(period);
        guard(actor, period, status)?;

        let amount = Money::new(
            input.amount,
            input.currency.unwrap_or_else(|| self.store.default_currency()),
        );
        let description = input.description.trim().to_string();
        let mut entry = AccountingEntry::new(
            EntryType::Income,
            amount,
            input.date,
            status,
            description.clone(),
            actor.user_id,
        );
        let income = Income {
            id: IncomeId::new(),
            entry_id: entry.id,
            work_id: input.work_id,
            description,
            amount,
            date: input.date,
            created_by: actor.user_id,
            created_at: entry.created_at,
        };
        entry.work_id = input.work_id;
        entry.income_id = Some(income.id);

        info!(income_id = %income.id, entry_id = %entry.id, %period, "Income recorded");

        self.store.entries().insert(entry.id, entry);
        self.store.incomes().insert(income.id, income.clone());
        Ok(income)
    }

    /// Deletes an income and its ledger entry.
    ///
    /// # Errors
    ///
    /// Unknown income, read-only role, or the month is closed for the actor.
    pub fn delete(&self, id: IncomeId, actor: Actor) -> Result<Income, LedgerError> {
        let income = self.find_by_id(id)?;
        let status = self
            .store
            .entries()
            .get(&income.entry_id)
            .map_or_else(
                || self.store.period_status(income.period()),
                |entry| entry.month_status,
            );

        ensure_can_record(actor, income.period())?;
        guard(actor, income.period(), status)?;

        self.store.entries().remove(&income.entry_id);
        self.store.incomes().remove(&id);
        debug!(income_id = %id, period = %income.period(), "Income deleted");
        Ok(income)
    }

    /// Finds an income by ID.
    ///
    /// # Errors
    ///
    /// `IncomeNotFound` when absent.
    pub fn find_by_id(&self, id: IncomeId) -> Result<Income, LedgerError> {
        self.store
            .incomes()
            .get(&id)
            .map(|income| income.value().clone())
            .ok_or(LedgerError::IncomeNotFound(id))
    }
}
