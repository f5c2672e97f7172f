//! Expense repository: submission with automatic taxes.

use chrono::Utc;
use obra_core::auth::Actor;
use obra_core::closure::AccountingPeriod;
use obra_core::ledger::validation::{validate_expense_patch, validate_new_expense};
use obra_core::ledger::{AccountingEntry, EntryType, Expense, ExpensePatch, LedgerError, NewExpense};
use obra_core::tax::{DocumentType, calculate_taxes};
use obra_shared::types::{ExpenseId, Money};
use tracing::{debug, info};

use super::{apply_entry_patch, ensure_can_record, guard, guard_entry_change};
use crate::Store;

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    store: Store,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Submits an expense and its ledger entry.
    ///
    /// An expense without a document is booked against a `VAL-NNNNNNNN`
    /// placeholder. Perceptions and withholdings are computed here and
    /// stored on the expense.
    ///
    /// # Errors
    ///
    /// Read-only role, invalid input, or the target month is closed for
    /// the actor.
    pub fn submit(&self, input: NewExpense, actor: Actor) -> Result<Expense, LedgerError> {
        let period = AccountingPeriod::from_date(input.date);
        ensure_can_record(actor, period)?;
        validate_new_expense(&input)?;
        let status = self.store.period_status(period);
        guard(actor, period, status)?;

        let document_type = input.document_type.unwrap_or(DocumentType::Val);
        let document_number = match input.document_number {
            Some(number) if !number.trim().is_empty() => Some(number.trim().to_string()),
            _ if document_type == DocumentType::Val => Some(self.store.next_val_number()),
            _ => None,
        };

        let taxes = calculate_taxes(
            input.amount,
            input.supplier_fiscal_condition,
            Some(document_type),
        );
        let amount = Money::new(
            input.amount,
            input.currency.unwrap_or_else(|| self.store.default_currency()),
        );
        let description = input.description.trim().to_string();

        let mut entry = AccountingEntry::new(
            EntryType::Expense,
            amount,
            input.date,
            status,
            description.clone(),
            actor.user_id,
        );
        let expense_id = ExpenseId::new();
        entry.work_id = input.work_id;
        entry.supplier_id = input.supplier_id;
        entry.expense_id = Some(expense_id);

        let expense = Expense {
            id: expense_id,
            entry_id: entry.id,
            work_id: input.work_id,
            supplier_id: input.supplier_id,
            supplier_fiscal_condition: input.supplier_fiscal_condition,
            description,
            amount,
            date: input.date,
            document_type,
            document_number,
            taxes,
            created_by: actor.user_id,
            created_at: entry.created_at,
            updated_at: entry.created_at,
        };

        info!(
            expense_id = %expense.id,
            entry_id = %entry.id,
            %period,
            document_type = %expense.document_type,
            perceptions = %expense.taxes.total_perceptions(),
            "Expense submitted"
        );

        self.store.entries().insert(entry.id, entry);
        self.store.expenses().insert(expense.id, expense.clone());
        Ok(expense)
    }

    /// Edits an expense and its ledger entry. Taxes are kept as submitted.
    ///
    /// # Errors
    ///
    /// Unknown expense, read-only role, invalid patch, or either the current
    /// or the target month is closed for the actor.
    pub fn update(
        &self,
        id: ExpenseId,
        patch: ExpensePatch,
        actor: Actor,
    ) -> Result<Expense, LedgerError> {
        let mut expense = self.find_by_id(id)?;
        let mut entry = self
            .store
            .entries()
            .get(&expense.entry_id)
            .map(|entry| entry.value().clone())
            .ok_or(LedgerError::EntryNotFound(expense.entry_id))?;

        ensure_can_record(actor, entry.period())?;
        let entry_patch = patch.entry_patch();
        guard_entry_change(&self.store, actor, &entry, &entry_patch)?;
        validate_expense_patch(
            &patch,
            expense.document_type,
            expense.document_number.as_deref(),
        )?;

        apply_entry_patch(&self.store, &mut entry, &entry_patch);
        expense.amount = entry.amount;
        expense.date = entry.date;
        expense.description.clone_from(&entry.description);
        if let Some(document_type) = patch.document_type {
            expense.document_type = document_type;
        }
        if let Some(number) = patch.document_number {
            expense.document_number = Some(number);
        }
        expense.updated_at = Utc::now();

        debug!(expense_id = %expense.id, period = %entry.period(), "Expense updated");

        self.store.entries().insert(entry.id, entry);
        self.store.expenses().insert(expense.id, expense.clone());
        Ok(expense)
    }

    /// Deletes an expense and its ledger entry.
    ///
    /// # Errors
    ///
    /// Unknown expense, read-only role, or the month is closed for the actor.
    pub fn delete(&self, id: ExpenseId, actor: Actor) -> Result<Expense, LedgerError> {
        let expense = self.find_by_id(id)?;
        let status = self
            .store
            .entries()
            .get(&expense.entry_id)
            .map_or_else(
                || self.store.period_status(expense.period()),
                |entry| entry.month_status,
            );

        ensure_can_record(actor, expense.period())?;
        guard(actor, expense.period(), status)?;

        self.store.entries().remove(&expense.entry_id);
        self.store.expenses().remove(&id);
        debug!(expense_id = %id, period = %expense.period(), "Expense deleted");
        Ok(expense)
    }

    /// Finds an expense by ID.
    ///
    /// # Errors
    ///
    /// `ExpenseNotFound` when absent.
    pub fn find_by_id(&self, id: ExpenseId) -> Result<Expense, LedgerError> {
        self.store
            .expenses()
            .get(&id)
            .map(|expense| expense.value().clone())
            .ok_or(LedgerError::ExpenseNotFound(id))
    }

    /// Expenses of a month, oldest first.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for an out-of-range month.
    pub fn list_for_period(&self, month: u32, year: i32) -> Result<Vec<Expense>, LedgerError> {
        let period = AccountingPeriod::new(month, year)?;
        let mut expenses: Vec<Expense> = self
            .store
            .expenses()
            .iter()
            .filter(|expense| expense.period() == period)
            .map(|expense| expense.value().clone())
            .collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(expenses)
    }
}
