//! Accounting entry repository.

use chrono::Utc;
use obra_core::auth::Actor;
use obra_core::closure::AccountingPeriod;
use obra_core::ledger::validation::{validate_entry_patch, validate_new_manual_entry};
use obra_core::ledger::{AccountingEntry, EntryPatch, LedgerError, NewManualEntry, PeriodSummary};
use obra_shared::types::{AccountingEntryId, Money, PageRequest, PageResponse};
use tracing::{debug, info};

use super::{
    apply_entry_patch, ensure_can_record, ensure_can_record_manual, guard, guard_entry_change,
};
use crate::Store;

/// Accounting entry repository.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    store: Store,
}

impl EntryRepository {
    /// Creates a new entry repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Records an entry by hand, without a backing expense or income.
    ///
    /// # Errors
    ///
    /// The role cannot record manual entries, invalid input, or the month
    /// is closed for the actor.
    pub fn create_manual(
        &self,
        input: NewManualEntry,
        actor: Actor,
    ) -> Result<AccountingEntry, LedgerError> {
        let period = AccountingPeriod::from_date(input.date);
        ensure_can_record_manual(actor, period)?;
        validate_new_manual_entry(&input)?;
        let status = self.store.period_status(period);
        guard(actor, period, status)?;

        let amount = Money::new(
            input.amount,
            input.currency.unwrap_or_else(|| self.store.default_currency()),
        );
        let mut entry = AccountingEntry::new(
            input.entry_type,
            amount,
            input.date,
            status,
            input.description.trim().to_string(),
            actor.user_id,
        );
        entry.work_id = input.work_id;
        entry.supplier_id = input.supplier_id;

        info!(
            entry_id = %entry.id,
            entry_type = %entry.entry_type,
            %period,
            "Manual entry recorded"
        );

        self.store.entries().insert(entry.id, entry.clone());
        Ok(entry)
    }

    /// Edits an entry. Changes to amount, date or description are mirrored
    /// onto the expense or income it came from.
    ///
    /// # Errors
    ///
    /// Unknown entry, read-only role, invalid patch, or either the current or
    /// the target month is closed for the actor.
    pub fn update(
        &self,
        id: AccountingEntryId,
        patch: EntryPatch,
        actor: Actor,
    ) -> Result<AccountingEntry, LedgerError> {
        let mut entry = self.find_by_id(id)?;
        ensure_can_record(actor, entry.period())?;
        guard_entry_change(&self.store, actor, &entry, &patch)?;
        validate_entry_patch(&patch)?;

        apply_entry_patch(&self.store, &mut entry, &patch);
        self.sync_source(&entry);

        debug!(entry_id = %entry.id, period = %entry.period(), "Entry updated");

        self.store.entries().insert(entry.id, entry.clone());
        Ok(entry)
    }

    /// Deletes an entry together with the expense or income it came from.
    ///
    /// # Errors
    ///
    /// Unknown entry, read-only role, or the month is closed for the actor.
    pub fn delete(&self, id: AccountingEntryId, actor: Actor) -> Result<AccountingEntry, LedgerError> {
        let entry = self.find_by_id(id)?;
        ensure_can_record(actor, entry.period())?;
        guard(actor, entry.period(), entry.month_status)?;

        if let Some(expense_id) = entry.expense_id {
            self.store.expenses().remove(&expense_id);
        }
        if let Some(income_id) = entry.income_id {
            self.store.incomes().remove(&income_id);
        }
        self.store.entries().remove(&id);

        debug!(entry_id = %id, period = %entry.period(), "Entry deleted");
        Ok(entry)
    }

    /// Finds an entry by ID.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` when absent.
    pub fn find_by_id(&self, id: AccountingEntryId) -> Result<AccountingEntry, LedgerError> {
        self.store
            .entries()
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(LedgerError::EntryNotFound(id))
    }

    /// Entries of a month, oldest first, one page at a time.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for an out-of-range month.
    pub fn list_for_period(
        &self,
        month: u32,
        year: i32,
        page: PageRequest,
    ) -> Result<PageResponse<AccountingEntry>, LedgerError> {
        let period = AccountingPeriod::new(month, year)?;
        Ok(page.paginate(self.entries_in(period)))
    }

    /// Totals and counts for a month.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for an out-of-range month.
    pub fn summary(&self, month: u32, year: i32) -> Result<PeriodSummary, LedgerError> {
        let period = AccountingPeriod::new(month, year)?;
        let entries = self.entries_in(period);
        let expenses: Vec<_> = self
            .store
            .expenses()
            .iter()
            .filter(|expense| expense.period() == period)
            .map(|expense| expense.value().clone())
            .collect();
        Ok(PeriodSummary::build(
            period,
            self.store.period_status(period),
            &entries,
            &expenses,
        ))
    }

    fn entries_in(&self, period: AccountingPeriod) -> Vec<AccountingEntry> {
        let mut entries: Vec<AccountingEntry> = self
            .store
            .entries()
            .iter()
            .filter(|entry| entry.period() == period)
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        entries
    }

    fn sync_source(&self, entry: &AccountingEntry) {
        if let Some(expense_id) = entry.expense_id
            && let Some(mut expense) = self.store.expenses().get_mut(&expense_id)
        {
            expense.amount = entry.amount;
            expense.date = entry.date;
            expense.description.clone_from(&entry.description);
            expense.updated_at = Utc::now();
        }
        if let Some(income_id) = entry.income_id
            && let Some(mut income) = self.store.incomes().get_mut(&income_id)
        {
            income.amount = entry.amount;
            income.date = entry.date;
            income.description.clone_from(&entry.description);
        }
    }
}
