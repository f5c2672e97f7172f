//! Repositories over the in-memory store.
//!
//! Every write path checks, in order: the role's ledger permission, input
//! validation, then the closure guard for each period it touches.

pub mod entry;
pub mod expense;
pub mod income;
pub mod period;

pub use entry::EntryRepository;
pub use expense::ExpenseRepository;
pub use income::IncomeRepository;
pub use period::PeriodRepository;

use chrono::Utc;
use obra_core::auth::Actor;
use obra_core::closure::{
    AccountingPeriod, ClosureError, ClosureGuard, MonthStatus, PeriodOperation,
};
use obra_core::ledger::{AccountingEntry, EntryPatch, LedgerError};
use obra_shared::types::Money;
use tracing::warn;

use crate::Store;

/// Rejects roles without write access to the ledger.
fn ensure_can_record(actor: Actor, period: AccountingPeriod) -> Result<(), LedgerError> {
    if actor.role.can_record_movements() {
        return Ok(());
    }
    Err(deny(actor, period, PeriodOperation::Mutate))
}

/// Rejects roles that may not record entries by hand.
fn ensure_can_record_manual(actor: Actor, period: AccountingPeriod) -> Result<(), LedgerError> {
    if actor.role.can_record_manual_entries() {
        return Ok(());
    }
    Err(deny(actor, period, PeriodOperation::ManualEntry))
}

fn deny(actor: Actor, period: AccountingPeriod, operation: PeriodOperation) -> LedgerError {
    warn!(
        user_id = %actor.user_id,
        role = %actor.role,
        %period,
        %operation,
        "Ledger write denied: insufficient role"
    );
    ClosureError::InsufficientRole {
        role: actor.role,
        operation,
        period,
    }
    .into()
}

/// Runs the closure guard for one period, logging denials.
fn guard(
    actor: Actor,
    period: AccountingPeriod,
    status: MonthStatus,
) -> Result<(), LedgerError> {
    ClosureGuard::ensure_can_mutate(period, status, actor.role).map_err(|err| {
        warn!(
            user_id = %actor.user_id,
            role = %actor.role,
            %period,
            "Ledger write denied: period closed"
        );
        LedgerError::from(err)
    })
}

/// Guards an existing entry and, when the patch moves it, its target period.
fn guard_entry_change(
    store: &Store,
    actor: Actor,
    entry: &AccountingEntry,
    patch: &EntryPatch,
) -> Result<(), LedgerError> {
    guard(actor, entry.period(), entry.month_status)?;
    if let Some(date) = patch.date {
        let target = AccountingPeriod::from_date(date);
        if target != entry.period() {
            guard(actor, target, store.period_status(target))?;
        }
    }
    Ok(())
}

/// Applies a patch to an entry and re-stamps `month_status` from the store,
/// so the copy written back carries the period's status as of now.
fn apply_entry_patch(store: &Store, entry: &mut AccountingEntry, patch: &EntryPatch) {
    if let Some(amount) = patch.amount {
        entry.amount = Money::new(amount, entry.amount.currency);
    }
    if let Some(description) = &patch.description {
        entry.description.clone_from(description);
    }
    if let Some(date) = patch.date {
        entry.set_date(date);
    }
    entry.month_status = store.period_status(entry.period());
    entry.updated_at = Utc::now();
}
