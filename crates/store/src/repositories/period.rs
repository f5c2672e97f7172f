//! Period repository: monthly close and reopen.

use obra_core::auth::Actor;
use obra_core::closure::{
    AccountingPeriod, ClosureAction, ClosureError, ClosureGuard, MonthStatus, PeriodState,
};
use obra_core::ledger::LedgerError;
use tracing::{info, warn};

use crate::Store;

/// Period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    store: Store,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Closes a month and stamps every entry in it as closed.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for an out-of-range month, `InsufficientRole` unless
    /// the actor may close periods.
    pub fn close_month(
        &self,
        month: u32,
        year: i32,
        actor: Actor,
    ) -> Result<ClosureAction, LedgerError> {
        let period = AccountingPeriod::new(month, year)?;
        let current = self.store.period_status(period);
        let action = ClosureGuard::close(period, current, actor.role, actor.user_id)
            .inspect_err(|err| log_denied(actor, period, err))?;
        self.record(&action);
        Ok(action)
    }

    /// Reopens a month and stamps every entry in it as open.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for an out-of-range month, `InsufficientRole` unless
    /// the actor may reopen periods.
    pub fn reopen_month(
        &self,
        month: u32,
        year: i32,
        actor: Actor,
    ) -> Result<ClosureAction, LedgerError> {
        let period = AccountingPeriod::new(month, year)?;
        let current = self.store.period_status(period);
        let action = ClosureGuard::reopen(period, current, actor.role, actor.user_id)
            .inspect_err(|err| log_denied(actor, period, err))?;
        self.record(&action);
        Ok(action)
    }

    /// Current status of a month.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` for an out-of-range month.
    pub fn status(&self, month: u32, year: i32) -> Result<MonthStatus, LedgerError> {
        let period = AccountingPeriod::new(month, year)?;
        Ok(self.store.period_status(period))
    }

    /// The stored record of a month, if it was ever closed.
    #[must_use]
    pub fn find_period(&self, period: AccountingPeriod) -> Option<PeriodState> {
        self.store.periods().get(&period).map(|record| record.value().clone())
    }

    /// Every recorded month, oldest first.
    #[must_use]
    pub fn list_periods(&self) -> Vec<PeriodState> {
        let mut periods: Vec<PeriodState> = self
            .store
            .periods()
            .iter()
            .map(|record| record.value().clone())
            .collect();
        periods.sort_by_key(|record| record.period);
        periods
    }

    fn record(&self, action: &ClosureAction) {
        if action.is_noop() {
            info!(
                period = %action.period,
                operation = %action.operation,
                status = %action.new_status,
                "Period already in requested status"
            );
            return;
        }

        self.store
            .periods()
            .entry(action.period)
            .or_insert_with(|| PeriodState::open(action.period))
            .apply(action);

        let mut restamped = 0usize;
        for mut entry in self.store.entries().iter_mut() {
            if entry.period() == action.period {
                entry.month_status = action.new_status;
                restamped += 1;
            }
        }

        info!(
            period = %action.period,
            from = %action.previous_status,
            to = %action.new_status,
            acted_by = %action.acted_by,
            entries = restamped,
            "Accounting period status changed"
        );
    }
}

fn log_denied(actor: Actor, period: AccountingPeriod, err: &ClosureError) {
    warn!(
        user_id = %actor.user_id,
        role = %actor.role,
        %period,
        code = err.error_code(),
        "Period transition denied"
    );
}
