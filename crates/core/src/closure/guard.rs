//! Closure guard: close/reopen transitions and the entry mutation gate.

use chrono::Utc;
use obra_shared::types::UserId;

use super::error::ClosureError;
use super::types::{AccountingPeriod, ClosureAction, MonthStatus, PeriodOperation};
use crate::auth::UserRole;

/// Stateless guard over a period's closure status.
///
/// Callers read the current status from storage, ask the guard, and persist
/// the returned `ClosureAction`.
pub struct ClosureGuard;

impl ClosureGuard {
    /// Close a month.
    ///
    /// Closing an already closed month succeeds as a no-op so retries are safe.
    ///
    /// # Errors
    ///
    /// `ClosureError::InsufficientRole` unless the role can close periods.
    pub fn close(
        period: AccountingPeriod,
        current_status: MonthStatus,
        role: UserRole,
        acted_by: UserId,
    ) -> Result<ClosureAction, ClosureError> {
        if !role.can_close_periods() {
            return Err(ClosureError::InsufficientRole {
                role,
                operation: PeriodOperation::Close,
                period,
            });
        }

        Ok(ClosureAction {
            period,
            operation: PeriodOperation::Close,
            previous_status: current_status,
            new_status: MonthStatus::Closed,
            acted_by,
            acted_at: Utc::now(),
        })
    }

    /// Reopen a month.
    ///
    /// Reopening a month that is already open is a no-op.
    ///
    /// # Errors
    ///
    /// `ClosureError::InsufficientRole` unless the role can reopen periods.
    pub fn reopen(
        period: AccountingPeriod,
        current_status: MonthStatus,
        role: UserRole,
        acted_by: UserId,
    ) -> Result<ClosureAction, ClosureError> {
        if !role.can_reopen_periods() {
            return Err(ClosureError::InsufficientRole {
                role,
                operation: PeriodOperation::Reopen,
                period,
            });
        }

        Ok(ClosureAction {
            period,
            operation: PeriodOperation::Reopen,
            previous_status: current_status,
            new_status: MonthStatus::Open,
            acted_by,
            acted_at: Utc::now(),
        })
    }

    /// Returns true if an entry carrying `month_status` may be created,
    /// updated or deleted by `role`.
    #[must_use]
    pub const fn can_mutate(month_status: MonthStatus, role: UserRole) -> bool {
        month_status.is_open() || role.bypasses_period_lock()
    }

    /// Fails with `PeriodLocked` where `can_mutate` is false.
    ///
    /// # Errors
    ///
    /// `ClosureError::PeriodLocked` when the period is closed for this role.
    pub fn ensure_can_mutate(
        period: AccountingPeriod,
        month_status: MonthStatus,
        role: UserRole,
    ) -> Result<(), ClosureError> {
        if Self::can_mutate(month_status, role) {
            Ok(())
        } else {
            Err(ClosureError::PeriodLocked { period, role })
        }
    }
}
