//! Closure guard errors.
//!
//! Both user-facing kinds are expected, recoverable conditions. Callers
//! render `remediation()` next to the message.

use thiserror::Error;

use super::types::{AccountingPeriod, PeriodOperation};
use crate::auth::UserRole;

/// Errors raised by the monthly closure guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClosureError {
    /// The acting role lacks the privilege for the requested operation.
    #[error("Role {role} is not allowed to {operation} accounting period {period}")]
    InsufficientRole {
        /// The acting role.
        role: UserRole,
        /// What was attempted.
        operation: PeriodOperation,
        /// The period involved.
        period: AccountingPeriod,
    },

    /// The period is closed and the acting role cannot bypass the lock.
    #[error("Accounting period {period} is closed")]
    PeriodLocked {
        /// The closed period.
        period: AccountingPeriod,
        /// The acting role.
        role: UserRole,
    },

    /// Month or year out of range.
    #[error("Invalid accounting period: month {month}, year {year}")]
    InvalidPeriod {
        /// Requested month.
        month: u32,
        /// Requested year.
        year: i32,
    },
}

impl ClosureError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::PeriodLocked { .. } => "PERIOD_LOCKED",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InsufficientRole { .. } => 403,
            Self::PeriodLocked { .. } => 423,
            Self::InvalidPeriod { .. } => 400,
        }
    }

    /// What the user can do about it.
    #[must_use]
    pub const fn remediation(&self) -> &'static str {
        match self {
            Self::InsufficientRole {
                operation: PeriodOperation::Reopen,
                ..
            } => "Only the direction role may reopen a closed month.",
            Self::InsufficientRole {
                operation: PeriodOperation::Close,
                ..
            } => "Only the direction or administration roles may close a month.",
            Self::InsufficientRole {
                operation: PeriodOperation::Mutate,
                ..
            } => "Your role has read-only access to the ledger.",
            Self::InsufficientRole {
                operation: PeriodOperation::ManualEntry,
                ..
            } => "Only the direction, administration or accounting roles may record manual entries.",
            Self::PeriodLocked { .. } => {
                "Only the direction role may edit a closed month. Ask direction to make the change or reopen the month."
            }
            Self::InvalidPeriod { .. } => "Months go from 1 to 12.",
        }
    }
}
