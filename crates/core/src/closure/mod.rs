//! Monthly accounting closure.
//!
//! A period is a `(month, year)` pair, OPEN until someone closes it. While
//! CLOSED, entries of that month can only be created, edited or deleted by
//! the role that bypasses the lock, which is also the only role allowed to
//! reopen it.
//!
//! The guard is a point-in-time check against the persisted status. Nothing
//! serializes a close against a concurrent entry edit.

pub mod error;
pub mod guard;
pub mod types;

#[cfg(test)]
mod guard_props;

pub use error::ClosureError;
pub use guard::ClosureGuard;
pub use types::{
    AccountingPeriod, ClosureAction, MAX_YEAR, MIN_YEAR, MonthStatus, PeriodOperation, PeriodState,
};
