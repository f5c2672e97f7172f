//! Accounting period types.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use obra_shared::types::UserId;
use serde::{Deserialize, Serialize};

use super::error::ClosureError;

/// Earliest accepted year.
pub const MIN_YEAR: i32 = 1900;
/// Latest accepted year.
pub const MAX_YEAR: i32 = 9999;

/// A calendar month of the ledger, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct AccountingPeriod {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPeriod> for AccountingPeriod {
    type Error = ClosureError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.month, raw.year)
    }
}

impl AccountingPeriod {
    /// Creates a period, rejecting months outside 1..=12 and absurd years.
    pub fn new(month: u32, year: i32) -> Result<Self, ClosureError> {
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ClosureError::InvalidPeriod { month, year });
        }
        Ok(Self { year, month })
    }

    /// The period a date falls into.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month number, 1-12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns true if the date falls within this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for AccountingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Closure status of a month, denormalized onto every entry as `month_status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MonthStatus {
    /// Entries may be mutated by any role with write access.
    #[default]
    Open,
    /// Only the lock-bypassing role may mutate entries.
    Closed,
}

impl MonthStatus {
    /// Returns true if the month is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if the month is closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Lowercase wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::str::FromStr for MonthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "abierto" => Ok(Self::Open),
            "closed" | "cerrado" => Ok(Self::Closed),
            _ => Err(format!("Unknown month status: {s}")),
        }
    }
}

impl TryFrom<String> for MonthStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for MonthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation attempted against a period or one of its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodOperation {
    /// Close the month.
    Close,
    /// Reopen the month.
    Reopen,
    /// Create, edit or delete an entry of the month.
    Mutate,
    /// Record an entry by hand in the month.
    #[serde(rename = "manual_entry")]
    ManualEntry,
}

impl std::fmt::Display for PeriodOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Close => write!(f, "close"),
            Self::Reopen => write!(f, "reopen"),
            Self::Mutate => write!(f, "modify entries of"),
            Self::ManualEntry => write!(f, "record manual entries in"),
        }
    }
}

/// Outcome of a successful close or reopen, with audit information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosureAction {
    /// The period acted on.
    pub period: AccountingPeriod,
    /// Which transition was requested.
    pub operation: PeriodOperation,
    /// Status before the call.
    pub previous_status: MonthStatus,
    /// Status after the call.
    pub new_status: MonthStatus,
    /// The user who performed the action.
    pub acted_by: UserId,
    /// When the action was performed.
    pub acted_at: DateTime<Utc>,
}

impl ClosureAction {
    /// Returns true when the period already was in the target status.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.previous_status == self.new_status
    }
}

/// Persisted record of a period's closure status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodState {
    /// The period.
    pub period: AccountingPeriod,
    /// Current status.
    pub status: MonthStatus,
    /// Who last closed the period.
    pub closed_by: Option<UserId>,
    /// When the period was last closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who last reopened the period.
    pub reopened_by: Option<UserId>,
    /// When the period was last reopened.
    pub reopened_at: Option<DateTime<Utc>>,
}

impl PeriodState {
    /// State of a period that has never been closed.
    #[must_use]
    pub const fn open(period: AccountingPeriod) -> Self {
        Self {
            period,
            status: MonthStatus::Open,
            closed_by: None,
            closed_at: None,
            reopened_by: None,
            reopened_at: None,
        }
    }

    /// Records a transition. No-op actions leave the audit fields untouched.
    pub fn apply(&mut self, action: &ClosureAction) {
        if action.is_noop() {
            return;
        }
        self.status = action.new_status;
        match action.operation {
            PeriodOperation::Close => {
                self.closed_by = Some(action.acted_by);
                self.closed_at = Some(action.acted_at);
            }
            PeriodOperation::Reopen => {
                self.reopened_by = Some(action.acted_by);
                self.reopened_at = Some(action.acted_at);
            }
            PeriodOperation::Mutate | PeriodOperation::ManualEntry => {}
        }
    }
}
