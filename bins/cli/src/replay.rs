//! Replays a JSON script of ledger operations against an in-memory store.
//!
//! Denied and rejected operations are reported and the script continues.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use obra_core::auth::{Actor, UserRole};
use obra_core::closure::AccountingPeriod;
use obra_core::ledger::{
    EntryPatch, LedgerError, NewExpense, NewIncome, NewManualEntry, PeriodSummary,
};
use obra_shared::AppError;
use obra_shared::types::{AccountingEntryId, UserId};
use obra_store::{EntryRepository, ExpenseRepository, IncomeRepository, PeriodRepository, Store};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One step of a replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Submit an expense.
    SubmitExpense {
        /// Acting role, canonical or Spanish name.
        role: String,
        /// Name later steps use to refer to the generated entry.
        #[serde(default)]
        label: Option<String>,
        /// The expense.
        input: NewExpense,
    },
    /// Record an income.
    SubmitIncome {
        /// Acting role.
        role: String,
        /// Name for the generated entry.
        #[serde(default)]
        label: Option<String>,
        /// The income.
        input: NewIncome,
    },
    /// Record a manual entry.
    ManualEntry {
        /// Acting role.
        role: String,
        /// Name for the entry.
        #[serde(default)]
        label: Option<String>,
        /// The entry.
        input: NewManualEntry,
    },
    /// Edit an entry.
    UpdateEntry {
        /// Acting role.
        role: String,
        /// Label or entry ID.
        target: String,
        /// Fields to change.
        patch: EntryPatch,
    },
    /// Delete an entry.
    DeleteEntry {
        /// Acting role.
        role: String,
        /// Label or entry ID.
        target: String,
    },
    /// Close a month.
    CloseMonth {
        /// Acting role.
        role: String,
        /// Month, 1-12.
        month: u32,
        /// Year.
        year: i32,
    },
    /// Reopen a month.
    ReopenMonth {
        /// Acting role.
        role: String,
        /// Month, 1-12.
        month: u32,
        /// Year.
        year: i32,
    },
}

impl Operation {
    /// Short name used in reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitExpense { .. } => "submit_expense",
            Self::SubmitIncome { .. } => "submit_income",
            Self::ManualEntry { .. } => "manual_entry",
            Self::UpdateEntry { .. } => "update_entry",
            Self::DeleteEntry { .. } => "delete_entry",
            Self::CloseMonth { .. } => "close_month",
            Self::ReopenMonth { .. } => "reopen_month",
        }
    }
}

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Applied.
    Ok,
    /// Refused for lack of privilege or because the month is closed.
    Denied,
    /// Invalid input or unknown target.
    Rejected,
}

/// Result of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Position in the script, from zero.
    pub index: usize,
    /// Operation name.
    pub op: &'static str,
    /// How it ended.
    pub status: OutcomeStatus,
    /// Error code, when not applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// Error message, when not applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The stored record, when applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// One outcome per operation, in order.
    pub outcomes: Vec<Outcome>,
    /// Summaries of every month the script touched, oldest first.
    pub periods: Vec<PeriodSummary>,
}

struct Failure {
    status: OutcomeStatus,
    code: &'static str,
    message: String,
}

impl From<LedgerError> for Failure {
    fn from(err: LedgerError) -> Self {
        let code = err.error_code();
        let message = err.to_string();
        let status = if AppError::from(err).is_denial() {
            OutcomeStatus::Denied
        } else {
            OutcomeStatus::Rejected
        };
        Self {
            status,
            code,
            message,
        }
    }
}

impl Failure {
    fn rejected(code: &'static str, message: String) -> Self {
        Self {
            status: OutcomeStatus::Rejected,
            code,
            message,
        }
    }
}

/// Parses a replay script: a JSON array of operations.
///
/// # Errors
///
/// Malformed JSON or an unknown operation.
pub fn parse_operations(json: &str) -> Result<Vec<Operation>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Applies operations in order against one store.
pub struct Replay {
    entries: EntryRepository,
    expenses: ExpenseRepository,
    incomes: IncomeRepository,
    periods: PeriodRepository,
    labels: HashMap<String, AccountingEntryId>,
    users: HashMap<UserRole, UserId>,
    touched: BTreeSet<AccountingPeriod>,
}

impl Replay {
    /// Creates a replay over `store`.
    #[must_use]
    pub fn new(store: &Store) -> Self {
        Self {
            entries: EntryRepository::new(store.clone()),
            expenses: ExpenseRepository::new(store.clone()),
            incomes: IncomeRepository::new(store.clone()),
            periods: PeriodRepository::new(store.clone()),
            labels: HashMap::new(),
            users: HashMap::new(),
            touched: BTreeSet::new(),
        }
    }

    /// Runs the whole script and summarizes the months it touched.
    #[must_use]
    pub fn run(mut self, operations: Vec<Operation>) -> ReplayReport {
        let outcomes = operations
            .into_iter()
            .enumerate()
            .map(|(index, operation)| self.apply(index, operation))
            .collect();

        let periods = self
            .touched
            .iter()
            .filter_map(|period| self.entries.summary(period.month(), period.year()).ok())
            .collect();

        ReplayReport { outcomes, periods }
    }

    /// Applies one operation.
    pub fn apply(&mut self, index: usize, operation: Operation) -> Outcome {
        let op = operation.name();
        let outcome = match self.dispatch(operation) {
            Ok(result) => Outcome {
                index,
                op,
                status: OutcomeStatus::Ok,
                code: None,
                message: None,
                result: Some(result),
            },
            Err(failure) => Outcome {
                index,
                op,
                status: failure.status,
                code: Some(failure.code),
                message: Some(failure.message),
                result: None,
            },
        };
        debug!(index, op, status = ?outcome.status, "Replay step applied");
        outcome
    }

    fn dispatch(&mut self, operation: Operation) -> Result<Value, Failure> {
        match operation {
            Operation::SubmitExpense { role, label, input } => {
                let actor = self.actor(&role)?;
                self.touch_date(input.date);
                let expense = self.expenses.submit(input, actor)?;
                self.remember(label, expense.entry_id);
                to_value(&expense)
            }
            Operation::SubmitIncome { role, label, input } => {
                let actor = self.actor(&role)?;
                self.touch_date(input.date);
                let income = self.incomes.submit(input, actor)?;
                self.remember(label, income.entry_id);
                to_value(&income)
            }
            Operation::ManualEntry { role, label, input } => {
                let actor = self.actor(&role)?;
                self.touch_date(input.date);
                let entry = self.entries.create_manual(input, actor)?;
                self.remember(label, entry.id);
                to_value(&entry)
            }
            Operation::UpdateEntry {
                role,
                target,
                patch,
            } => {
                let actor = self.actor(&role)?;
                let id = self.resolve(&target)?;
                if let Some(date) = patch.date {
                    self.touch_date(date);
                }
                let entry = self.entries.update(id, patch, actor)?;
                to_value(&entry)
            }
            Operation::DeleteEntry { role, target } => {
                let actor = self.actor(&role)?;
                let id = self.resolve(&target)?;
                let entry = self.entries.delete(id, actor)?;
                to_value(&entry)
            }
            Operation::CloseMonth { role, month, year } => {
                let actor = self.actor(&role)?;
                let action = self.periods.close_month(month, year, actor)?;
                self.touched.insert(action.period);
                to_value(&action)
            }
            Operation::ReopenMonth { role, month, year } => {
                let actor = self.actor(&role)?;
                let action = self.periods.reopen_month(month, year, actor)?;
                self.touched.insert(action.period);
                to_value(&action)
            }
        }
    }

    /// One stable user per role, so audit fields are comparable across steps.
    fn actor(&mut self, role: &str) -> Result<Actor, Failure> {
        let role = UserRole::from_str(role).map_err(|msg| Failure::rejected("INVALID_ROLE", msg))?;
        let user_id = *self.users.entry(role).or_default();
        Ok(Actor::new(user_id, role))
    }

    fn resolve(&self, target: &str) -> Result<AccountingEntryId, Failure> {
        if let Some(id) = self.labels.get(target) {
            return Ok(*id);
        }
        AccountingEntryId::from_str(target).map_err(|_| {
            Failure::rejected("UNKNOWN_TARGET", format!("No entry labelled {target}"))
        })
    }

    fn remember(&mut self, label: Option<String>, id: AccountingEntryId) {
        if let Some(label) = label {
            self.labels.insert(label, id);
        }
    }

    fn touch_date(&mut self, date: chrono::NaiveDate) {
        self.touched.insert(AccountingPeriod::from_date(date));
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, Failure> {
    serde_json::to_value(value)
        .map_err(|err| Failure::rejected("SERIALIZATION_ERROR", err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use obra_core::closure::MonthStatus;
    use rust_decimal_macros::dec;

    const SCRIPT: &str = r#"[
        {"op": "manual_entry", "role": "contable", "label": "flete",
         "input": {"tipo": "egreso", "monto": "250.00", "fecha": "2024-03-05", "descripcion": "Flete"}},
        {"op": "submit_expense", "role": "jefe_obra", "label": "hierro",
         "input": {"descripcion": "Hierro", "monto": "1000", "fecha": "2024-03-20",
                   "condicion_fiscal": "RI", "tipo_comprobante": "A", "numero_comprobante": "0001-42"}},
        {"op": "close_month", "role": "administracion", "month": 3, "year": 2024},
        {"op": "update_entry", "role": "contable", "target": "flete", "patch": {"monto": "300"}},
        {"op": "update_entry", "role": "direccion", "target": "flete", "patch": {"monto": "300"}},
        {"op": "reopen_month", "role": "administracion", "month": 3, "year": 2024},
        {"op": "delete_entry", "role": "viewer", "target": "hierro"},
        {"op": "delete_entry", "role": "contable", "target": "nope"}
    ]"#;

    #[test]
    fn test_replay_reports_each_step() {
        let operations = parse_operations(SCRIPT).unwrap();
        let report = Replay::new(&Store::default()).run(operations);

        let statuses: Vec<OutcomeStatus> = report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                OutcomeStatus::Ok,
                OutcomeStatus::Ok,
                OutcomeStatus::Ok,
                OutcomeStatus::Denied,
                OutcomeStatus::Ok,
                OutcomeStatus::Denied,
                OutcomeStatus::Denied,
                OutcomeStatus::Rejected,
            ]
        );
        assert_eq!(report.outcomes[3].code, Some("PERIOD_LOCKED"));
        assert_eq!(report.outcomes[5].code, Some("INSUFFICIENT_ROLE"));
        assert_eq!(report.outcomes[7].code, Some("UNKNOWN_TARGET"));

        let expense = report.outcomes[1].result.as_ref().unwrap();
        assert_eq!(expense["vat_perception"], "100.00");
        assert_eq!(expense["iibb_perception"], "35.00");

        assert_eq!(report.periods.len(), 1);
        let march = &report.periods[0];
        assert_eq!(march.status, MonthStatus::Closed);
        assert_eq!(march.totals[0].expense, dec!(1300));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let operations = parse_operations(
            r#"[{"op": "close_month", "role": "root", "month": 3, "year": 2024}]"#,
        )
        .unwrap();
        let report = Replay::new(&Store::default()).run(operations);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Rejected);
        assert_eq!(report.outcomes[0].code, Some("INVALID_ROLE"));
        assert!(report.periods.is_empty());
    }

    #[test]
    fn test_validation_failures_are_rejected_not_denied() {
        let operations = parse_operations(
            r#"[
            {"op": "submit_income", "role": "administracion",
             "input": {"descripcion": "Anticipo", "monto": "0", "fecha": "2024-03-01"}},
            {"op": "submit_income", "role": "administracion",
             "input": {"descripcion": "Anticipo", "monto": "500", "fecha": "1850-03-01"}},
            {"op": "manual_entry", "role": "jefe_obra",
             "input": {"tipo": "ingreso", "monto": "500", "fecha": "2024-03-01", "descripcion": "Ajuste"}}
        ]"#,
        )
        .unwrap();
        let report = Replay::new(&Store::default()).run(operations);

        assert_eq!(report.outcomes[0].status, OutcomeStatus::Rejected);
        assert_eq!(report.outcomes[0].code, Some("ZERO_AMOUNT"));
        assert_eq!(report.outcomes[1].status, OutcomeStatus::Rejected);
        assert_eq!(report.outcomes[1].code, Some("DATE_OUT_OF_RANGE"));
        assert_eq!(report.outcomes[2].status, OutcomeStatus::Denied);
        assert_eq!(report.outcomes[2].code, Some("INSUFFICIENT_ROLE"));
    }

    #[test]
    fn test_malformed_script() {
        assert!(parse_operations(r#"[{"op": "launch"}]"#).is_err());
    }
}
