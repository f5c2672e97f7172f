//! Monthly closure end to end: close, locked edits, override, reopen.

use chrono::NaiveDate;
use obra_core::auth::{Actor, UserRole};
use obra_core::closure::{ClosureError, MonthStatus, PeriodOperation};
use obra_core::ledger::{EntryPatch, EntryType, LedgerError, NewExpense, NewManualEntry};
use obra_core::tax::{DocumentType, FiscalCondition};
use obra_shared::types::{AccountingEntryId, PageRequest, UserId};
use obra_store::{EntryRepository, ExpenseRepository, PeriodRepository, Store};
use rust_decimal_macros::dec;

struct Fixture {
    entries: EntryRepository,
    expenses: ExpenseRepository,
    periods: PeriodRepository,
}

impl Fixture {
    fn new() -> Self {
        let store = Store::default();
        Self {
            entries: EntryRepository::new(store.clone()),
            expenses: ExpenseRepository::new(store.clone()),
            periods: PeriodRepository::new(store),
        }
    }

    /// Two entries in March 2024 and one in April, all recorded while open.
    fn seed_march(&self) -> (AccountingEntryId, AccountingEntryId, AccountingEntryId) {
        let accounting = actor(UserRole::Accounting);
        let manual = self
            .entries
            .create_manual(manual_entry(date(2024, 3, 5)), accounting)
            .unwrap();
        let expense = self
            .expenses
            .submit(
                NewExpense {
                    work_id: None,
                    supplier_id: None,
                    supplier_fiscal_condition: Some(FiscalCondition::Ri),
                    description: "Hierro del 8".to_string(),
                    amount: dec!(1000),
                    currency: None,
                    date: date(2024, 3, 20),
                    document_type: Some(DocumentType::InvoiceA),
                    document_number: Some("0001-00000042".to_string()),
                },
                actor(UserRole::WorkManager),
            )
            .unwrap();
        let april = self
            .entries
            .create_manual(manual_entry(date(2024, 4, 2)), accounting)
            .unwrap();
        (manual.id, expense.entry_id, april.id)
    }
}

fn actor(role: UserRole) -> Actor {
    Actor::new(UserId::new(), role)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn manual_entry(date: NaiveDate) -> NewManualEntry {
    NewManualEntry {
        entry_type: EntryType::Expense,
        amount: dec!(250.00),
        currency: None,
        date,
        description: "Flete".to_string(),
        work_id: None,
        supplier_id: None,
    }
}

fn amount_patch() -> EntryPatch {
    EntryPatch {
        amount: Some(dec!(300.00)),
        ..EntryPatch::default()
    }
}

#[test]
fn test_close_stamps_every_entry_of_the_period() {
    let fx = Fixture::new();
    let (manual, from_expense, april) = fx.seed_march();

    let action = fx
        .periods
        .close_month(3, 2024, actor(UserRole::Administration))
        .unwrap();
    assert_eq!(action.previous_status, MonthStatus::Open);
    assert_eq!(action.new_status, MonthStatus::Closed);

    for id in [manual, from_expense] {
        assert_eq!(
            fx.entries.find_by_id(id).unwrap().month_status,
            MonthStatus::Closed
        );
    }
    assert_eq!(
        fx.entries.find_by_id(april).unwrap().month_status,
        MonthStatus::Open
    );

    let page = fx
        .entries
        .list_for_period(3, 2024, PageRequest::default())
        .unwrap();
    assert_eq!(page.meta.total, 2);
    assert!(page.data.iter().all(|e| e.month_status == MonthStatus::Closed));
}

#[test]
fn test_closed_period_rejects_non_override_edits() {
    let fx = Fixture::new();
    let (manual, from_expense, _) = fx.seed_march();
    fx.periods
        .close_month(3, 2024, actor(UserRole::Direction))
        .unwrap();

    for role in [
        UserRole::Administration,
        UserRole::Accounting,
        UserRole::WorkManager,
    ] {
        let err = fx
            .entries
            .update(manual, amount_patch(), actor(role))
            .unwrap_err();
        assert!(err.is_period_locked(), "{role} should hit the period lock");
        assert_eq!(err.status_code(), 423);

        let err = fx.entries.delete(from_expense, actor(role)).unwrap_err();
        assert!(err.is_period_locked());
    }

    let err = fx
        .entries
        .create_manual(manual_entry(date(2024, 3, 28)), actor(UserRole::Accounting))
        .unwrap_err();
    assert!(err.is_period_locked());

    assert_eq!(fx.entries.find_by_id(manual).unwrap().amount.amount, dec!(250.00));
}

#[test]
fn test_override_role_edits_closed_period() {
    let fx = Fixture::new();
    let (manual, from_expense, _) = fx.seed_march();
    fx.periods
        .close_month(3, 2024, actor(UserRole::Administration))
        .unwrap();

    let direction = actor(UserRole::Direction);
    let updated = fx.entries.update(manual, amount_patch(), direction).unwrap();
    assert_eq!(updated.amount.amount, dec!(300.00));
    assert_eq!(updated.month_status, MonthStatus::Closed);

    let created = fx
        .entries
        .create_manual(manual_entry(date(2024, 3, 30)), direction)
        .unwrap();
    assert_eq!(created.month_status, MonthStatus::Closed);

    fx.entries.delete(from_expense, direction).unwrap();
    assert!(matches!(
        fx.entries.find_by_id(from_expense),
        Err(LedgerError::EntryNotFound(_))
    ));
}

#[test]
fn test_moving_an_entry_into_a_closed_period_is_locked() {
    let fx = Fixture::new();
    let (_, _, april) = fx.seed_march();
    fx.periods
        .close_month(3, 2024, actor(UserRole::Administration))
        .unwrap();

    let patch = EntryPatch {
        date: Some(date(2024, 3, 31)),
        ..EntryPatch::default()
    };
    let err = fx
        .entries
        .update(april, patch.clone(), actor(UserRole::Accounting))
        .unwrap_err();
    assert!(err.is_period_locked());

    let moved = fx
        .entries
        .update(april, patch, actor(UserRole::Direction))
        .unwrap();
    assert_eq!((moved.month, moved.year), (3, 2024));
    assert_eq!(moved.month_status, MonthStatus::Closed);
}

#[test]
fn test_reopen_restores_edits() {
    let fx = Fixture::new();
    let (manual, _, _) = fx.seed_march();
    fx.periods
        .close_month(3, 2024, actor(UserRole::Administration))
        .unwrap();

    let err = fx
        .periods
        .reopen_month(3, 2024, actor(UserRole::Administration))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Closure(ClosureError::InsufficientRole {
            operation: PeriodOperation::Reopen,
            ..
        })
    ));
    assert_eq!(fx.periods.status(3, 2024).unwrap(), MonthStatus::Closed);

    let direction = actor(UserRole::Direction);
    let action = fx.periods.reopen_month(3, 2024, direction).unwrap();
    assert_eq!(action.new_status, MonthStatus::Open);

    let entry = fx
        .entries
        .update(manual, amount_patch(), actor(UserRole::WorkManager))
        .unwrap();
    assert_eq!(entry.month_status, MonthStatus::Open);
    assert_eq!(entry.amount.amount, dec!(300.00));

    let record = fx.periods.list_periods().pop().unwrap();
    assert_eq!(record.reopened_by, Some(direction.user_id));
}

#[test]
fn test_close_twice_is_idempotent() {
    let fx = Fixture::new();
    fx.seed_march();
    let admin = actor(UserRole::Administration);

    fx.periods.close_month(3, 2024, admin).unwrap();
    let second = fx.periods.close_month(3, 2024, admin).unwrap();

    assert!(second.is_noop());
    assert_eq!(fx.periods.status(3, 2024).unwrap(), MonthStatus::Closed);
    assert_eq!(fx.periods.list_periods().len(), 1);
}

#[test]
fn test_viewer_cannot_edit_even_when_open() {
    let fx = Fixture::new();
    let (manual, _, _) = fx.seed_march();

    let err = fx
        .entries
        .update(manual, amount_patch(), actor(UserRole::Viewer))
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_ROLE");
    assert_eq!(err.status_code(), 403);
}

#[test]
fn test_role_denials_share_one_shape() {
    let fx = Fixture::new();
    let (manual, _, _) = fx.seed_march();

    let manual_err = fx
        .entries
        .create_manual(manual_entry(date(2024, 3, 9)), actor(UserRole::WorkManager))
        .unwrap_err();
    let edit_err = fx
        .entries
        .delete(manual, actor(UserRole::Viewer))
        .unwrap_err();

    for (err, expected) in [
        (manual_err, PeriodOperation::ManualEntry),
        (edit_err, PeriodOperation::Mutate),
    ] {
        match err {
            LedgerError::Closure(ClosureError::InsufficientRole {
                operation, period, ..
            }) => {
                assert_eq!(operation, expected);
                assert_eq!(period.to_string(), "03/2024");
            }
            other => panic!("expected InsufficientRole, got {other:?}"),
        }
    }
}

#[test]
fn test_summary_reports_status_and_totals() {
    let fx = Fixture::new();
    fx.seed_march();
    fx.periods
        .close_month(3, 2024, actor(UserRole::Direction))
        .unwrap();

    let summary = fx.entries.summary(3, 2024).unwrap();
    assert_eq!(summary.status, MonthStatus::Closed);
    assert_eq!(summary.expense_count, 2);
    let ars = &summary.totals[0];
    assert_eq!(ars.expense, dec!(1250.00));
    assert_eq!(ars.net, dec!(-1250.00));
    assert_eq!(ars.perceptions, dec!(135.00));
}
