//! Property-based tests for the closure guard.

use proptest::prelude::*;
use obra_shared::types::UserId;
use uuid::Uuid;

use super::error::ClosureError;
use super::guard::ClosureGuard;
use super::types::{AccountingPeriod, MonthStatus, PeriodOperation, PeriodState};
use crate::auth::UserRole;

fn any_role() -> impl Strategy<Value = UserRole> {
    prop::sample::select(UserRole::ALL.to_vec())
}

fn non_override_role() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::Administration),
        Just(UserRole::Accounting),
        Just(UserRole::WorkManager),
        Just(UserRole::Viewer),
    ]
}

fn any_status() -> impl Strategy<Value = MonthStatus> {
    prop_oneof![Just(MonthStatus::Open), Just(MonthStatus::Closed)]
}

fn any_period() -> impl Strategy<Value = AccountingPeriod> {
    (1u32..=12, 2000i32..=2100).prop_map(|(month, year)| {
        AccountingPeriod::new(month, year).expect("strategy yields valid periods")
    })
}

fn any_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|bits| UserId::from_uuid(Uuid::from_u128(bits)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Open months accept mutations from every role.
    #[test]
    fn prop_open_allows_every_role(role in any_role()) {
        prop_assert!(ClosureGuard::can_mutate(MonthStatus::Open, role));
    }

    /// Closed months accept mutations from direction only.
    #[test]
    fn prop_closed_allows_only_override(role in any_role(), period in any_period()) {
        let allowed = ClosureGuard::can_mutate(MonthStatus::Closed, role);
        prop_assert_eq!(allowed, role == UserRole::Direction);

        let checked = ClosureGuard::ensure_can_mutate(period, MonthStatus::Closed, role);
        if allowed {
            prop_assert!(checked.is_ok());
        } else {
            prop_assert_eq!(checked, Err(ClosureError::PeriodLocked { period, role }));
        }
    }

    /// Closing twice leaves the month closed, without error.
    #[test]
    fn prop_close_idempotent(
        period in any_period(),
        start in any_status(),
        role in prop_oneof![Just(UserRole::Direction), Just(UserRole::Administration)],
        user in any_user(),
    ) {
        let mut state = PeriodState { status: start, ..PeriodState::open(period) };

        let first = ClosureGuard::close(period, state.status, role, user).unwrap();
        state.apply(&first);
        let second = ClosureGuard::close(period, state.status, role, user).unwrap();
        state.apply(&second);

        prop_assert_eq!(state.status, MonthStatus::Closed);
        prop_assert!(second.is_noop());
    }

    /// Reopen is denied to every role but direction, whatever the status.
    #[test]
    fn prop_reopen_only_direction(
        period in any_period(),
        status in any_status(),
        role in non_override_role(),
        user in any_user(),
    ) {
        let result = ClosureGuard::reopen(period, status, role, user);
        prop_assert_eq!(
            result,
            Err(ClosureError::InsufficientRole { role, operation: PeriodOperation::Reopen, period })
        );
    }

    /// Close then reopen cycles back to open; neither state is terminal.
    #[test]
    fn prop_close_reopen_cycle(period in any_period(), cycles in 1usize..5, user in any_user()) {
        let mut state = PeriodState::open(period);
        for _ in 0..cycles {
            let close = ClosureGuard::close(period, state.status, UserRole::Administration, user).unwrap();
            state.apply(&close);
            prop_assert_eq!(state.status, MonthStatus::Closed);

            let reopen = ClosureGuard::reopen(period, state.status, UserRole::Direction, user).unwrap();
            state.apply(&reopen);
            prop_assert_eq!(state.status, MonthStatus::Open);
        }
        prop_assert_eq!(state.reopened_by, Some(user));
    }
}
