//! The bundled demo script replays to the documented outcome.

use obra_cli::replay::{OutcomeStatus, Replay, parse_operations};
use obra_core::closure::MonthStatus;
use obra_store::Store;
use rust_decimal_macros::dec;

const DEMO: &str = include_str!("../../../demos/march_closure.json");

#[test]
fn test_demo_script() {
    let operations = parse_operations(DEMO).unwrap();
    let report = Replay::new(&Store::default()).run(operations);

    let statuses: Vec<OutcomeStatus> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            OutcomeStatus::Ok,
            OutcomeStatus::Ok,
            OutcomeStatus::Ok,
            OutcomeStatus::Ok,
            OutcomeStatus::Denied,
            OutcomeStatus::Ok,
            OutcomeStatus::Denied,
            OutcomeStatus::Ok,
            OutcomeStatus::Ok,
        ]
    );

    let placeholder = report.outcomes[1].result.as_ref().unwrap();
    assert_eq!(placeholder["document_type"], "VAL");
    assert_eq!(placeholder["document_number"], "VAL-00000001");

    let march = &report.periods[0];
    assert_eq!(march.status, MonthStatus::Open);
    assert_eq!(march.income_count, 1);
    assert_eq!(march.expense_count, 1);
    assert_eq!(march.totals[0].net, dec!(24000.00));
    assert_eq!(march.totals[0].perceptions, dec!(135.00));
}
