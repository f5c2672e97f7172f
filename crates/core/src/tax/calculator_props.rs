//! Property-based tests for the perception/withholding evaluator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::{IIBB_PERCEPTION_RATE, VAT_PERCEPTION_RATE, calculate_taxes, explain_rules};
use super::types::{DocumentType, FiscalCondition};
use obra_shared::types::money::round_half_up;

/// Strategy for positive amounts (0.01 to 100,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for amounts large enough that both perceptions round above zero.
fn material_amount() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn any_condition() -> impl Strategy<Value = FiscalCondition> {
    prop_oneof![
        Just(FiscalCondition::Ri),
        Just(FiscalCondition::Monotributista),
        Just(FiscalCondition::Exempt),
        Just(FiscalCondition::Other),
        Just(FiscalCondition::Unknown),
    ]
}

fn any_document() -> impl Strategy<Value = DocumentType> {
    prop_oneof![
        Just(DocumentType::InvoiceA),
        Just(DocumentType::InvoiceB),
        Just(DocumentType::InvoiceC),
        Just(DocumentType::Receipt),
        Just(DocumentType::Val),
        Just(DocumentType::Unknown),
    ]
}

fn levy_free_document() -> impl Strategy<Value = DocumentType> {
    prop_oneof![
        Just(DocumentType::InvoiceC),
        Just(DocumentType::Receipt),
        Just(DocumentType::Val),
    ]
}

fn perception_subject() -> impl Strategy<Value = FiscalCondition> {
    prop_oneof![Just(FiscalCondition::Ri), Just(FiscalCondition::Other)]
}

fn perception_document() -> impl Strategy<Value = DocumentType> {
    prop_oneof![Just(DocumentType::InvoiceA), Just(DocumentType::InvoiceB)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Missing fiscal condition zero-rates every document.
    #[test]
    fn prop_missing_condition_is_zero(
        amount in positive_amount(),
        document in proptest::option::of(any_document()),
    ) {
        let result = calculate_taxes(amount, None, document);
        prop_assert!(result.is_zero());
        prop_assert!(result.is_auto_calculated);
    }

    /// C invoices, receipts and VAL placeholders never carry levies.
    #[test]
    fn prop_levy_free_documents_are_zero(
        amount in positive_amount(),
        condition in any_condition(),
        document in levy_free_document(),
    ) {
        let result = calculate_taxes(amount, Some(condition), Some(document));
        prop_assert!(result.is_zero());
    }

    /// RI/OTHER on A/B invoices: exact perception formulas, withholdings always zero.
    #[test]
    fn prop_perceptions_formula(
        amount in positive_amount(),
        condition in perception_subject(),
        document in perception_document(),
    ) {
        let result = calculate_taxes(amount, Some(condition), Some(document));
        prop_assert_eq!(result.vat_perception, round_half_up(amount * VAT_PERCEPTION_RATE));
        prop_assert_eq!(result.iibb_perception, round_half_up(amount * IIBB_PERCEPTION_RATE));
        prop_assert_eq!(result.vat_withholding, Decimal::ZERO);
        prop_assert_eq!(result.income_tax_withholding, Decimal::ZERO);
        prop_assert!(result.vat_perception.scale() <= 2);
        prop_assert!(result.iibb_perception.scale() <= 2);
    }

    /// Monotributista and exempt suppliers are zero-rated for any document.
    #[test]
    fn prop_exempt_regimes_are_zero(
        amount in positive_amount(),
        condition in prop_oneof![Just(FiscalCondition::Monotributista), Just(FiscalCondition::Exempt)],
        document in proptest::option::of(any_document()),
    ) {
        let result = calculate_taxes(amount, Some(condition), document);
        prop_assert!(result.is_zero());
    }

    /// Amounts are non-zero only for RI/OTHER on A/B invoices.
    #[test]
    fn prop_nonzero_only_for_perception_pairs(
        amount in material_amount(),
        condition in proptest::option::of(any_condition()),
        document in proptest::option::of(any_document()),
    ) {
        let result = calculate_taxes(amount, condition, document);
        let applies = condition.is_some_and(|c| c.is_perception_subject())
            && document.is_some_and(|d| d.carries_perceptions());
        prop_assert_eq!(!result.is_zero(), applies);
    }

    /// Every amount is non-negative, whatever the sign of the input.
    #[test]
    fn prop_amounts_never_negative(
        cents in -10_000_000_000i64..10_000_000_000i64,
        condition in proptest::option::of(any_condition()),
        document in proptest::option::of(any_document()),
    ) {
        let result = calculate_taxes(Decimal::new(cents, 2), condition, document);
        prop_assert!(!result.vat_perception.is_sign_negative());
        prop_assert!(!result.iibb_perception.is_sign_negative());
        prop_assert!(!result.vat_withholding.is_sign_negative());
        prop_assert!(!result.income_tax_withholding.is_sign_negative());
    }

    /// Same inputs, bit-identical outputs.
    #[test]
    fn prop_idempotent(
        amount in positive_amount(),
        condition in proptest::option::of(any_condition()),
        document in proptest::option::of(any_document()),
    ) {
        let first = calculate_taxes(amount, condition, document);
        let second = calculate_taxes(amount, condition, document);
        prop_assert_eq!(first.vat_perception.serialize(), second.vat_perception.serialize());
        prop_assert_eq!(first.iibb_perception.serialize(), second.iibb_perception.serialize());
        prop_assert_eq!(first, second);
    }

    /// The prose explanation agrees with the computed result.
    #[test]
    fn prop_explanation_matches_calculation(
        amount in material_amount(),
        condition in proptest::option::of(any_condition()),
        document in proptest::option::of(any_document()),
    ) {
        let result = calculate_taxes(amount, condition, document);
        let text = explain_rules(condition, document);
        prop_assert_eq!(text.contains("VAT perception of"), !result.is_zero());
        if condition.is_none() {
            prop_assert!(text.starts_with("No fiscal condition specified"));
        }
        if condition == Some(FiscalCondition::Unknown) && !document.is_some_and(|d| d.is_levy_free()) {
            prop_assert!(text.starts_with("Unknown fiscal condition"));
        }
    }
}
