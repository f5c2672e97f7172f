//! Perception/withholding evaluator.
//!
//! Rules, first match wins:
//! 1. no fiscal condition → zero
//! 2. document C, receipt or VAL → zero
//! 3. RI/OTHER with invoice A/B → VAT perception 10%, IIBB perception 3.5%
//! 4. every other combination → zero
//!
//! Amounts are rounded half-up to cents. A zero or negative amount is never
//! levied, so every result amount is non-negative. The evaluator never fails.

use obra_shared::types::money::round_half_up;
use rust_decimal::Decimal;

use super::types::{DocumentType, FiscalCondition, TaxCalculationResult};

/// VAT perception rate applied on A/B invoices (10%).
pub const VAT_PERCEPTION_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// IIBB perception rate applied on A/B invoices (3.5%).
pub const IIBB_PERCEPTION_RATE: Decimal = Decimal::from_parts(35, 0, 0, false, 3);

/// Rule selected for a (condition, document) pair.
///
/// Both `calculate_taxes` and `explain_rules` go through `resolve_rule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaxRule {
    NoFiscalCondition,
    LevyFreeDocument(DocumentType),
    Perceptions {
        condition: FiscalCondition,
        document: DocumentType,
    },
    DocumentWithoutPerceptions {
        condition: FiscalCondition,
        document: Option<DocumentType>,
    },
    Monotributista,
    Exempt,
    UnknownCondition,
}

fn resolve_rule(condition: Option<FiscalCondition>, document: Option<DocumentType>) -> TaxRule {
    let Some(condition) = condition else {
        return TaxRule::NoFiscalCondition;
    };

    if let Some(document) = document.filter(DocumentType::is_levy_free) {
        return TaxRule::LevyFreeDocument(document);
    }

    match condition {
        FiscalCondition::Ri | FiscalCondition::Other => match document {
            Some(document) if document.carries_perceptions() => {
                TaxRule::Perceptions { condition, document }
            }
            _ => TaxRule::DocumentWithoutPerceptions { condition, document },
        },
        FiscalCondition::Monotributista => TaxRule::Monotributista,
        FiscalCondition::Exempt => TaxRule::Exempt,
        FiscalCondition::Unknown => TaxRule::UnknownCondition,
    }
}

/// Renders a rate as a percentage, e.g. `0.035` → `3.5%`.
fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

impl TaxRule {
    fn summary(&self) -> String {
        match self {
            Self::NoFiscalCondition => "No fiscal condition specified".to_string(),
            Self::LevyFreeDocument(document) => {
                format!("Document type {document} does not require perceptions/withholdings")
            }
            Self::Perceptions { condition, document } => {
                format!("Fiscal condition {condition} with document type {document}: perceptions apply")
            }
            Self::DocumentWithoutPerceptions {
                condition,
                document: Some(document),
            } => format!(
                "Fiscal condition {condition} with document type {document}: no perceptions/withholdings"
            ),
            Self::DocumentWithoutPerceptions {
                condition,
                document: None,
            } => format!(
                "Fiscal condition {condition} without document type: no perceptions/withholdings"
            ),
            Self::Monotributista => {
                "Monotributista suppliers are exempt from perceptions/withholdings".to_string()
            }
            Self::Exempt => {
                "Exempt suppliers are not subject to perceptions/withholdings".to_string()
            }
            Self::UnknownCondition => "Unknown fiscal condition".to_string(),
        }
    }
}

/// Computes the perceptions and withholdings for an expense.
///
/// Pure and total: unknown or missing inputs yield an all-zero result with an
/// explanatory entry in `calculation_rules`.
#[must_use]
pub fn calculate_taxes(
    amount: Decimal,
    fiscal_condition: Option<FiscalCondition>,
    document_type: Option<DocumentType>,
) -> TaxCalculationResult {
    let rule = resolve_rule(fiscal_condition, document_type);
    let mut rules = vec![rule.summary()];

    let result = match rule {
        TaxRule::Perceptions { .. } if amount <= Decimal::ZERO => {
            rules.push(format!("Non-positive amount {amount}: no perceptions calculated"));
            TaxCalculationResult::zero(rules)
        }
        TaxRule::Perceptions { .. } => {
            let vat_perception = round_half_up(amount * VAT_PERCEPTION_RATE);
            let iibb_perception = round_half_up(amount * IIBB_PERCEPTION_RATE);

            rules.push(format!(
                "VAT perception: {} of {amount} = {vat_perception}",
                percent(VAT_PERCEPTION_RATE)
            ));
            rules.push(format!(
                "IIBB perception: {} of {amount} = {iibb_perception}",
                percent(IIBB_PERCEPTION_RATE)
            ));
            rules.push("VAT withholding: not applicable".to_string());
            rules.push("Income tax withholding: not applicable".to_string());

            TaxCalculationResult {
                vat_perception,
                vat_withholding: Decimal::ZERO,
                iibb_perception,
                income_tax_withholding: Decimal::ZERO,
                is_auto_calculated: true,
                calculation_rules: rules,
            }
        }
        _ => TaxCalculationResult::zero(rules),
    };

    tracing::debug!(
        %amount,
        fiscal_condition = ?fiscal_condition,
        document_type = ?document_type,
        vat_perception = %result.vat_perception,
        iibb_perception = %result.iibb_perception,
        "taxes calculated"
    );

    result
}

/// Describes, in prose, what `calculate_taxes` does for the given inputs.
#[must_use]
pub fn explain_rules(
    fiscal_condition: Option<FiscalCondition>,
    document_type: Option<DocumentType>,
) -> String {
    match resolve_rule(fiscal_condition, document_type) {
        TaxRule::NoFiscalCondition => {
            "No fiscal condition specified: no perceptions or withholdings are calculated."
                .to_string()
        }
        TaxRule::LevyFreeDocument(document) => format!(
            "Document type {document} does not require perceptions/withholdings: all amounts are zero."
        ),
        TaxRule::Perceptions { condition, document } => format!(
            "{condition} supplier with {document}: VAT perception of {} and IIBB perception of {} \
             on the amount, rounded to cents. No VAT or income tax withholding.",
            percent(VAT_PERCEPTION_RATE),
            percent(IIBB_PERCEPTION_RATE),
        ),
        TaxRule::DocumentWithoutPerceptions {
            condition,
            document: Some(document),
        } => format!(
            "{condition} supplier with document type {document}: no perceptions or withholdings apply."
        ),
        TaxRule::DocumentWithoutPerceptions {
            condition,
            document: None,
        } => format!(
            "{condition} supplier without a document type: no perceptions or withholdings apply."
        ),
        TaxRule::Monotributista => {
            "Monotributista suppliers are exempt from perceptions and withholdings.".to_string()
        }
        TaxRule::Exempt => {
            "Exempt suppliers are not subject to perceptions or withholdings.".to_string()
        }
        TaxRule::UnknownCondition => {
            "Unknown fiscal condition: no perceptions or withholdings are calculated.".to_string()
        }
    }
}
