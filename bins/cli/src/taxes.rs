//! The `taxes` subcommand.

use obra_core::ledger::LedgerError;
use obra_core::ledger::validation::validate_amount;
use obra_core::tax::{DocumentType, FiscalCondition, TaxCalculationResult, calculate_taxes};
use rust_decimal::Decimal;

/// Computes taxes for an amount typed on the command line.
///
/// # Errors
///
/// The amount is zero, negative, or has more than two decimals.
pub fn quote(
    amount: Decimal,
    condition: Option<FiscalCondition>,
    document: Option<DocumentType>,
) -> Result<TaxCalculationResult, LedgerError> {
    validate_amount(amount)?;
    Ok(calculate_taxes(amount, condition, document))
}
