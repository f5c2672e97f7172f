//! Perception and withholding rules for supplier documents.
//!
//! Levies are computed once when an expense is recorded and stored on it.

pub mod calculator;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use calculator::{IIBB_PERCEPTION_RATE, VAT_PERCEPTION_RATE, calculate_taxes, explain_rules};
pub use types::{DocumentType, FiscalCondition, TaxCalculationResult};
