//! Tax domain types.
//!
//! Enum inputs arrive as loosely spelled strings (English codes, Spanish
//! names, single letters). They are normalized here, once, and never fail:
//! anything unrecognized becomes `Unknown` and is zero-rated by the rules.

use std::convert::Infallible;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalizes a code: trims, uppercases, and turns spaces/hyphens into `_`.
fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase().replace([' ', '-', '.'], "_")
}

/// Supplier fiscal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum FiscalCondition {
    /// Registered VAT taxpayer (Responsable Inscripto).
    Ri,
    /// Flat-tax small taxpayer.
    Monotributista,
    /// VAT exempt.
    Exempt,
    /// Any other condition, treated like RI.
    Other,
    /// Unrecognized input.
    Unknown,
}

impl FiscalCondition {
    /// Canonical code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ri => "RI",
            Self::Monotributista => "MONOTRIBUTISTA",
            Self::Exempt => "EXEMPT",
            Self::Other => "OTHER",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true for conditions subject to perceptions on A/B invoices.
    #[must_use]
    pub const fn is_perception_subject(&self) -> bool {
        matches!(self, Self::Ri | Self::Other)
    }
}

impl std::str::FromStr for FiscalCondition {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match normalize_code(s).as_str() {
            "RI" | "RESPONSABLE_INSCRIPTO" | "IVA_RESPONSABLE_INSCRIPTO" => Self::Ri,
            "MONOTRIBUTISTA" | "MONOTRIBUTO" | "MT" => Self::Monotributista,
            "EXEMPT" | "EXENTO" | "IVA_EXENTO" => Self::Exempt,
            "OTHER" | "OTRO" | "OTROS" => Self::Other,
            _ => Self::Unknown,
        })
    }
}

impl From<&str> for FiscalCondition {
    fn from(value: &str) -> Self {
        match value.parse::<Self>() {
            Ok(condition) => condition,
            Err(never) => match never {},
        }
    }
}

impl From<String> for FiscalCondition {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<FiscalCondition> for &'static str {
    fn from(value: FiscalCondition) -> Self {
        value.as_str()
    }
}

impl std::fmt::Display for FiscalCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fiscal document backing an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum DocumentType {
    /// Invoice type A (between registered taxpayers).
    InvoiceA,
    /// Invoice type B.
    InvoiceB,
    /// Invoice type C (issued by monotributistas).
    InvoiceC,
    /// Receipt.
    Receipt,
    /// Internally generated placeholder for expenses without a real document.
    Val,
    /// Unrecognized input.
    Unknown,
}

impl DocumentType {
    /// Canonical code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvoiceA => "INVOICE_A",
            Self::InvoiceB => "INVOICE_B",
            Self::InvoiceC => "INVOICE_C",
            Self::Receipt => "RECEIPT",
            Self::Val => "VAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Documents that never carry perceptions or withholdings.
    #[must_use]
    pub const fn is_levy_free(&self) -> bool {
        matches!(self, Self::InvoiceC | Self::Receipt | Self::Val)
    }

    /// Documents on which perceptions are charged.
    #[must_use]
    pub const fn carries_perceptions(&self) -> bool {
        matches!(self, Self::InvoiceA | Self::InvoiceB)
    }

    /// Fiscal invoices, which must carry a document number.
    #[must_use]
    pub const fn is_invoice(&self) -> bool {
        matches!(self, Self::InvoiceA | Self::InvoiceB | Self::InvoiceC)
    }
}

impl std::str::FromStr for DocumentType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match normalize_code(s).as_str() {
            "INVOICE_A" | "FACTURA_A" | "A" | "FA" => Self::InvoiceA,
            "INVOICE_B" | "FACTURA_B" | "B" | "FB" => Self::InvoiceB,
            "INVOICE_C" | "FACTURA_C" | "C" | "FC" => Self::InvoiceC,
            "RECEIPT" | "RECIBO" | "TICKET" => Self::Receipt,
            "VAL" => Self::Val,
            _ => Self::Unknown,
        })
    }
}

impl From<&str> for DocumentType {
    fn from(value: &str) -> Self {
        match value.parse::<Self>() {
            Ok(document) => document,
            Err(never) => match never {},
        }
    }
}

impl From<String> for DocumentType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<DocumentType> for &'static str {
    fn from(value: DocumentType) -> Self {
        value.as_str()
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Levies computed for an expense, stored denormalized on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    /// VAT perception.
    pub vat_perception: Decimal,
    /// VAT withholding.
    pub vat_withholding: Decimal,
    /// Provincial gross-receipts (IIBB) perception.
    pub iibb_perception: Decimal,
    /// Income tax withholding.
    pub income_tax_withholding: Decimal,
    /// True when the amounts come from the rule set rather than manual input.
    pub is_auto_calculated: bool,
    /// Ordered trail of the rules that fired.
    pub calculation_rules: Vec<String>,
}

impl TaxCalculationResult {
    /// An all-zero result with the given rationale trail.
    #[must_use]
    pub fn zero(calculation_rules: Vec<String>) -> Self {
        Self {
            vat_perception: Decimal::ZERO,
            vat_withholding: Decimal::ZERO,
            iibb_perception: Decimal::ZERO,
            income_tax_withholding: Decimal::ZERO,
            is_auto_calculated: true,
            calculation_rules,
        }
    }

    /// VAT plus IIBB perception.
    #[must_use]
    pub fn total_perceptions(&self) -> Decimal {
        self.vat_perception + self.iibb_perception
    }

    /// VAT plus income tax withholding.
    #[must_use]
    pub fn total_withholdings(&self) -> Decimal {
        self.vat_withholding + self.income_tax_withholding
    }

    /// Returns true when every amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total_perceptions().is_zero() && self.total_withholdings().is_zero()
    }
}
