//! Ledger domain types: accounting entries and the movements behind them.

use chrono::{DateTime, NaiveDate, Utc};
use obra_shared::types::{
    AccountingEntryId, Currency, ExpenseId, IncomeId, Money, SupplierId, UserId, WorkId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::UserRole;
use crate::closure::{AccountingPeriod, ClosureGuard, MonthStatus};
use crate::tax::{DocumentType, FiscalCondition, TaxCalculationResult};

/// Direction of an accounting entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Money coming in.
    #[serde(alias = "ingreso", alias = "INCOME")]
    Income,
    /// Money going out.
    #[serde(alias = "egreso", alias = "EXPENSE")]
    Expense,
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

/// A ledger line.
///
/// `month` and `year` always mirror `date`; `month_status` mirrors the
/// period's closure status and is rewritten when the month is closed or
/// reopened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingEntry {
    /// Unique identifier.
    pub id: AccountingEntryId,
    /// Income or expense.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Always positive; the sign comes from `entry_type`.
    pub amount: Money,
    /// Date of the movement.
    pub date: NaiveDate,
    /// Month of `date`, 1-12.
    pub month: u32,
    /// Year of `date`.
    pub year: i32,
    /// Closure status of the entry's month.
    pub month_status: MonthStatus,
    /// Free text.
    pub description: String,
    /// Construction work the movement belongs to.
    pub work_id: Option<WorkId>,
    /// Supplier, for expenses.
    pub supplier_id: Option<SupplierId>,
    /// Source expense, when created from one.
    pub expense_id: Option<ExpenseId>,
    /// Source income, when created from one.
    pub income_id: Option<IncomeId>,
    /// Who recorded the entry.
    pub created_by: UserId,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl AccountingEntry {
    /// Creates an entry dated `date`, stamped with the given period status.
    #[must_use]
    pub fn new(
        entry_type: EntryType,
        amount: Money,
        date: NaiveDate,
        month_status: MonthStatus,
        description: String,
        created_by: UserId,
    ) -> Self {
        let period = AccountingPeriod::from_date(date);
        let now = Utc::now();
        Self {
            id: AccountingEntryId::new(),
            entry_type,
            amount,
            date,
            month: period.month(),
            year: period.year(),
            month_status,
            description,
            work_id: None,
            supplier_id: None,
            expense_id: None,
            income_id: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// The period the entry belongs to.
    #[must_use]
    pub fn period(&self) -> AccountingPeriod {
        AccountingPeriod::from_date(self.date)
    }

    /// Moves the entry to another date, keeping `month`/`year` in step.
    pub fn set_date(&mut self, date: NaiveDate) {
        let period = AccountingPeriod::from_date(date);
        self.date = date;
        self.month = period.month();
        self.year = period.year();
    }

    /// Whether `role` may edit or delete this entry given its month status.
    #[must_use]
    pub const fn can_be_mutated_by(&self, role: UserRole) -> bool {
        ClosureGuard::can_mutate(self.month_status, role)
    }

    /// Amount signed by direction: positive for income, negative for expense.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Income => self.amount.amount,
            EntryType::Expense => -self.amount.amount,
        }
    }

    /// Returns true if the entry was generated from an expense or income.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.expense_id.is_some() || self.income_id.is_some()
    }
}

/// An expense with its tax snapshot.
///
/// Taxes are computed once at submission and never recomputed on edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier.
    pub id: ExpenseId,
    /// The ledger entry generated for this expense.
    pub entry_id: AccountingEntryId,
    /// Construction work.
    pub work_id: Option<WorkId>,
    /// Supplier.
    pub supplier_id: Option<SupplierId>,
    /// Supplier fiscal condition at submission time.
    pub supplier_fiscal_condition: Option<FiscalCondition>,
    /// Free text.
    pub description: String,
    /// Net amount.
    pub amount: Money,
    /// Date of the expense.
    pub date: NaiveDate,
    /// Backing document.
    pub document_type: DocumentType,
    /// Document number; `VAL-NNNNNNNN` for placeholders.
    pub document_number: Option<String>,
    /// Levies computed at submission.
    #[serde(flatten)]
    pub taxes: TaxCalculationResult,
    /// Who submitted it.
    pub created_by: UserId,
    /// When it was submitted.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Net amount plus perceptions.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.amount.amount + self.taxes.total_perceptions()
    }

    /// The period the expense falls into.
    #[must_use]
    pub fn period(&self) -> AccountingPeriod {
        AccountingPeriod::from_date(self.date)
    }
}

/// An income (certification, advance payment, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    /// Unique identifier.
    pub id: IncomeId,
    /// The ledger entry generated for this income.
    pub entry_id: AccountingEntryId,
    /// Construction work.
    pub work_id: Option<WorkId>,
    /// Free text.
    pub description: String,
    /// Amount received.
    pub amount: Money,
    /// Date received.
    pub date: NaiveDate,
    /// Who recorded it.
    pub created_by: UserId,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}

impl Income {
    /// The period the income falls into.
    #[must_use]
    pub fn period(&self) -> AccountingPeriod {
        AccountingPeriod::from_date(self.date)
    }
}

/// Input for submitting an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    /// Construction work.
    #[serde(default, alias = "obra_id")]
    pub work_id: Option<WorkId>,
    /// Supplier.
    #[serde(default, alias = "proveedor_id")]
    pub supplier_id: Option<SupplierId>,
    /// Supplier fiscal condition, if known.
    #[serde(default, alias = "condicion_fiscal")]
    pub supplier_fiscal_condition: Option<FiscalCondition>,
    /// Free text.
    #[serde(alias = "descripcion")]
    pub description: String,
    /// Net amount.
    #[serde(alias = "monto")]
    pub amount: Decimal,
    /// Currency; the store's default when absent.
    #[serde(default, alias = "moneda")]
    pub currency: Option<Currency>,
    /// Date of the expense.
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
    /// Backing document; a VAL placeholder is issued when absent.
    #[serde(default, alias = "tipo_comprobante")]
    pub document_type: Option<DocumentType>,
    /// Document number.
    #[serde(default, alias = "numero_comprobante")]
    pub document_number: Option<String>,
}

/// Input for recording an income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncome {
    /// Construction work.
    #[serde(default, alias = "obra_id")]
    pub work_id: Option<WorkId>,
    /// Free text.
    #[serde(alias = "descripcion")]
    pub description: String,
    /// Amount received.
    #[serde(alias = "monto")]
    pub amount: Decimal,
    /// Currency; the store's default when absent.
    #[serde(default, alias = "moneda")]
    pub currency: Option<Currency>,
    /// Date received.
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
}

/// Input for a manual ledger entry not backed by an expense or income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewManualEntry {
    /// Income or expense.
    #[serde(rename = "type", alias = "entry_type", alias = "tipo")]
    pub entry_type: EntryType,
    /// Always positive.
    #[serde(alias = "monto")]
    pub amount: Decimal,
    /// Currency; the store's default when absent.
    #[serde(default, alias = "moneda")]
    pub currency: Option<Currency>,
    /// Date of the movement.
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
    /// Free text.
    #[serde(alias = "descripcion")]
    pub description: String,
    /// Construction work.
    #[serde(default, alias = "obra_id")]
    pub work_id: Option<WorkId>,
    /// Supplier.
    #[serde(default, alias = "proveedor_id")]
    pub supplier_id: Option<SupplierId>,
}

/// Partial update of an accounting entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPatch {
    /// New amount.
    #[serde(default, alias = "monto")]
    pub amount: Option<Decimal>,
    /// New date; may move the entry to another period.
    #[serde(default, alias = "fecha")]
    pub date: Option<NaiveDate>,
    /// New description.
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
}

impl EntryPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.amount.is_none() && self.date.is_none() && self.description.is_none()
    }
}

/// Partial update of an expense. Taxes are left as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePatch {
    /// New amount.
    #[serde(default, alias = "monto")]
    pub amount: Option<Decimal>,
    /// New date; may move the expense to another period.
    #[serde(default, alias = "fecha")]
    pub date: Option<NaiveDate>,
    /// New description.
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    /// Corrected document type.
    #[serde(default, alias = "tipo_comprobante")]
    pub document_type: Option<DocumentType>,
    /// Corrected document number.
    #[serde(default, alias = "numero_comprobante")]
    pub document_number: Option<String>,
}

impl ExpensePatch {
    /// The part of the patch that also applies to the linked entry.
    #[must_use]
    pub fn entry_patch(&self) -> EntryPatch {
        EntryPatch {
            amount: self.amount,
            date: self.date,
            description: self.description.clone(),
        }
    }
}
