//! In-process persistence for Obra.
//!
//! This crate provides:
//! - `Store`: shared tables for entries, expenses, incomes and period records
//! - Repositories that run the tax evaluator and the closure guard before
//!   every write

pub mod repositories;
mod store;

pub use repositories::{EntryRepository, ExpenseRepository, IncomeRepository, PeriodRepository};
pub use store::Store;
