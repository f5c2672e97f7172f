//! Core business logic for Obra.
//!
//! This crate contains pure business logic with ZERO web or storage dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `auth` - User roles and their privileges
//! - `tax` - Perception/withholding rules for supplier documents
//! - `closure` - Monthly accounting closure guard
//! - `ledger` - Accounting entries, expenses, incomes and period summaries

pub mod auth;
pub mod closure;
pub mod ledger;
pub mod tax;
