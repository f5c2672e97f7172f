//! Obra command-line tooling.
//!
//! The binary is a thin dispatcher; subcommand logic lives here so it can be
//! tested without spawning a process.

pub mod replay;
pub mod taxes;
pub mod telemetry;
