//! Obra CLI
//!
//! Tax calculation, rule explanations and ledger replays from the terminal.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;

use obra_cli::replay::{Replay, parse_operations};
use obra_cli::{taxes, telemetry};
use obra_core::tax::{DocumentType, FiscalCondition, explain_rules};
use obra_shared::AppConfig;
use obra_store::Store;

/// Obra: perceptions, withholdings and monthly closure for construction works.
#[derive(Parser, Debug)]
#[command(name = "obra", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Compute perceptions and withholdings for an expense.
    Taxes {
        /// Net amount of the expense.
        #[arg(long)]
        amount: Decimal,
        /// Supplier fiscal condition (RI, MONOTRIBUTISTA, EXEMPT, OTHER).
        #[arg(long)]
        condition: Option<FiscalCondition>,
        /// Document type (INVOICE_A, INVOICE_B, INVOICE_C, RECEIPT, VAL).
        #[arg(long)]
        document: Option<DocumentType>,
    },
    /// Explain which rule applies to a condition and document.
    Explain {
        /// Supplier fiscal condition.
        #[arg(long)]
        condition: Option<FiscalCondition>,
        /// Document type.
        #[arg(long)]
        document: Option<DocumentType>,
    },
    /// Apply a JSON script of ledger operations to an empty in-memory ledger.
    Replay {
        /// Path to the script.
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init(&config.logging);

    let cli = Cli::parse();

    match cli.command {
        Commands::Taxes {
            amount,
            condition,
            document,
        } => {
            let result = taxes::quote(amount, condition, document)
                .with_context(|| format!("Invalid amount {amount}"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Explain {
            condition,
            document,
        } => {
            println!("{}", explain_rules(condition, document));
        }
        Commands::Replay { file } => {
            let script = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let operations = parse_operations(&script)
                .with_context(|| format!("Invalid replay script {}", file.display()))?;
            info!(operations = operations.len(), path = %file.display(), "Replaying ledger script");

            let store = Store::from_config(&config.ledger);
            let report = Replay::new(&store).run(operations);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
