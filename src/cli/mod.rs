use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::LedgerService;
use crate::domain::{Transaction, format_money, format_real};
use crate::io::export::Exporter;

mod shell;

pub use shell::*;

/// Default price per jin used when no price is given.
pub const DEFAULT_UNIT_PRICE: &str = "18.0";

/// Porkbook - sales ledger for a pork stall
#[derive(Parser)]
#[command(name = "porkbook")]
#[command(about = "Record pork sales per customer, track who has paid, export to CSV")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "porkbook.db")]
    pub database: String,

    /// Default price per jin for new sales
    #[arg(short, long, global = true, default_value = DEFAULT_UNIT_PRICE)]
    pub unit_price: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record a sale
    Add {
        /// Weight sold in jin (e.g., "2.5")
        weight: String,

        /// Customer name (may be several words, or omitted)
        name: Vec<String>,

        /// Price per jin for this sale (defaults to --unit-price)
        #[arg(short, long)]
        price: Option<String>,
    },

    /// List all sales, newest first
    List {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Delete a sale
    Delete {
        /// Sale ID
        id: i64,
    },

    /// Toggle a sale between unpaid and paid
    Toggle {
        /// Sale ID
        id: i64,
    },

    /// Export the ledger to a timestamped CSV file
    Export {
        /// Directory to write into (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Interactive session: enter sales one line at a time
    Shell,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let service = LedgerService::init(&self.database)
            .await
            .with_context(|| format!("Failed to open database: {}", self.database))?;

        match self.command {
            Commands::Init => {
                println!("Database initialized: {}", self.database);
            }

            Commands::Add {
                weight,
                name,
                price,
            } => {
                let price = price.unwrap_or(self.unit_price);
                let name = name.join(" ");
                let transaction = service.add_transaction(&name, &weight, &price).await?;
                println!("{}", describe_sale(&transaction));
            }

            Commands::List { format } => {
                let mut out = io::stdout();
                run_list_command(&service, &format, &mut out).await?;
            }

            Commands::Delete { id } => {
                service.delete_transaction(id).await?;
                println!("Deleted sale #{}", id);
            }

            Commands::Toggle { id } => {
                let status = service.toggle_status(id).await?;
                println!("Sale #{} is now {}", id, status);
            }

            Commands::Export { dir } => {
                let dir = match dir {
                    Some(dir) => dir,
                    None => std::env::current_dir().context("Failed to read current directory")?,
                };
                let path = service.export_to_file(&dir).await?;
                println!("Exported ledger to {}", path.display());
            }

            Commands::Shell => {
                let dir = std::env::current_dir().context("Failed to read current directory")?;
                let input = tokio::io::BufReader::new(tokio::io::stdin());
                let mut out = io::stdout();
                Shell::new(&service, self.unit_price, dir)
                    .run(input, &mut out)
                    .await?;
            }
        }

        Ok(())
    }
}

async fn run_list_command<W: Write>(
    service: &LedgerService,
    format: &str,
    out: &mut W,
) -> Result<()> {
    match format {
        "table" => {
            let transactions = service.list_transactions().await?;
            write_table(out, &transactions)?;
        }
        "json" => {
            let transactions = service.list_transactions().await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&transactions)?)?;
        }
        "csv" => {
            Exporter::new(service).export_transactions_csv(out).await?;
        }
        _ => {
            anyhow::bail!("Invalid format '{}'. Valid formats: table, json, csv", format);
        }
    }
    Ok(())
}

/// One-line confirmation for a freshly recorded sale.
pub fn describe_sale(transaction: &Transaction) -> String {
    let name: &str = if transaction.customer_name.is_empty() {
        "(no name)"
    } else {
        &transaction.customer_name
    };
    format!(
        "Recorded sale #{}: {} {} jin x {} = {}",
        transaction.id,
        name,
        format_real(transaction.weight),
        format_money(transaction.unit_price),
        format_money(transaction.total_price)
    )
}

/// Render sales as an aligned table.
pub fn write_table<W: Write>(out: &mut W, transactions: &[Transaction]) -> io::Result<()> {
    if transactions.is_empty() {
        return writeln!(out, "No sales recorded.");
    }

    writeln!(
        out,
        "{:>5}  {:<16} {:>8} {:>10} {:>10}  {:<8} {:<16}",
        "ID", "CUSTOMER", "WEIGHT", "PRICE", "TOTAL", "STATUS", "DATE"
    )?;
    writeln!(out, "{}", "-".repeat(82))?;
    for tx in transactions {
        writeln!(
            out,
            "{:>5}  {:<16} {:>8} {:>10} {:>10}  {:<8} {:<16}",
            tx.id,
            tx.customer_name,
            format_real(tx.weight),
            format_money(tx.unit_price),
            format_money(tx.total_price),
            tx.status.as_str(),
            tx.created_at_text()
        )?;
    }
    Ok(())
}
