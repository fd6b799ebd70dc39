use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use log::debug;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::application::LedgerService;
use crate::domain::TransactionId;

use super::{describe_sale, write_table};

const HELP: &str = "\
Commands:
  add <weight> [name]   record a sale at the current unit price
  price [value]         show or set the unit price
  list                  show all sales, newest first
  toggle <id>           switch a sale between Unpaid and Paid
  delete <id>           remove a sale
  export                write the ledger to a CSV file
  help                  show this message
  quit                  leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Add { weight: String, name: String },
    Price(Option<String>),
    List,
    Toggle(TransactionId),
    Delete(TransactionId),
    Export,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Invalid sale ID '{0}'")]
    InvalidId(String),
}

impl ShellCommand {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb.to_lowercase().as_str() {
            "add" | "a" => {
                let weight = words
                    .next()
                    .ok_or(CommandError::MissingArgument("weight"))?
                    .to_string();
                let name = words.collect::<Vec<_>>().join(" ");
                ShellCommand::Add { weight, name }
            }
            "price" | "p" => ShellCommand::Price(words.next().map(str::to_string)),
            "list" | "ls" | "l" => ShellCommand::List,
            "toggle" | "t" => ShellCommand::Toggle(parse_id(words.next())?),
            "delete" | "del" | "rm" => ShellCommand::Delete(parse_id(words.next())?),
            "export" => ShellCommand::Export,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_id(word: Option<&str>) -> Result<TransactionId, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument("sale ID"))?;
    word.trim_start_matches('#')
        .parse()
        .map_err(|_| CommandError::InvalidId(word.to_string()))
}

/// Interactive session over a ledger.
///
/// The unit price is session state owned here and handed to every add; it is
/// kept as the raw text the user typed and only validated when a sale uses it.
/// A failed command prints its error and the session carries on.
pub struct Shell<'a> {
    service: &'a LedgerService,
    unit_price: String,
    export_dir: PathBuf,
}

impl<'a> Shell<'a> {
    pub fn new(service: &'a LedgerService, unit_price: String, export_dir: PathBuf) -> Self {
        Self {
            service,
            unit_price,
            export_dir,
        }
    }

    pub fn unit_price(&self) -> &str {
        &self.unit_price
    }

    /// Read commands line by line until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "Unit price: {}. Type 'help' for commands.", self.unit_price)?;
        let mut lines = input.lines();

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match ShellCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(out, "Error: {}", e)?;
                    continue;
                }
            };

            if !self.execute(command, out).await? {
                break;
            }
        }

        writeln!(out)?;
        Ok(())
    }

    /// Run a single command. Returns false when the session should end.
    /// Only output failures are returned as errors; ledger errors are printed.
    pub async fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<bool> {
        debug!("Shell command: {:?}", command);

        match command {
            ShellCommand::Add { weight, name } => {
                match self
                    .service
                    .add_transaction(&name, &weight, &self.unit_price)
                    .await
                {
                    Ok(transaction) => writeln!(out, "{}", describe_sale(&transaction))?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }

            ShellCommand::Price(None) => {
                writeln!(out, "Unit price: {}", self.unit_price)?;
            }

            ShellCommand::Price(Some(value)) => {
                self.unit_price = value;
                writeln!(out, "Unit price set to {}", self.unit_price)?;
            }

            ShellCommand::List => match self.service.list_transactions().await {
                Ok(transactions) => write_table(out, &transactions)?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },

            ShellCommand::Toggle(id) => match self.service.toggle_status(id).await {
                Ok(status) => writeln!(out, "Sale #{} is now {}", id, status)?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },

            ShellCommand::Delete(id) => match self.service.delete_transaction(id).await {
                Ok(()) => writeln!(out, "Deleted sale #{}", id)?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },

            ShellCommand::Export => match self.service.export_to_file(&self.export_dir).await {
                Ok(path) => writeln!(out, "Exported ledger to {}", path.display())?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },

            ShellCommand::Help => writeln!(out, "{}", HELP)?,

            ShellCommand::Quit => return Ok(false),
        }

        Ok(true)
    }
}
