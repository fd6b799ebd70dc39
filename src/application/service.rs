use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};

use crate::domain::{ParseAmountError, PaymentStatus, Transaction, TransactionId, parse_amount};
use crate::io::export::{Exporter, UTF8_BOM};
use crate::storage::Repository;

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, shell, etc.).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating the file and the
    /// `sales` table if they don't exist yet.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Record a new sale stamped with the current local time.
    ///
    /// `weight_input` and `unit_price_input` are the raw texts the user typed.
    /// The unit price is whatever the caller currently holds as its default;
    /// the service keeps no price state of its own.
    pub async fn add_transaction(
        &self,
        customer_name: &str,
        weight_input: &str,
        unit_price_input: &str,
    ) -> Result<Transaction, AppError> {
        self.add_transaction_at(
            customer_name,
            weight_input,
            unit_price_input,
            Local::now().naive_local(),
        )
        .await
    }

    /// Record a new sale with an explicit creation time.
    pub async fn add_transaction_at(
        &self,
        customer_name: &str,
        weight_input: &str,
        unit_price_input: &str,
        created_at: NaiveDateTime,
    ) -> Result<Transaction, AppError> {
        let weight = parse_amount(weight_input).map_err(|reason| AppError::InvalidNumberFormat {
            field: "weight",
            input: weight_input.to_string(),
            reason,
        })?;
        let unit_price =
            parse_amount(unit_price_input).map_err(|reason| AppError::InvalidNumberFormat {
                field: "unit price",
                input: unit_price_input.to_string(),
                reason,
            })?;

        if weight <= 0.0 || unit_price <= 0.0 {
            warn!(
                "Recording sale with non-positive amount: weight={}, unit_price={}",
                weight, unit_price
            );
        }

        let mut transaction = Transaction::new(customer_name, weight, unit_price, created_at);
        if !transaction.total_price.is_finite() {
            return Err(AppError::InvalidNumberFormat {
                field: "total price",
                input: format!("{} x {}", weight_input.trim(), unit_price_input.trim()),
                reason: ParseAmountError::NotFinite,
            });
        }

        self.repo.save_transaction(&mut transaction).await?;

        info!(
            "Recorded sale {} for '{}': {} x {} = {}",
            transaction.id,
            transaction.customer_name,
            transaction.weight,
            transaction.unit_price,
            transaction.total_price
        );
        Ok(transaction)
    }

    /// List every sale, newest first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    /// List every sale in store order, oldest first.
    pub async fn list_transactions_in_store_order(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions_in_store_order().await?)
    }

    /// Permanently remove a sale.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<(), AppError> {
        if !self.repo.delete_transaction(id).await? {
            return Err(AppError::NotFound(id));
        }
        info!("Deleted sale {}", id);
        Ok(())
    }

    /// Flip a sale between unpaid and paid. Returns the new status.
    pub async fn toggle_status(&self, id: TransactionId) -> Result<PaymentStatus, AppError> {
        let current = self
            .repo
            .get_status(id)
            .await?
            .ok_or(AppError::NotFound(id))?;

        let next = current.toggled();
        self.repo.update_status(id, next).await?;

        info!("Sale {} marked {}", id, next);
        Ok(next)
    }

    /// Export the whole ledger to a new CSV file in `dir`, named after the
    /// current time. Returns the absolute path of the written file.
    pub async fn export_to_file(&self, dir: &Path) -> Result<PathBuf, AppError> {
        self.export_to_file_at(dir, Local::now().naive_local()).await
    }

    /// Export the whole ledger to a new CSV file named after `now`.
    ///
    /// An existing file is never overwritten: if the name is taken a numeric
    /// suffix is added.
    pub async fn export_to_file_at(
        &self,
        dir: &Path,
        now: NaiveDateTime,
    ) -> Result<PathBuf, AppError> {
        let stamp = now.format("%Y%m%d_%H%M%S").to_string();
        let (path, mut file) = create_export_file(dir, &stamp)?;
        debug!("Exporting ledger to {}", path.display());

        file.write_all(UTF8_BOM)?;
        let count = Exporter::new(self).export_transactions_csv(file).await?;

        let full_path = std::path::absolute(&path)?;
        info!("Exported {} sales to {}", count, full_path.display());
        Ok(full_path)
    }
}

fn create_export_file(dir: &Path, stamp: &str) -> Result<(PathBuf, File), AppError> {
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            format!("ledger_{}.csv", stamp)
        } else {
            format!("ledger_{}_{}.csv", stamp, suffix)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
