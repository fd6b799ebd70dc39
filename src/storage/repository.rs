use anyhow::{Context, Result};
use log::{debug, warn};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{PaymentStatus, Transaction, TransactionId, parse_created_at};

use super::MIGRATION_001_INITIAL;

const SELECT_COLUMNS: &str =
    "SELECT id, customer_name, weight, unit_price, total_price, created_at, status FROM sales";

/// Repository for persisting and querying sales.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    /// The ledger is a single-user store, so one connection is held for the
    /// lifetime of the repository.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        debug!("Connected to {}", database_url);
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Save a new sale to the database and assign its id.
    pub async fn save_transaction(&self, transaction: &mut Transaction) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO sales (customer_name, weight, unit_price, total_price, created_at, status)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.customer_name)
        .bind(transaction.weight)
        .bind(transaction.unit_price)
        .bind(transaction.total_price)
        .bind(transaction.created_at_text())
        .bind(transaction.status.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to save sale")?;

        transaction.id = result.last_insert_rowid();
        Ok(())
    }

    /// List all sales, newest first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!("{} ORDER BY id DESC", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list sales")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List all sales in the order they were stored (oldest first).
    pub async fn list_transactions_in_store_order(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list sales")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Delete a sale. Returns false if no row had that id.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete sale")?;
        Ok(result.rows_affected() > 0)
    }

    /// Get the payment status of a sale, or None if the sale doesn't exist.
    pub async fn get_status(&self, id: TransactionId) -> Result<Option<PaymentStatus>> {
        let row = sqlx::query("SELECT status FROM sales WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch sale status")?;

        match row {
            Some(row) => {
                let status_str: Option<String> = row.get("status");
                Ok(Some(Self::read_status(id, status_str.as_deref())))
            }
            None => Ok(None),
        }
    }

    /// Overwrite the payment status of a sale.
    pub async fn update_status(&self, id: TransactionId, status: PaymentStatus) -> Result<()> {
        sqlx::query("UPDATE sales SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update sale status")?;
        Ok(())
    }

    fn read_status(id: TransactionId, stored: Option<&str>) -> PaymentStatus {
        if let Some(raw) = stored {
            if PaymentStatus::from_str(raw).is_none() {
                warn!("Sale {} has unrecognised status '{}', reading it as Unpaid", id, raw);
            }
        }
        PaymentStatus::from_stored(stored)
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let customer_name: Option<String> = row.get("customer_name");
        let created_at_str: String = row
            .try_get("created_at")
            .context("Missing created_at timestamp")?;
        let status_str: Option<String> = row.get("status");
        let id: TransactionId = row.get("id");

        Ok(Transaction {
            id,
            customer_name: customer_name.unwrap_or_default(),
            weight: row.try_get("weight").context("Invalid weight")?,
            unit_price: row.try_get("unit_price").context("Invalid unit price")?,
            total_price: row.try_get("total_price").context("Invalid total price")?,
            created_at: parse_created_at(&created_at_str)
                .context("Invalid created_at timestamp")?,
            status: Self::read_status(id, status_str.as_deref()),
        })
    }
}
