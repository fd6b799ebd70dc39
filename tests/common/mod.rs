// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDateTime;
use porkbook::Repository;
use porkbook::application::LedgerService;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test service that shares its pool with the test, so
/// rows can be written behind the service's back
pub async fn test_service_with_pool() -> Result<(LedgerService, SqlitePool, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;
    let repo = Repository::new(pool.clone());
    repo.migrate().await?;
    Ok((LedgerService::new(repo), pool, temp_dir))
}

/// Helper to parse a "YYYY-MM-DD HH:MM" string
pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

/// Insert a raw row, bypassing the service
pub async fn insert_raw(
    pool: &SqlitePool,
    name: &str,
    weight: f64,
    unit_price: f64,
    created_at: &str,
    status: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO sales (customer_name, weight, unit_price, total_price, created_at, status) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(weight)
    .bind(unit_price)
    .bind(weight * unit_price)
    .bind(created_at)
    .bind(status)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}
