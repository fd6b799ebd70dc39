mod common;

use std::fs;

use anyhow::Result;
use common::{at, test_service};
use porkbook::application::{AppError, LedgerService};
use porkbook::io::export::{CSV_HEADER, Exporter, UTF8_BOM};

/// Read an exported file back as rows, checking and stripping the BOM
fn read_export(path: &std::path::Path) -> Result<Vec<Vec<String>>> {
    let bytes = fs::read(path)?;
    assert!(bytes.starts_with(UTF8_BOM), "export must start with a BOM");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(&bytes[UTF8_BOM.len()..]);
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn row(fields: [&str; 7]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

async fn seed_ana_and_bo(service: &LedgerService) -> Result<()> {
    service
        .add_transaction_at("Ana", "2.0", "18.0", at("2024-01-01 10:00"))
        .await?;
    let bo = service
        .add_transaction_at("Bo", "1.5", "20.0", at("2024-01-01 11:00"))
        .await?;
    service.toggle_status(bo.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_export_reproduces_stored_rows() -> Result<()> {
    let (service, temp) = test_service().await?;
    seed_ana_and_bo(&service).await?;

    let path = service
        .export_to_file_at(temp.path(), at("2024-01-01 12:00"))
        .await?;

    let rows = read_export(&path)?;
    assert_eq!(
        rows,
        vec![
            row(CSV_HEADER),
            row(["1", "Ana", "2.0", "18.0", "36.0", "2024-01-01 10:00", "Unpaid"]),
            row(["2", "Bo", "1.5", "20.0", "30.0", "2024-01-01 11:00", "Paid"]),
        ]
    );

    Ok(())
}

#[test]
fn test_export_header_is_fixed() {
    assert_eq!(
        CSV_HEADER,
        [
            "RecordID",
            "CustomerName",
            "Weight",
            "UnitPrice",
            "TotalPrice",
            "CreatedAt",
            "Status"
        ]
    );
}

#[tokio::test]
async fn test_export_file_name_and_absolute_path() -> Result<()> {
    let (service, temp) = test_service().await?;
    seed_ana_and_bo(&service).await?;

    let now = chrono::NaiveDateTime::parse_from_str("2024-05-06 07:08:09", "%Y-%m-%d %H:%M:%S")?;
    let path = service.export_to_file_at(temp.path(), now).await?;

    assert!(path.is_absolute());
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("ledger_20240506_070809.csv")
    );
    assert_eq!(path.parent(), Some(temp.path()));

    Ok(())
}

#[tokio::test]
async fn test_export_never_overwrites_previous_file() -> Result<()> {
    let (service, temp) = test_service().await?;
    seed_ana_and_bo(&service).await?;
    let now = at("2024-01-01 12:00");

    let first = service.export_to_file_at(temp.path(), now).await?;
    let first_contents = fs::read(&first)?;

    service.add_transaction("Cy", "1", "18").await?;
    let second = service.export_to_file_at(temp.path(), now).await?;

    assert_ne!(first, second);
    assert_eq!(
        second.file_name().and_then(|n| n.to_str()),
        Some("ledger_20240101_120000_1.csv")
    );
    assert_eq!(fs::read(&first)?, first_contents);
    assert_eq!(read_export(&second)?.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_export_keeps_non_ascii_names() -> Result<()> {
    let (service, temp) = test_service().await?;
    service
        .add_transaction_at("王阿姨, 菜市场", "1.2", "18", at("2024-02-10 06:30"))
        .await?;

    let path = service.export_to_file(temp.path()).await?;
    let rows = read_export(&path)?;

    assert_eq!(rows[1][1], "王阿姨, 菜市场");
    assert_eq!(rows[1][4], "21.6");
    Ok(())
}

#[tokio::test]
async fn test_export_of_empty_ledger_has_only_header() -> Result<()> {
    let (service, temp) = test_service().await?;

    let path = service.export_to_file(temp.path()).await?;
    assert_eq!(read_export(&path)?, vec![row(CSV_HEADER)]);
    Ok(())
}

#[tokio::test]
async fn test_export_into_missing_directory_fails() -> Result<()> {
    let (service, temp) = test_service().await?;
    seed_ana_and_bo(&service).await?;

    let missing = temp.path().join("no").join("such").join("dir");
    let result = service.export_to_file(&missing).await;

    assert!(matches!(result, Err(AppError::ExportIo(_))));
    // The ledger itself is unaffected
    assert_eq!(service.list_transactions().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_exporter_writes_to_any_writer() -> Result<()> {
    let (service, _temp) = test_service().await?;
    seed_ana_and_bo(&service).await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_transactions_csv(&mut buffer)
        .await?;

    assert_eq!(count, 2);
    let text = String::from_utf8(buffer)?;
    assert!(text.starts_with("RecordID,CustomerName,"));
    assert!(text.contains("2,Bo,1.5,20.0,30.0,2024-01-01 11:00,Paid"));
    Ok(())
}
