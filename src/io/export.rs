use std::io::Write;

use crate::application::{AppError, LedgerService};
use crate::domain::{Transaction, format_real};

/// Byte-order mark prepended to exported files so spreadsheet tools pick
/// UTF-8 for customer names.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row of the ledger export, in store column order.
pub const CSV_HEADER: [&str; 7] = [
    "RecordID",
    "CustomerName",
    "Weight",
    "UnitPrice",
    "TotalPrice",
    "CreatedAt",
    "Status",
];

/// Exporter for converting ledger data to CSV
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export every sale, oldest first, to CSV format
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize, AppError> {
        let transactions = self.service.list_transactions_in_store_order().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(CSV_HEADER)?;

        let mut count = 0;
        for transaction in &transactions {
            csv_writer.write_record(to_record(transaction))?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}

fn to_record(transaction: &Transaction) -> [String; 7] {
    [
        transaction.id.to_string(),
        transaction.customer_name.clone(),
        format_real(transaction.weight),
        format_real(transaction.unit_price),
        format_real(transaction.total_price),
        transaction.created_at_text(),
        transaction.status.as_str().to_string(),
    ]
}
