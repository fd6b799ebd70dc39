use thiserror::Error;

use crate::domain::{ParseAmountError, TransactionId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid {field} '{input}': {reason}, enter a number such as 2.5")]
    InvalidNumberFormat {
        field: &'static str,
        input: String,
        reason: ParseAmountError,
    },

    #[error("Sale not found: {0}")]
    NotFound(TransactionId),

    #[error("Export failed: {0}")]
    ExportIo(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::ExportIo(csv::Error::from(err))
    }
}
