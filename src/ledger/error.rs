use std::time::Duration;
use thiserror::Error;

/// 台账写入错误
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("HTTP request to ledger failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ledger rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Ledger call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}
