use chrono::NaiveDate;
use thiserror::Error;

/// Failure reading or writing the ledger tables.
#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(
        "{date} was saved elsewhere in the meantime (expected revision {expected}, found {found})"
    )]
    Conflict {
        date: NaiveDate,
        expected: i64,
        found: i64,
    },
}

/// Failure producing or writing a spreadsheet.
#[derive(Debug, Error)]
pub(crate) enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
