//! Store errors

use thiserror::Error;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt {field} value in storage: {value}")]
    Corrupt { field: &'static str, value: String },
}
