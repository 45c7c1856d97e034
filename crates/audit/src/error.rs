//! Audit errors

use purse_store::StoreError;
use thiserror::Error;

/// Errors from the audit recorder
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for AuditError {
    fn from(e: rusqlite::Error) -> Self {
        AuditError::Store(StoreError::from(e))
    }
}
