//! Authorization errors

use purse_store::StoreError;
use thiserror::Error;

/// Errors from the authorization guard
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The user has no membership in the organization, or the organization
    /// does not exist. Surfaced identically on purpose.
    #[error("not found")]
    NotFound,

    /// The user is a member but their role does not grant the capability.
    #[error("forbidden")]
    Forbidden,

    /// A persisted role string is not in the policy table. Internal error;
    /// authorization fails closed.
    #[error("unrecognized role: {0}")]
    UnknownRole(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for AuthzError {
    fn from(e: rusqlite::Error) -> Self {
        AuthzError::Store(StoreError::from(e))
    }
}
