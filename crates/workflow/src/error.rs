//! Workflow errors
//!
//! One tagged union for every failure the request-handling layer has to map
//! to a user-facing response. Domain failures are variants, not stringly
//! JSON; field-scoped input problems travel in [`ValidationErrors`]. None of
//! these are retried automatically - a `Conflict` or `InsufficientBalance`
//! must be re-evaluated against fresh state by a human.

use purse_audit::AuditError;
use purse_authz::AuthzError;
use purse_store::StoreError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field-scoped validation messages, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Ok if no message was collected, otherwise the whole set as an error.
    pub fn into_result(self) -> Result<(), WorkflowError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Errors from workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Malformed or out-of-range input; recoverable by correcting the
    /// offending fields.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Entity absent, or the caller is not a member of the organization.
    #[error("not found")]
    NotFound,

    /// Authenticated member lacking the required capability.
    #[error("forbidden")]
    Forbidden,

    /// The proposed reviewer cannot approve transactions in this
    /// organization.
    #[error("user is not authorized to review this transaction")]
    InvalidReviewer,

    /// The transaction already reached a terminal state.
    #[error("transaction state has already been set")]
    Conflict,

    /// The wallet does not have enough balance for this transaction.
    #[error("the wallet does not have enough balance for this transaction")]
    InsufficientBalance,

    /// Owners must be demoted or replaced before they can leave.
    #[error("owners cannot leave the organization")]
    OwnerCannotLeave,

    /// A membership row carries a role the policy table does not know.
    /// The offending string is kept for diagnostics but never shown to
    /// callers; the guard already logged it.
    #[error("internal error")]
    UnknownRole(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// A validation error with a single field message.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(field, message);
        WorkflowError::Validation(errors)
    }
}

impl From<AuthzError> for WorkflowError {
    fn from(e: AuthzError) -> Self {
        match e {
            AuthzError::NotFound => WorkflowError::NotFound,
            AuthzError::Forbidden => WorkflowError::Forbidden,
            AuthzError::UnknownRole(role) => WorkflowError::UnknownRole(role),
            AuthzError::Store(e) => WorkflowError::Store(e),
        }
    }
}

impl From<AuditError> for WorkflowError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::Store(e) => WorkflowError::Store(e),
        }
    }
}
