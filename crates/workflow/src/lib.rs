//! Purse Workflow - the use-case layer
//!
//! Composes the guard, the store, and the audit recorder into the
//! operations a request handler calls: organization lifecycle, wallet
//! management, and the transaction approval state machine. Every mutating
//! operation follows the same shape: validate input up front, then open one
//! write transaction, authorize inside it, apply the change, and record the
//! audit entry before commit.

pub mod error;
pub mod organization;
pub mod transaction;
pub mod wallet;

pub use error::{ValidationErrors, WorkflowError};
pub use organization::{
    audit_log, create_organization, leave_organization, overview, update_organization, MemberSpec,
    OrganizationOverview,
};
pub use transaction::{
    create_transaction, get_transaction, list_transactions, resolve_transaction, NewTransaction,
};
pub use wallet::{create_wallet, delete_wallet, get_wallet, rename_wallet};
