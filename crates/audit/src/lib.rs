//! Purse Audit - append-only audit recorder
//!
//! Every committed state change in an organization leaves an immutable
//! record: who did what to which object, with a human-readable message.
//! Records are never updated or deleted, and a record must never describe
//! an action that did not durably happen - the transactional variant
//! [`record_with_effect`] binds the audit insert and the wrapped effect
//! into one atomic unit.

pub mod error;
pub mod record;
pub mod recorder;

pub use error::AuditError;
pub use record::{AuditAction, AuditRecord, ObjectKind};
pub use recorder::{list_for_organization, record, record_with_effect};
