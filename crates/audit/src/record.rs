//! Audit record vocabulary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What was done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Approve,
    Reject,
}

/// What kind of object it was done to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Organization,
    Wallet,
    Transaction,
}

/// An immutable entry in an organization's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub id: i64,
    pub organization_id: i64,
    /// Server-assigned at insert time.
    pub at: DateTime<Utc>,
    /// The acting user.
    pub subject: String,
    pub action: AuditAction,
    pub object_kind: ObjectKind,
    pub object_id: i64,
    pub message: String,
}
