//! Roles and the capability table
//!
//! Every membership carries exactly one role, and every role maps to a fixed
//! set of boolean capabilities. The table is static data compiled into the
//! binary: there is no runtime mutation path, and `Role::policy` is total
//! over the enum. Unrecognized role strings coming out of storage fail to
//! parse, which callers must treat as an internal error rather than a
//! denial.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The fixed set of roles a member can hold within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Role {
    /// The owner has the highest authority in the organization.
    Owner,

    /// Same as an owner, except they cannot update organization details.
    Administrator,

    /// Can create transactions as well as approve them.
    Reviewer,

    /// Can only create transactions.
    Member,
}

/// The capabilities granted by a single role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RolePolicy {
    pub name: &'static str,
    pub description: &'static str,
    pub allow_approve_transactions: bool,
    pub allow_create_transactions: bool,
    pub allow_create_wallets: bool,
    pub allow_update_wallets: bool,
    pub allow_delete_wallets: bool,
    pub allow_update_organization: bool,
    pub allow_read_audit_log: bool,
}

const OWNER: RolePolicy = RolePolicy {
    name: "Owner",
    description: "The owner has the highest authority in the organization.",
    allow_approve_transactions: true,
    allow_create_transactions: true,
    allow_create_wallets: true,
    allow_update_wallets: true,
    allow_delete_wallets: true,
    allow_update_organization: true,
    allow_read_audit_log: true,
};

const ADMINISTRATOR: RolePolicy = RolePolicy {
    name: "Administrator",
    description: "The administrator is the same as an owner, except they cannot update organization details.",
    allow_approve_transactions: true,
    allow_create_transactions: true,
    allow_create_wallets: true,
    allow_update_wallets: true,
    allow_delete_wallets: true,
    allow_update_organization: false,
    allow_read_audit_log: true,
};

const REVIEWER: RolePolicy = RolePolicy {
    name: "Reviewer",
    description: "The reviewer has the ability to create transactions as well as approve them.",
    allow_approve_transactions: true,
    allow_create_transactions: true,
    allow_create_wallets: false,
    allow_update_wallets: false,
    allow_delete_wallets: false,
    allow_update_organization: false,
    allow_read_audit_log: true,
};

const MEMBER: RolePolicy = RolePolicy {
    name: "Member",
    description: "The member can only create transactions.",
    allow_approve_transactions: false,
    allow_create_transactions: true,
    allow_create_wallets: false,
    allow_update_wallets: false,
    allow_delete_wallets: false,
    allow_update_organization: false,
    allow_read_audit_log: false,
};

impl Role {
    /// All roles, in descending order of authority.
    pub const ALL: [Role; 4] = [
        Role::Owner,
        Role::Administrator,
        Role::Reviewer,
        Role::Member,
    ];

    /// The capability set granted by this role.
    ///
    /// Total over the enum; the fail-closed path for unrecognized roles
    /// lives at the string-parsing boundary, not here.
    pub fn policy(&self) -> &'static RolePolicy {
        match self {
            Role::Owner => &OWNER,
            Role::Administrator => &ADMINISTRATOR,
            Role::Reviewer => &REVIEWER,
            Role::Member => &MEMBER,
        }
    }
}
