//! The authorization guard

use crate::error::AuthzError;
use crate::membership::{self, Membership};
use purse_core::{Role, RolePolicy};
use rusqlite::Connection;
use std::str::FromStr;

/// Require that `username` is a member of the organization whose role
/// grants the capability selected by `grants`.
///
/// Returns the membership on success so callers can branch on the role
/// (e.g. the Owner leave-block). Read-only; safe to call several times per
/// request, including with an untrusted second subject such as a proposed
/// reviewer.
pub fn require_authorization(
    conn: &Connection,
    username: &str,
    organization_id: i64,
    grants: impl FnOnce(&RolePolicy) -> bool,
) -> Result<Membership, AuthzError> {
    let Some(raw_role) = membership::find_raw_role(conn, organization_id, username)? else {
        return Err(AuthzError::NotFound);
    };

    let role = Role::from_str(&raw_role).map_err(|_| {
        tracing::error!(
            role = %raw_role,
            username,
            organization_id,
            "membership row carries an unrecognized role"
        );
        AuthzError::UnknownRole(raw_role.clone())
    })?;

    if !grants(role.policy()) {
        return Err(AuthzError::Forbidden);
    }

    Ok(Membership { role })
}
