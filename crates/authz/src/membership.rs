//! Membership rows - the (organization, user, role) association
//!
//! Role strings are persisted verbatim and only parsed at the guard
//! boundary, so a corrupt row is detected on use rather than silently
//! skipped or coerced.

use crate::error::AuthzError;
use purse_core::Role;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::str::FromStr;

/// A user's membership in an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub role: Role,
}

/// Membership with its subject, as listed on rosters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub username: String,
    pub role: Role,
}

/// Fetch the raw role string for (organization, user), if any.
pub(crate) fn find_raw_role(
    conn: &Connection,
    organization_id: i64,
    username: &str,
) -> Result<Option<String>, AuthzError> {
    let role = conn
        .query_row(
            "SELECT role FROM memberships WHERE organization_id = ?1 AND username = ?2",
            params![organization_id, username],
            |row| row.get(0),
        )
        .optional()?;
    Ok(role)
}

/// Insert or update a membership.
pub fn upsert(
    conn: &Connection,
    organization_id: i64,
    username: &str,
    role: Role,
) -> Result<(), AuthzError> {
    conn.execute(
        "INSERT INTO memberships (organization_id, username, role) VALUES (?1, ?2, ?3)
         ON CONFLICT (organization_id, username) DO UPDATE SET role = excluded.role",
        params![organization_id, username, role.to_string()],
    )?;
    Ok(())
}

/// Remove a membership. Returns false if none existed.
pub fn remove(
    conn: &Connection,
    organization_id: i64,
    username: &str,
) -> Result<bool, AuthzError> {
    let rows = conn.execute(
        "DELETE FROM memberships WHERE organization_id = ?1 AND username = ?2",
        params![organization_id, username],
    )?;
    Ok(rows > 0)
}

/// Remove every membership in the organization except `keep_username`.
///
/// Used by roster replacement: the caller's own row is never touched.
pub fn remove_all_except(
    conn: &Connection,
    organization_id: i64,
    keep_username: &str,
) -> Result<usize, AuthzError> {
    let rows = conn.execute(
        "DELETE FROM memberships WHERE organization_id = ?1 AND username != ?2",
        params![organization_id, keep_username],
    )?;
    Ok(rows)
}

/// List an organization's roster.
///
/// A row with an unrecognized role fails the whole listing; a roster that
/// cannot be fully interpreted must not be rendered as if it were complete.
pub fn list(conn: &Connection, organization_id: i64) -> Result<Vec<RosterEntry>, AuthzError> {
    let mut stmt = conn.prepare(
        "SELECT username, role FROM memberships WHERE organization_id = ?1 ORDER BY username",
    )?;
    let raw = stmt
        .query_map(params![organization_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(username, role)| {
            let role =
                Role::from_str(&role).map_err(|_| AuthzError::UnknownRole(role.clone()))?;
            Ok(RosterEntry { username, role })
        })
        .collect()
}
