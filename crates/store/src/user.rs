//! User rows
//!
//! This core only references users; registration and login live elsewhere.

use crate::error::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// A user as referenced by memberships and transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Insert a user row.
pub fn insert(conn: &Connection, user: &User) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO users (username, first_name, last_name) VALUES (?1, ?2, ?3)",
        params![user.username, user.first_name, user.last_name],
    )?;
    Ok(())
}

/// Fetch a user by username.
pub fn get(conn: &Connection, username: &str) -> Result<Option<User>, StoreError> {
    let user = conn
        .query_row(
            "SELECT username, first_name, last_name FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok(User {
                    username: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}
