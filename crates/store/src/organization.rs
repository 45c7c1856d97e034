//! Organization rows - the tenant boundary

use crate::error::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// An organization owning wallets and a membership roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    /// Set once the owner has finished the initial roster setup.
    pub completed_setup: bool,
}

/// Insert an organization and return its id.
pub fn insert(conn: &Connection, name: &str) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO organizations (name) VALUES (?1)",
        params![name],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch an organization by id.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Organization>, StoreError> {
    let organization = conn
        .query_row(
            "SELECT id, name, completed_setup FROM organizations WHERE id = ?1",
            params![id],
            |row| {
                Ok(Organization {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    completed_setup: row.get::<_, i64>(2)? != 0,
                })
            },
        )
        .optional()?;
    Ok(organization)
}

/// Rename an organization. Returns false if it does not exist.
pub fn rename(conn: &Connection, id: i64, name: &str) -> Result<bool, StoreError> {
    let rows = conn.execute(
        "UPDATE organizations SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(rows > 0)
}

/// Mark initial setup as complete.
pub fn mark_setup_complete(conn: &Connection, id: i64) -> Result<bool, StoreError> {
    let rows = conn.execute(
        "UPDATE organizations SET completed_setup = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(rows > 0)
}

/// Delete an organization. Wallets, memberships, transactions, and audit
/// rows cascade.
pub fn delete(conn: &Connection, id: i64) -> Result<bool, StoreError> {
    let rows = conn.execute("DELETE FROM organizations WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn test_insert_get_rename() {
        let store = Store::in_memory().unwrap();
        let id = insert(store.conn(), "acme").unwrap();

        let org = get(store.conn(), id).unwrap().unwrap();
        assert_eq!(org.name, "acme");
        assert!(!org.completed_setup);

        assert!(rename(store.conn(), id, "acme inc").unwrap());
        assert!(mark_setup_complete(store.conn(), id).unwrap());

        let org = get(store.conn(), id).unwrap().unwrap();
        assert_eq!(org.name, "acme inc");
        assert!(org.completed_setup);
    }

    #[test]
    fn test_missing_organization() {
        let store = Store::in_memory().unwrap();
        assert_eq!(get(store.conn(), 42).unwrap(), None);
        assert!(!rename(store.conn(), 42, "ghost").unwrap());
        assert!(!delete(store.conn(), 42).unwrap());
    }

    #[test]
    fn test_delete_cascades_to_wallets() {
        let store = Store::in_memory().unwrap();
        let id = insert(store.conn(), "acme").unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO wallets (organization_id, name, balance) VALUES (?1, 'ops', '0')",
                params![id],
            )
            .unwrap();

        assert!(delete(store.conn(), id).unwrap());
        let wallets: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM wallets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(wallets, 0);
    }
}
