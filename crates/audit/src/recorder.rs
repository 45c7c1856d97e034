//! Recording and reading audit entries

use crate::error::AuditError;
use crate::record::{AuditAction, AuditRecord, ObjectKind};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::str::FromStr;

/// Append one audit record and return it as persisted.
pub fn record(
    conn: &Connection,
    subject: &str,
    organization_id: i64,
    object_kind: ObjectKind,
    object_id: i64,
    action: AuditAction,
    message: &str,
) -> Result<AuditRecord, AuditError> {
    let at = Utc::now();
    conn.execute(
        "INSERT INTO audit_log (organization_id, at, subject, action, object_type, object_id, message)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            organization_id,
            at.to_rfc3339(),
            subject,
            action.to_string(),
            object_kind.to_string(),
            object_id,
            message,
        ],
    )?;

    Ok(AuditRecord {
        id: conn.last_insert_rowid(),
        organization_id,
        at,
        subject: subject.to_string(),
        action,
        object_kind,
        object_id,
        message: message.to_string(),
    })
}

/// Run `effect` and append one audit record as a single atomic unit.
///
/// Both persist or neither does: the pair runs inside a savepoint, so this
/// composes whether called standalone or nested in an outer write
/// transaction. An audit row must never describe an effect that rolled
/// back.
pub fn record_with_effect<T, E, F>(
    conn: &Connection,
    subject: &str,
    organization_id: i64,
    object_kind: ObjectKind,
    object_id: i64,
    action: AuditAction,
    message: &str,
    effect: F,
) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<AuditError>,
{
    conn.execute_batch("SAVEPOINT audit_effect")
        .map_err(AuditError::from)?;

    let outcome = effect(conn).and_then(|value| {
        record(
            conn,
            subject,
            organization_id,
            object_kind,
            object_id,
            action,
            message,
        )
        .map(|_| value)
        .map_err(E::from)
    });

    match outcome {
        Ok(value) => {
            conn.execute_batch("RELEASE audit_effect")
                .map_err(AuditError::from)?;
            Ok(value)
        }
        Err(e) => {
            conn.execute_batch("ROLLBACK TO audit_effect; RELEASE audit_effect")
                .map_err(AuditError::from)?;
            Err(e)
        }
    }
}

/// Read an organization's audit log, newest first.
pub fn list_for_organization(
    conn: &Connection,
    organization_id: i64,
) -> Result<Vec<AuditRecord>, AuditError> {
    let mut stmt = conn.prepare(
        "SELECT id, organization_id, at, subject, action, object_type, object_id, message
         FROM audit_log WHERE organization_id = ?1 ORDER BY id DESC",
    )?;
    let records = stmt
        .query_map(params![organization_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<AuditRecord> {
    let at: String = row.get(2)?;
    let action: String = row.get(4)?;
    let object_kind: String = row.get(5)?;

    Ok(AuditRecord {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        at: DateTime::parse_from_rfc3339(&at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        subject: row.get(3)?,
        action: AuditAction::from_str(&action)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        object_kind: ObjectKind::from_str(&object_kind)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        object_id: row.get(6)?,
        message: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use purse_store::{organization, Store};

    fn store_with_org() -> (Store, i64) {
        let store = Store::in_memory().unwrap();
        let org = organization::insert(store.conn(), "acme").unwrap();
        (store, org)
    }

    #[test]
    fn test_record_and_list_newest_first() {
        let (store, org) = store_with_org();

        record(
            store.conn(),
            "alice",
            org,
            ObjectKind::Wallet,
            1,
            AuditAction::Create,
            "Created wallet",
        )
        .unwrap();
        record(
            store.conn(),
            "bob",
            org,
            ObjectKind::Transaction,
            1,
            AuditAction::Approve,
            "Transaction was Approved",
        )
        .unwrap();

        let records = list_for_organization(store.conn(), org).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subject, "bob");
        assert_eq!(records[0].action, AuditAction::Approve);
        assert_eq!(records[1].subject, "alice");
    }

    #[test]
    fn test_record_with_effect_commits_both() {
        let (store, org) = store_with_org();

        let wallet_id: i64 = record_with_effect(
            store.conn(),
            "alice",
            org,
            ObjectKind::Wallet,
            0,
            AuditAction::Create,
            "Created wallet",
            |conn| {
                conn.execute(
                    "INSERT INTO wallets (organization_id, name, balance) VALUES (?1, 'ops', '0')",
                    params![org],
                )
                .map_err(AuditError::from)?;
                Ok::<_, AuditError>(conn.last_insert_rowid())
            },
        )
        .unwrap();
        assert!(wallet_id > 0);

        let records = list_for_organization(store.conn(), org).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_record_with_effect_rolls_back_audit_on_failure() {
        let (store, org) = store_with_org();

        let result: Result<(), AuditError> = record_with_effect(
            store.conn(),
            "alice",
            org,
            ObjectKind::Wallet,
            0,
            AuditAction::Create,
            "Created wallet",
            |conn| {
                conn.execute(
                    "INSERT INTO wallets (organization_id, name, balance) VALUES (?1, 'ops', '0')",
                    params![org],
                )?;
                // A failing effect must drag the audit row down with it.
                conn.execute("INSERT INTO wallets (oops) VALUES (1)", [])?;
                Ok(())
            },
        );
        assert!(result.is_err());

        let records = list_for_organization(store.conn(), org).unwrap();
        assert!(records.is_empty(), "no audit row for a rolled-back effect");
        let wallets: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM wallets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(wallets, 0);
    }

    #[test]
    fn test_no_mutation_surface() {
        // The schema accepts updates, but the crate deliberately exposes
        // none; this documents the append-only contract at the API level.
        let (store, org) = store_with_org();
        record(
            store.conn(),
            "alice",
            org,
            ObjectKind::Organization,
            org,
            AuditAction::Create,
            "Created organization",
        )
        .unwrap();

        let before = list_for_organization(store.conn(), org).unwrap();
        let after = list_for_organization(store.conn(), org).unwrap();
        assert_eq!(before, after);
    }
}
