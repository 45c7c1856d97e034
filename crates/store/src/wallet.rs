//! Wallet rows - balance and the per-wallet transaction counter
//!
//! The balance column is decimal text, never REAL; exactness is part of the
//! ledger contract. Balance mutations and counter bumps are only correct
//! inside a write transaction (see `Store::with_write_tx`).

use crate::convert::decimal_from_sql;
use crate::error::StoreError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::Serialize;

/// A wallet owned by exactly one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub id: i64,
    pub organization_id: i64,
    pub name: String,
    pub balance: Decimal,
    /// Monotonic counter used to assign sequential per-wallet transaction ids.
    pub transaction_count: i64,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Wallet> {
    let balance: String = row.get(3)?;
    Ok(Wallet {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        balance: decimal_from_sql(3, &balance)?,
        transaction_count: row.get(4)?,
    })
}

const COLUMNS: &str = "id, organization_id, name, balance, transaction_count";

/// Insert a wallet with an initial balance and return its id.
pub fn insert(
    conn: &Connection,
    organization_id: i64,
    name: &str,
    balance: Decimal,
) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO wallets (organization_id, name, balance) VALUES (?1, ?2, ?3)",
        params![organization_id, name, balance.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a wallet, scoped to its organization.
///
/// Scoping keeps a wallet id from one tenant from resolving under another.
pub fn get(
    conn: &Connection,
    organization_id: i64,
    wallet_id: i64,
) -> Result<Option<Wallet>, StoreError> {
    let wallet = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM wallets WHERE organization_id = ?1 AND id = ?2"),
            params![organization_id, wallet_id],
            from_row,
        )
        .optional()?;
    Ok(wallet)
}

/// List an organization's wallets.
pub fn list_for_organization(
    conn: &Connection,
    organization_id: i64,
) -> Result<Vec<Wallet>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM wallets WHERE organization_id = ?1 ORDER BY id"
    ))?;
    let wallets = stmt
        .query_map(params![organization_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(wallets)
}

/// Rename a wallet. Returns false if it does not exist in the organization.
pub fn rename(
    conn: &Connection,
    organization_id: i64,
    wallet_id: i64,
    name: &str,
) -> Result<bool, StoreError> {
    let rows = conn.execute(
        "UPDATE wallets SET name = ?1 WHERE organization_id = ?2 AND id = ?3",
        params![name, organization_id, wallet_id],
    )?;
    Ok(rows > 0)
}

/// Delete a wallet and (by cascade) its transactions.
pub fn delete(conn: &Connection, organization_id: i64, wallet_id: i64) -> Result<bool, StoreError> {
    let rows = conn.execute(
        "DELETE FROM wallets WHERE organization_id = ?1 AND id = ?2",
        params![organization_id, wallet_id],
    )?;
    Ok(rows > 0)
}

/// Increment the per-wallet transaction counter.
pub fn bump_transaction_count(conn: &Connection, wallet_id: i64) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE wallets SET transaction_count = transaction_count + 1 WHERE id = ?1",
        params![wallet_id],
    )?;
    Ok(())
}

/// Add `delta` (signed) to the wallet balance and return the new balance.
///
/// Read-modify-write; must run inside the same write transaction as the
/// state change that justifies it.
pub fn increment_balance(
    conn: &Connection,
    wallet_id: i64,
    delta: Decimal,
) -> Result<Decimal, StoreError> {
    let raw: String = conn.query_row(
        "SELECT balance FROM wallets WHERE id = ?1",
        params![wallet_id],
        |row| row.get(0),
    )?;
    let balance = decimal_from_sql(0, &raw)?;
    let updated = balance
        .checked_add(delta)
        .ok_or_else(|| StoreError::Corrupt {
            field: "balance",
            value: format!("{balance} + {delta}"),
        })?;

    conn.execute(
        "UPDATE wallets SET balance = ?1 WHERE id = ?2",
        params![updated.to_string(), wallet_id],
    )?;
    Ok(updated)
}
