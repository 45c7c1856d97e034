//! Transaction rows
//!
//! Identified by `(wallet_id, id)` where `id` is assigned from the wallet's
//! transaction counter at creation. The stored `value` is already signed:
//! incoming positive, outgoing negative.

use crate::convert::{decimal_from_sql, timestamp_from_sql};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use purse_core::TransactionState;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// A transaction against a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Sequential id, unique within the wallet.
    pub id: i64,
    pub wallet_id: i64,
    /// Signed value: positive incoming, negative outgoing.
    pub value: Decimal,
    pub state: TransactionState,
    pub creator: String,
    pub reviewer: String,
    /// When the money was spent, supplied by the creator.
    pub spend_at: DateTime<Utc>,
    /// When the transaction was filed, assigned by the server.
    pub entered_at: DateTime<Utc>,
    pub notes: String,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let value: String = row.get(2)?;
    let state: String = row.get(3)?;
    let spend_at: String = row.get(6)?;
    let entered_at: String = row.get(7)?;

    Ok(Transaction {
        id: row.get(0)?,
        wallet_id: row.get(1)?,
        value: decimal_from_sql(2, &value)?,
        state: TransactionState::from_str(&state)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        creator: row.get(4)?,
        reviewer: row.get(5)?,
        spend_at: timestamp_from_sql(6, &spend_at)?,
        entered_at: timestamp_from_sql(7, &entered_at)?,
        notes: row.get(8)?,
    })
}

const COLUMNS: &str = "id, wallet_id, value, state, creator, reviewer, spend_at, entered_at, notes";

/// Insert a transaction row.
pub fn insert(conn: &Connection, transaction: &Transaction) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO transactions (id, wallet_id, value, state, creator, reviewer, spend_at, entered_at, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            transaction.id,
            transaction.wallet_id,
            transaction.value.to_string(),
            transaction.state.to_string(),
            transaction.creator,
            transaction.reviewer,
            transaction.spend_at.to_rfc3339(),
            transaction.entered_at.to_rfc3339(),
            transaction.notes,
        ],
    )?;
    Ok(())
}

/// Fetch a transaction by its composite key.
pub fn get(
    conn: &Connection,
    wallet_id: i64,
    transaction_id: i64,
) -> Result<Option<Transaction>, StoreError> {
    let transaction = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM transactions WHERE wallet_id = ?1 AND id = ?2"),
            params![wallet_id, transaction_id],
            from_row,
        )
        .optional()?;
    Ok(transaction)
}

/// Update a transaction's state. Returns false if the row does not exist.
pub fn set_state(
    conn: &Connection,
    wallet_id: i64,
    transaction_id: i64,
    state: TransactionState,
) -> Result<bool, StoreError> {
    let rows = conn.execute(
        "UPDATE transactions SET state = ?1 WHERE wallet_id = ?2 AND id = ?3",
        params![state.to_string(), wallet_id, transaction_id],
    )?;
    Ok(rows > 0)
}

/// List a wallet's transactions, newest entry first.
pub fn list_for_wallet(conn: &Connection, wallet_id: i64) -> Result<Vec<Transaction>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM transactions WHERE wallet_id = ?1 ORDER BY entered_at DESC, id DESC"
    ))?;
    let transactions = stmt
        .query_map(params![wallet_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(transactions)
}

/// List the most recent transactions across all wallets of an organization.
pub fn list_recent_for_organization(
    conn: &Connection,
    organization_id: i64,
    limit: usize,
) -> Result<Vec<Transaction>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.wallet_id, t.value, t.state, t.creator, t.reviewer, t.spend_at, t.entered_at, t.notes
         FROM transactions t
         JOIN wallets w ON w.id = t.wallet_id
         WHERE w.organization_id = ?1
         ORDER BY t.entered_at DESC, t.id DESC
         LIMIT ?2",
    )?;
    let transactions = stmt
        .query_map(params![organization_id, limit as i64], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(transactions)
}
