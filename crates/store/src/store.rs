//! Connection handling, schema setup, and the atomic-unit helper

use crate::error::StoreError;
use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits on the `BEGIN IMMEDIATE` lock before failing
/// with `SQLITE_BUSY`. Set explicitly so writer queuing is part of the
/// store's contract rather than a driver default.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the SQLite database backing all Purse state.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        // WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Read-only access to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so every read inside `f` observes
    /// state no concurrent writer can invalidate before this transaction
    /// commits. A second writer queues on the lock for up to
    /// [`BUSY_TIMEOUT`] and then fails with `DatabaseBusy`. If `f` returns
    /// an error the transaction rolls back and no partial state persists.
    pub fn with_write_tx<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                username   TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS organizations (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                completed_setup INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS memberships (
                organization_id INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
                username        TEXT NOT NULL REFERENCES users(username),
                role            TEXT NOT NULL,
                PRIMARY KEY (organization_id, username)
            );

            CREATE TABLE IF NOT EXISTS wallets (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                organization_id   INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
                name              TEXT NOT NULL,
                balance           TEXT NOT NULL,
                transaction_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS transactions (
                id        INTEGER NOT NULL,
                wallet_id INTEGER NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
                value     TEXT NOT NULL,
                state     TEXT NOT NULL,
                creator   TEXT NOT NULL REFERENCES users(username),
                reviewer  TEXT NOT NULL REFERENCES users(username),
                spend_at  TEXT NOT NULL,
                entered_at TEXT NOT NULL,
                notes     TEXT NOT NULL,
                PRIMARY KEY (id, wallet_id)
            );

            CREATE TABLE IF NOT EXISTS audit_log (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                organization_id INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
                at              TEXT NOT NULL,
                subject         TEXT NOT NULL,
                action          TEXT NOT NULL,
                object_type     TEXT NOT NULL,
                object_id       INTEGER NOT NULL,
                message         TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_wallets_organization
                ON wallets(organization_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_wallet
                ON transactions(wallet_id, entered_at);
            CREATE INDEX IF NOT EXISTS idx_audit_log_organization
                ON audit_log(organization_id);",
        )?;

        Ok(())
    }
}
