//! Purse Store - SQLite persistence
//!
//! Owns the relational schema and the atomic-unit contract every mutating
//! workflow relies on. All writes that must commit or roll back together run
//! through [`Store::with_write_tx`], which opens a `BEGIN IMMEDIATE`
//! transaction: writers serialize against each other, so a read-check-write
//! sequence on a wallet row cannot be invalidated by a concurrently
//! committing writer. This is a documented contract, not a driver default.
//!
//! Row modules (`user`, `organization`, `wallet`, `transaction`) expose
//! plain functions over `&Connection` so they compose both standalone and
//! inside a write transaction (`rusqlite::Transaction` derefs to
//! `Connection`).

mod convert;

pub mod error;
pub mod organization;
pub mod store;
pub mod transaction;
pub mod user;
pub mod wallet;

pub use error::StoreError;
pub use organization::Organization;
pub use store::Store;
pub use transaction::Transaction;
pub use user::User;
pub use wallet::Wallet;
