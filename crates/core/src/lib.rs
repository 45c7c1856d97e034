//! Purse Core - Domain types
//!
//! This crate contains the fundamental types used across Purse:
//! - `Amount`: Non-negative, two-decimal-place wrapper for monetary values
//! - `Role` / `RolePolicy`: the fixed role-to-capability table
//! - `TransactionState`: the Pending/Approved/Rejected lifecycle
//! - `Direction`: incoming vs. outgoing transactions

pub mod amount;
pub mod role;
pub mod state;

pub use amount::{Amount, AmountError};
pub use role::{Role, RolePolicy};
pub use state::{Direction, TransactionState};
