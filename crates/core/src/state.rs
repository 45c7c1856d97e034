//! Transaction lifecycle states and direction

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Lifecycle state of a transaction.
///
/// The only transitions are `Pending -> Approved` and `Pending -> Rejected`;
/// both targets are terminal. The workflow layer enforces this - attempting
/// to resolve a non-pending transaction is a conflict, never a silent
/// success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum TransactionState {
    Pending,
    Approved,
    Rejected,
}

impl TransactionState {
    /// Whether this state permits no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionState::Pending)
    }
}

/// Direction of a transaction as supplied by the caller.
///
/// Callers always submit an unsigned magnitude plus a direction; outgoing
/// transactions are stored with a negated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money entering the wallet; stored positive.
    In,
    /// Money leaving the wallet; stored negative.
    Out,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_terminal_states() {
        assert!(!TransactionState::Pending.is_terminal());
        assert!(TransactionState::Approved.is_terminal());
        assert!(TransactionState::Rejected.is_terminal());
    }

    #[test]
    fn test_state_string_roundtrip() {
        for state in [
            TransactionState::Pending,
            TransactionState::Approved,
            TransactionState::Rejected,
        ] {
            assert_eq!(
                TransactionState::from_str(&state.to_string()).unwrap(),
                state
            );
        }
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(Direction::In.to_string(), "in");
        assert_eq!(Direction::Out.to_string(), "out");
        assert_eq!(Direction::from_str("out").unwrap(), Direction::Out);
    }
}
