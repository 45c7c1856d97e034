//! Transaction creation and resolution
//!
//! The two mutating entry points of the approval workflow. Each runs its
//! read-check-write sequence inside `Store::with_write_tx`, so a balance
//! check and the write it authorizes cannot be split by a concurrent
//! writer.

use crate::error::{ValidationErrors, WorkflowError};
use chrono::{DateTime, Utc};
use purse_audit::{self as audit, AuditAction, ObjectKind};
use purse_authz::{require_authorization, AuthzError};
use purse_core::{Amount, AmountError, Direction, TransactionState};
use purse_store::{transaction, wallet, Store, Transaction};
use rust_decimal::Decimal;

/// Input for filing a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub direction: Direction,
    /// Unsigned magnitude; the sign is derived from `direction`.
    pub magnitude: Decimal,
    /// When the money moved. Must not be in the future.
    pub spend_at: DateTime<Utc>,
    /// Username of the member who will approve or reject.
    pub reviewer: String,
    pub notes: String,
}

fn validate(input: &NewTransaction, creator: &str) -> Result<Amount, WorkflowError> {
    let mut errors = ValidationErrors::new();

    let amount = match Amount::new(input.magnitude) {
        Ok(amount) if amount.is_zero() => {
            errors.push("value", "Amount must be greater than 0");
            None
        }
        Ok(amount) => Some(amount),
        Err(AmountError::Negative(_)) => {
            errors.push("value", "Amount must be greater than 0");
            None
        }
        Err(AmountError::TooPrecise(_)) => {
            errors.push("value", "Amount cannot have more than 2 decimal places");
            None
        }
    };

    if input.spend_at > Utc::now() {
        errors.push("spendAt", "Spend date cannot be in the future");
    }

    if input.reviewer.trim().is_empty() {
        errors.push("reviewer", "Reviewer is required");
    } else if input.reviewer == creator {
        errors.push("reviewer", "You cannot review your own transaction");
    }

    errors.into_result()?;
    Ok(amount.unwrap_or(Amount::ZERO))
}

/// File a new Pending transaction against a wallet and return its id.
///
/// The id is sequential within the wallet, assigned from the wallet's
/// transaction counter. For outgoing transactions the wallet must already
/// cover the magnitude; money that is known to be spent must not be
/// promisable twice. The value is stored signed: incoming positive,
/// outgoing negative.
pub fn create_transaction(
    store: &mut Store,
    organization_id: i64,
    wallet_id: i64,
    creator: &str,
    input: &NewTransaction,
) -> Result<i64, WorkflowError> {
    let amount = validate(input, creator)?;

    store.with_write_tx(|tx| {
        require_authorization(tx, creator, organization_id, |p| {
            p.allow_create_transactions
        })?;

        let wallet = wallet::get(tx, organization_id, wallet_id)?.ok_or(WorkflowError::NotFound)?;

        let value = match input.direction {
            Direction::In => amount.value(),
            Direction::Out => {
                if wallet.balance < amount.value() {
                    return Err(WorkflowError::InsufficientBalance);
                }
                amount.negated()
            }
        };

        // The reviewer is untrusted input; vet them with the same guard
        // used for resolution, but report failures against the field.
        match require_authorization(tx, &input.reviewer, organization_id, |p| {
            p.allow_approve_transactions
        }) {
            Ok(_) => {}
            Err(AuthzError::NotFound | AuthzError::Forbidden) => {
                return Err(WorkflowError::InvalidReviewer)
            }
            Err(e) => return Err(e.into()),
        }

        let id = wallet.transaction_count + 1;
        let row = Transaction {
            id,
            wallet_id,
            value,
            state: TransactionState::Pending,
            creator: creator.to_string(),
            reviewer: input.reviewer.clone(),
            spend_at: input.spend_at,
            entered_at: Utc::now(),
            notes: input.notes.clone(),
        };

        audit::record_with_effect(
            tx,
            creator,
            organization_id,
            ObjectKind::Transaction,
            id,
            AuditAction::Create,
            "Created new transaction",
            |conn| {
                transaction::insert(conn, &row)?;
                wallet::bump_transaction_count(conn, wallet_id)?;
                tracing::info!(
                    organization_id,
                    wallet_id,
                    transaction_id = id,
                    value = %value,
                    "transaction created"
                );
                Ok::<_, WorkflowError>(id)
            },
        )
    })
}

/// Approve or reject a Pending transaction.
///
/// Approval applies the signed value to the wallet balance; rejection
/// leaves the balance untouched. A transaction that already reached a
/// terminal state yields `Conflict` regardless of which verdict it reached,
/// and an approval that would push the balance negative fails with the
/// transaction still Pending.
pub fn resolve_transaction(
    store: &mut Store,
    organization_id: i64,
    wallet_id: i64,
    transaction_id: i64,
    resolver: &str,
    verdict: TransactionState,
) -> Result<(), WorkflowError> {
    if !verdict.is_terminal() {
        return Err(WorkflowError::field(
            "state",
            "Transaction must be approved or rejected",
        ));
    }

    store.with_write_tx(|tx| {
        require_authorization(tx, resolver, organization_id, |p| {
            p.allow_approve_transactions
        })?;

        let wallet = wallet::get(tx, organization_id, wallet_id)?.ok_or(WorkflowError::NotFound)?;
        let txn = transaction::get(tx, wallet_id, transaction_id)?.ok_or(WorkflowError::NotFound)?;

        if txn.state.is_terminal() {
            return Err(WorkflowError::Conflict);
        }

        if verdict == TransactionState::Approved && wallet.balance + txn.value < Decimal::ZERO {
            return Err(WorkflowError::InsufficientBalance);
        }

        transaction::set_state(tx, wallet_id, transaction_id, verdict)?;
        let action = match verdict {
            TransactionState::Approved => AuditAction::Approve,
            _ => AuditAction::Reject,
        };
        audit::record(
            tx,
            resolver,
            organization_id,
            ObjectKind::Transaction,
            transaction_id,
            action,
            &format!("Transaction was {verdict}"),
        )?;

        if verdict == TransactionState::Approved {
            let balance = wallet::increment_balance(tx, wallet_id, txn.value)?;
            audit::record(
                tx,
                resolver,
                organization_id,
                ObjectKind::Wallet,
                wallet_id,
                AuditAction::Update,
                &format!("Wallet balance was incremented by {} to {balance}", txn.value),
            )?;
        }

        tracing::info!(
            organization_id,
            wallet_id,
            transaction_id,
            state = %verdict,
            "transaction resolved"
        );
        Ok(())
    })
}

/// Fetch one transaction; any member of the organization may read it.
pub fn get_transaction(
    store: &Store,
    organization_id: i64,
    wallet_id: i64,
    transaction_id: i64,
    caller: &str,
) -> Result<Transaction, WorkflowError> {
    let conn = store.conn();
    require_authorization(conn, caller, organization_id, |_| true)?;
    wallet::get(conn, organization_id, wallet_id)?.ok_or(WorkflowError::NotFound)?;
    transaction::get(conn, wallet_id, transaction_id)?.ok_or(WorkflowError::NotFound)
}

/// List a wallet's transactions, newest entry first.
pub fn list_transactions(
    store: &Store,
    organization_id: i64,
    wallet_id: i64,
    caller: &str,
) -> Result<Vec<Transaction>, WorkflowError> {
    let conn = store.conn();
    require_authorization(conn, caller, organization_id, |_| true)?;
    wallet::get(conn, organization_id, wallet_id)?.ok_or(WorkflowError::NotFound)?;
    Ok(transaction::list_for_wallet(conn, wallet_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use purse_authz::membership;
    use purse_core::Role;
    use purse_store::{organization, user};
    use rust_decimal_macros::dec;

    fn seed(balance: Decimal) -> (Store, i64, i64) {
        let store = Store::in_memory().unwrap();
        for name in ["alice", "bob", "carol"] {
            user::insert(
                store.conn(),
                &user::User {
                    username: name.to_string(),
                    first_name: name.to_string(),
                    last_name: "Test".to_string(),
                },
            )
            .unwrap();
        }
        let org = organization::insert(store.conn(), "acme").unwrap();
        membership::upsert(store.conn(), org, "alice", Role::Member).unwrap();
        membership::upsert(store.conn(), org, "bob", Role::Reviewer).unwrap();
        membership::upsert(store.conn(), org, "carol", Role::Member).unwrap();
        let wallet_id = wallet::insert(store.conn(), org, "ops", balance).unwrap();
        (store, org, wallet_id)
    }

    fn outgoing(magnitude: Decimal, reviewer: &str) -> NewTransaction {
        NewTransaction {
            direction: Direction::Out,
            magnitude,
            spend_at: Utc::now() - Duration::minutes(5),
            reviewer: reviewer.to_string(),
            notes: "team lunch".to_string(),
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids_and_signs_value() {
        let (mut store, org, wallet_id) = seed(dec!(100));

        let first = create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(25.50), "bob")).unwrap();
        let incoming = NewTransaction {
            direction: Direction::In,
            ..outgoing(dec!(10), "bob")
        };
        let second = create_transaction(&mut store, org, wallet_id, "alice", &incoming).unwrap();

        assert_eq!((first, second), (1, 2));
        let txn = get_transaction(&store, org, wallet_id, 1, "alice").unwrap();
        assert_eq!(txn.value, dec!(-25.50));
        assert_eq!(txn.state, TransactionState::Pending);
        let txn = get_transaction(&store, org, wallet_id, 2, "alice").unwrap();
        assert_eq!(txn.value, dec!(10));
    }

    #[test]
    fn test_create_rejects_bad_input_per_field() {
        let (mut store, org, wallet_id) = seed(dec!(100));

        let mut input = outgoing(dec!(0), "alice");
        input.spend_at = Utc::now() + Duration::hours(1);

        match create_transaction(&mut store, org, wallet_id, "alice", &input) {
            Err(WorkflowError::Validation(errors)) => {
                assert_eq!(errors.get("value"), Some("Amount must be greater than 0"));
                assert_eq!(errors.get("spendAt"), Some("Spend date cannot be in the future"));
                assert_eq!(
                    errors.get("reviewer"),
                    Some("You cannot review your own transaction")
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_checks_balance_eagerly_for_outgoing() {
        let (mut store, org, wallet_id) = seed(dec!(100));

        let result =
            create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(150), "bob"));
        assert!(matches!(result, Err(WorkflowError::InsufficientBalance)));

        // Nothing was written: counter untouched, no audit row.
        let wallet = wallet::get(store.conn(), org, wallet_id).unwrap().unwrap();
        assert_eq!(wallet.transaction_count, 0);
    }

    #[test]
    fn test_create_rejects_reviewer_without_capability() {
        let (mut store, org, wallet_id) = seed(dec!(100));

        // carol is a Member and may not approve; mallory is not a member.
        for reviewer in ["carol", "mallory"] {
            let result = create_transaction(
                &mut store,
                org,
                wallet_id,
                "alice",
                &outgoing(dec!(10), reviewer),
            );
            assert!(
                matches!(result, Err(WorkflowError::InvalidReviewer)),
                "reviewer {reviewer} should be invalid"
            );
        }
    }

    #[test]
    fn test_approval_applies_value_to_balance() {
        let (mut store, org, wallet_id) = seed(dec!(100));
        let id = create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(25.50), "bob")).unwrap();

        resolve_transaction(&mut store, org, wallet_id, id, "bob", TransactionState::Approved)
            .unwrap();

        let wallet = wallet::get(store.conn(), org, wallet_id).unwrap().unwrap();
        assert_eq!(wallet.balance, dec!(74.50));
        let txn = get_transaction(&store, org, wallet_id, id, "alice").unwrap();
        assert_eq!(txn.state, TransactionState::Approved);
    }

    #[test]
    fn test_rejection_never_touches_balance() {
        let (mut store, org, wallet_id) = seed(dec!(100));
        let id = create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(25), "bob")).unwrap();

        resolve_transaction(&mut store, org, wallet_id, id, "bob", TransactionState::Rejected)
            .unwrap();

        let wallet = wallet::get(store.conn(), org, wallet_id).unwrap().unwrap();
        assert_eq!(wallet.balance, dec!(100));
    }

    #[test]
    fn test_double_resolution_is_conflict() {
        let (mut store, org, wallet_id) = seed(dec!(100));
        let id = create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(25), "bob")).unwrap();

        resolve_transaction(&mut store, org, wallet_id, id, "bob", TransactionState::Approved)
            .unwrap();

        // Same verdict again is still a conflict, never a silent success.
        for verdict in [TransactionState::Approved, TransactionState::Rejected] {
            let result = resolve_transaction(&mut store, org, wallet_id, id, "bob", verdict);
            assert!(matches!(result, Err(WorkflowError::Conflict)));
        }

        let wallet = wallet::get(store.conn(), org, wallet_id).unwrap().unwrap();
        assert_eq!(wallet.balance, dec!(75), "balance applied exactly once");
    }

    #[test]
    fn test_resolution_requires_pending_verdict_to_be_terminal() {
        let (mut store, org, wallet_id) = seed(dec!(100));
        let id = create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(25), "bob")).unwrap();

        let result =
            resolve_transaction(&mut store, org, wallet_id, id, "bob", TransactionState::Pending);
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn test_member_cannot_resolve() {
        let (mut store, org, wallet_id) = seed(dec!(100));
        let id = create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(25), "bob")).unwrap();

        let result =
            resolve_transaction(&mut store, org, wallet_id, id, "carol", TransactionState::Approved);
        assert!(matches!(result, Err(WorkflowError::Forbidden)));
    }

    #[test]
    fn test_competing_approvals_cannot_overdraw() {
        // Two outgoing transactions, each individually covered at creation,
        // together exceeding the balance. Pending rows do not move the
        // balance, so both are accepted; the second approval must then fail
        // with the transaction still Pending.
        let (mut store, org, wallet_id) = seed(dec!(100));
        let first = create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(70), "bob")).unwrap();
        let second = create_transaction(&mut store, org, wallet_id, "alice", &outgoing(dec!(60), "bob")).unwrap();

        resolve_transaction(&mut store, org, wallet_id, first, "bob", TransactionState::Approved)
            .unwrap();
        let result =
            resolve_transaction(&mut store, org, wallet_id, second, "bob", TransactionState::Approved);
        assert!(matches!(result, Err(WorkflowError::InsufficientBalance)));

        let wallet = wallet::get(store.conn(), org, wallet_id).unwrap().unwrap();
        assert_eq!(wallet.balance, dec!(30));
        let txn = get_transaction(&store, org, wallet_id, second, "alice").unwrap();
        assert_eq!(txn.state, TransactionState::Pending);

        // Rejecting it instead is still allowed.
        resolve_transaction(&mut store, org, wallet_id, second, "bob", TransactionState::Rejected)
            .unwrap();
    }
}
