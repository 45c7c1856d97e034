//! Wallet operations

use crate::error::{ValidationErrors, WorkflowError};
use purse_audit::{self as audit, AuditAction, ObjectKind};
use purse_authz::require_authorization;
use purse_core::{Amount, AmountError};
use purse_store::{wallet, Store, Wallet};
use rust_decimal::Decimal;

fn validate_wallet_input(name: &str, balance: Decimal) -> Result<Amount, WorkflowError> {
    let mut errors = ValidationErrors::new();
    if name.trim().is_empty() {
        errors.push("name", "Name is required");
    }
    let amount = match Amount::new(balance) {
        Ok(amount) => Some(amount),
        Err(AmountError::Negative(_)) => {
            errors.push("balance", "Balance must be greater than or equal to 0");
            None
        }
        Err(AmountError::TooPrecise(_)) => {
            errors.push("balance", "Balance cannot have more than 2 decimal places");
            None
        }
    };
    errors.into_result()?;
    // into_result returned Err for every branch that left this as None
    Ok(amount.unwrap_or(Amount::ZERO))
}

/// Create a wallet with an initial balance and return its id.
pub fn create_wallet(
    store: &mut Store,
    organization_id: i64,
    caller: &str,
    name: &str,
    initial_balance: Decimal,
) -> Result<i64, WorkflowError> {
    let amount = validate_wallet_input(name, initial_balance)?;

    store.with_write_tx(|tx| {
        require_authorization(tx, caller, organization_id, |p| p.allow_create_wallets)?;

        let id = wallet::insert(tx, organization_id, name, amount.value())?;
        audit::record(
            tx,
            caller,
            organization_id,
            ObjectKind::Wallet,
            id,
            AuditAction::Create,
            &format!("Created wallet {name}"),
        )?;
        tracing::info!(organization_id, wallet_id = id, "wallet created");
        Ok(id)
    })
}

/// Rename a wallet. The balance is never editable after creation; it only
/// moves through approved transactions.
pub fn rename_wallet(
    store: &mut Store,
    organization_id: i64,
    wallet_id: i64,
    caller: &str,
    name: &str,
) -> Result<(), WorkflowError> {
    if name.trim().is_empty() {
        return Err(WorkflowError::field("name", "Name is required"));
    }

    store.with_write_tx(|tx| {
        require_authorization(tx, caller, organization_id, |p| p.allow_update_wallets)?;

        if !wallet::rename(tx, organization_id, wallet_id, name)? {
            return Err(WorkflowError::NotFound);
        }
        audit::record(
            tx,
            caller,
            organization_id,
            ObjectKind::Wallet,
            wallet_id,
            AuditAction::Update,
            &format!("Renamed wallet to {name}"),
        )?;
        Ok(())
    })
}

/// Delete a wallet along with its transactions.
pub fn delete_wallet(
    store: &mut Store,
    organization_id: i64,
    wallet_id: i64,
    caller: &str,
) -> Result<(), WorkflowError> {
    store.with_write_tx(|tx| {
        require_authorization(tx, caller, organization_id, |p| p.allow_delete_wallets)?;

        if !wallet::delete(tx, organization_id, wallet_id)? {
            return Err(WorkflowError::NotFound);
        }
        audit::record(
            tx,
            caller,
            organization_id,
            ObjectKind::Wallet,
            wallet_id,
            AuditAction::Delete,
            "Deleted wallet",
        )?;
        tracing::info!(organization_id, wallet_id, "wallet deleted");
        Ok(())
    })
}

/// Fetch one wallet; any member of the organization may read it.
pub fn get_wallet(
    store: &Store,
    organization_id: i64,
    wallet_id: i64,
    caller: &str,
) -> Result<Wallet, WorkflowError> {
    require_authorization(store.conn(), caller, organization_id, |_| true)?;
    wallet::get(store.conn(), organization_id, wallet_id)?.ok_or(WorkflowError::NotFound)
}
