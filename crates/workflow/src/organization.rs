//! Organization lifecycle and roster management

use crate::error::{ValidationErrors, WorkflowError};
use purse_audit::{self as audit, AuditAction, AuditRecord, ObjectKind};
use purse_authz::{membership, require_authorization, RosterEntry};
use purse_core::Role;
use purse_store::{organization, transaction, wallet, Organization, Store, Transaction, Wallet};

/// A roster line submitted when updating an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSpec {
    pub username: String,
    pub role: Role,
}

/// Everything the organization landing view needs, fetched in one pass.
#[derive(Debug, Clone)]
pub struct OrganizationOverview {
    pub organization: Organization,
    pub membership: purse_authz::Membership,
    pub wallets: Vec<Wallet>,
    pub roster: Vec<RosterEntry>,
    pub recent_transactions: Vec<Transaction>,
}

/// Create an organization with `owner` as its sole Owner member.
pub fn create_organization(
    store: &mut Store,
    owner: &str,
    name: &str,
) -> Result<i64, WorkflowError> {
    if name.trim().is_empty() {
        return Err(WorkflowError::field("name", "Name is required"));
    }

    store.with_write_tx(|tx| {
        let id = organization::insert(tx, name)?;
        membership::upsert(tx, id, owner, Role::Owner)?;
        audit::record(
            tx,
            owner,
            id,
            ObjectKind::Organization,
            id,
            AuditAction::Create,
            "Created organization",
        )?;
        tracing::info!(organization_id = id, owner, "organization created");
        Ok(id)
    })
}

/// Rename the organization and replace its roster in one atomic unit.
///
/// The caller's own membership row is never touched, so the capability that
/// admitted them cannot be revoked mid-request. Completing this operation
/// marks initial setup as done.
pub fn update_organization(
    store: &mut Store,
    organization_id: i64,
    caller: &str,
    name: &str,
    members: &[MemberSpec],
) -> Result<(), WorkflowError> {
    let mut errors = ValidationErrors::new();
    if name.trim().is_empty() {
        errors.push("name", "Name is required");
    }
    for (i, member) in members.iter().enumerate() {
        if member.username.trim().is_empty() {
            errors.push(&format!("members.{i}.username"), "Username is required");
        } else if member.username == caller {
            errors.push(
                &format!("members.{i}.username"),
                "You cannot edit your own membership",
            );
        }
    }
    errors.into_result()?;

    store.with_write_tx(|tx| {
        require_authorization(tx, caller, organization_id, |p| {
            p.allow_update_organization
        })?;

        if !organization::rename(tx, organization_id, name)? {
            return Err(WorkflowError::NotFound);
        }
        membership::remove_all_except(tx, organization_id, caller)?;
        for member in members {
            membership::upsert(tx, organization_id, &member.username, member.role)?;
        }
        organization::mark_setup_complete(tx, organization_id)?;

        audit::record(
            tx,
            caller,
            organization_id,
            ObjectKind::Organization,
            organization_id,
            AuditAction::Update,
            "Updated organization details and members",
        )?;
        Ok(())
    })
}

/// Remove the caller's own membership.
///
/// Any member may leave except the Owner, who must transfer ownership
/// first; an organization without an Owner would be unmanageable.
pub fn leave_organization(
    store: &mut Store,
    organization_id: i64,
    caller: &str,
) -> Result<(), WorkflowError> {
    store.with_write_tx(|tx| {
        let membership = require_authorization(tx, caller, organization_id, |_| true)?;
        if membership.role == Role::Owner {
            return Err(WorkflowError::OwnerCannotLeave);
        }
        membership::remove(tx, organization_id, caller)?;
        tracing::info!(organization_id, username = caller, "member left");
        Ok(())
    })
}

/// Read the organization's audit log, newest first.
pub fn audit_log(
    store: &Store,
    organization_id: i64,
    caller: &str,
) -> Result<Vec<AuditRecord>, WorkflowError> {
    require_authorization(store.conn(), caller, organization_id, |p| {
        p.allow_read_audit_log
    })?;
    Ok(audit::list_for_organization(store.conn(), organization_id)?)
}

/// Fetch the landing view for a member: organization, wallets, roster, and
/// the most recent transactions across all wallets.
pub fn overview(
    store: &Store,
    organization_id: i64,
    caller: &str,
    recent_limit: usize,
) -> Result<OrganizationOverview, WorkflowError> {
    let conn = store.conn();
    let membership = require_authorization(conn, caller, organization_id, |_| true)?;
    let organization = organization::get(conn, organization_id)?.ok_or(WorkflowError::NotFound)?;

    Ok(OrganizationOverview {
        organization,
        membership,
        wallets: wallet::list_for_organization(conn, organization_id)?,
        roster: membership::list(conn, organization_id)?,
        recent_transactions: transaction::list_recent_for_organization(
            conn,
            organization_id,
            recent_limit,
        )?,
    })
}
