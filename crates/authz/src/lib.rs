//! Purse Authz - per-request authorization
//!
//! Evaluates "may this user do X in this organization?" against the
//! membership roster and the static capability table. The guard is
//! read-only and cheap, so callers run it as often as they need - including
//! a second time with an untrusted subject, e.g. to vet a proposed reviewer.
//!
//! # Failure semantics
//! - No membership row (or no such organization): `NotFound`. The two cases
//!   are deliberately indistinguishable so callers cannot probe for tenant
//!   existence.
//! - Membership row carries a role string the policy table does not know:
//!   `UnknownRole` - an internal error, logged, never attributed to caller
//!   input. Authorization fails closed.
//! - Capability predicate is false: `Forbidden`.

pub mod error;
pub mod guard;
pub mod membership;

pub use error::AuthzError;
pub use guard::require_authorization;
pub use membership::{Membership, RosterEntry};
