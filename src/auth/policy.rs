//! Role-based authorization decisions.
//!
//! `decide` is a pure function over the caller, the requested operation and
//! (where relevant) the target. Rules are checked in a fixed order and the
//! first failing rule is the reason reported to the caller. Vault entries are
//! gated on ownership alone; role never grants access to another account's
//! secrets.

use std::fmt;

use crate::error::LockboxError;
use crate::types::{Account, AccountId, Role};

#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    ListAccounts,
    CreateAccount {
        role: Role,
    },
    UpdateAccount {
        target: &'a Account,
        new_role: Option<Role>,
    },
    DeleteAccount {
        target_id: AccountId,
    },
    AccessEntry {
        owner_id: AccountId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    RequiresAdmin,
    RequiresSuperAdminToGrant,
    ProtectedSuperAdmin,
    RequiresSuperAdminToDelete,
    SelfDelete,
    NotOwner,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DenyReason::RequiresAdmin => "admin or super-admin role required",
            DenyReason::RequiresSuperAdminToGrant => {
                "only a super-admin can grant the admin or super-admin role"
            }
            DenyReason::ProtectedSuperAdmin => "only a super-admin can modify a super-admin account",
            DenyReason::RequiresSuperAdminToDelete => "only a super-admin can delete accounts",
            DenyReason::SelfDelete => "an account cannot delete itself",
            DenyReason::NotOwner => "entry belongs to another account",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

pub fn decide(caller: &Account, operation: Operation<'_>) -> Decision {
    match operation {
        Operation::ListAccounts => require_privileged(caller.role),
        Operation::CreateAccount { role } => match require_privileged(caller.role) {
            Decision::Allow => require_grant(caller.role, role),
            deny => deny,
        },
        Operation::UpdateAccount { target, new_role } => {
            if let deny @ Decision::Deny(_) = require_privileged(caller.role) {
                return deny;
            }
            match (target.role, caller.role) {
                (Role::SuperAdmin, Role::User | Role::Admin) => {
                    return Decision::Deny(DenyReason::ProtectedSuperAdmin);
                }
                (Role::SuperAdmin, Role::SuperAdmin) | (Role::User | Role::Admin, _) => {}
            }
            match new_role {
                Some(role) => require_grant(caller.role, role),
                None => Decision::Allow,
            }
        }
        Operation::DeleteAccount { target_id } => match caller.role {
            Role::User | Role::Admin => Decision::Deny(DenyReason::RequiresSuperAdminToDelete),
            Role::SuperAdmin if target_id == caller.id => Decision::Deny(DenyReason::SelfDelete),
            Role::SuperAdmin => Decision::Allow,
        },
        Operation::AccessEntry { owner_id } => {
            if owner_id == caller.id {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotOwner)
            }
        }
    }
}

/// `decide`, surfaced as a `Forbidden` error on denial.
pub fn authorize(caller: &Account, operation: Operation<'_>) -> Result<(), LockboxError> {
    match decide(caller, operation) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(LockboxError::Forbidden(reason)),
    }
}

/// First rule shared by create and update: the caller manages accounts at
/// all. Lets handlers refuse before reading the request body.
pub fn require_account_manager(caller: &Account) -> Result<(), LockboxError> {
    match require_privileged(caller.role) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(LockboxError::Forbidden(reason)),
    }
}

fn require_privileged(role: Role) -> Decision {
    if role.is_privileged() {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RequiresAdmin)
    }
}

fn require_grant(caller: Role, granted: Role) -> Decision {
    match (granted, caller) {
        (Role::User, _) => Decision::Allow,
        (Role::Admin | Role::SuperAdmin, Role::SuperAdmin) => Decision::Allow,
        (Role::Admin | Role::SuperAdmin, Role::User | Role::Admin) => {
            Decision::Deny(DenyReason::RequiresSuperAdminToGrant)
        }
    }
}
