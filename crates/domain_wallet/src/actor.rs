//! Actors: the admin, agents and users that own wallets
//!
//! Fee and commission rates are copied onto the actor record when it is
//! created and are never recomputed, so a later configuration change does
//! not alter the terms of an existing actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ActorId, Rate, WalletId};

use crate::error::LedgerError;

/// Role of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Agent,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status of an actor
///
/// Agents start `Pending` and may already transact; `Suspended` agents may
/// not. Users and the admin are created `Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Suspended,
}

impl ApprovalStatus {
    pub fn can_transact(&self) -> bool {
        !matches!(self, ApprovalStatus::Suspended)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// An account holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub approval: ApprovalStatus,
    /// Per-mille fee charged to this actor, pinned at creation
    pub fee_rate: Rate,
    /// Per-mille commission earned by this actor, pinned at creation
    pub commission_rate: Rate,
    pub wallet_id: WalletId,
    pub created_at: DateTime<Utc>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Fails with `RoleNotPermitted` unless the actor has `role`
    pub fn ensure_role(&self, role: Role) -> Result<(), LedgerError> {
        if self.role == role {
            Ok(())
        } else {
            Err(LedgerError::role_not_permitted(format!(
                "actor {} has role {}, expected {}",
                self.id, self.role, role
            )))
        }
    }

    /// Fails unless the actor is an agent allowed to move money
    pub fn ensure_transacting_agent(&self) -> Result<(), LedgerError> {
        self.ensure_role(Role::Agent)?;
        if !self.approval.can_transact() {
            return Err(LedgerError::ActorNotApproved(self.id));
        }
        Ok(())
    }
}

/// Registration request for a new user or agent
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAccount {
    #[validate(length(min = 2, max = 100, message = "name must be 2 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    pub phone: String,
    pub role: Role,
}

impl NewAccount {
    /// Runs field validation and the phone number format check
    pub fn check(&self) -> Result<(), LedgerError> {
        self.validate()?;
        if !is_valid_phone(&self.phone) {
            return Err(LedgerError::validation(format!(
                "invalid phone number: {}",
                self.phone
            )));
        }
        if self.role == Role::Admin {
            return Err(LedgerError::role_not_permitted(
                "admin accounts cannot be registered",
            ));
        }
        Ok(())
    }
}

/// Bangladeshi mobile number: `01` or `+8801` followed by nine digits
pub fn is_valid_phone(phone: &str) -> bool {
    let rest = if let Some(rest) = phone.strip_prefix("+8801") {
        rest
    } else if let Some(rest) = phone.strip_prefix("01") {
        rest
    } else {
        return false;
    };
    rest.len() == 9 && rest.bytes().all(|b| b.is_ascii_digit())
}
