//! Account DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_wallet::{Actor, ApprovalStatus, NewAccount, Role};

use super::transactions::TransactionResponse;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// `user` when omitted
    pub role: Option<Role>,
}

impl From<RegisterRequest> for NewAccount {
    fn from(request: RegisterRequest) -> Self {
        NewAccount {
            name: request.name,
            email: request.email,
            phone: request.phone,
            role: request.role.unwrap_or(Role::User),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub approval: ApprovalStatus,
    /// Cash-out fee, per mille
    pub fee_rate: Decimal,
    /// Cash-in commission, per mille
    pub commission_rate: Decimal,
    pub wallet_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Actor> for ActorResponse {
    fn from(actor: Actor) -> Self {
        Self {
            id: actor.id.into(),
            name: actor.name,
            email: actor.email,
            phone: actor.phone,
            role: actor.role,
            approval: actor.approval,
            fee_rate: actor.fee_rate.as_per_mille(),
            commission_rate: actor.commission_rate.as_per_mille(),
            wallet_id: actor.wallet_id.into(),
            created_at: actor.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub actor: ActorResponse,
    pub access_token: String,
    pub balance: Decimal,
    /// Funding entries on the new wallet
    pub entries: Vec<TransactionResponse>,
}
