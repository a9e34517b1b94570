//! Row <-> domain conversions for the ledger adapter

use uuid::Uuid;

use core_kernel::{ActorId, Currency, Money, Rate, TransactionId, WalletId};
use domain_wallet::{
    Actor, ApprovalStatus, LedgerError, NewTransaction, Role, SortOrder, Transaction,
    TransactionKind, TransactionQuery, TransactionStatus, Wallet, WalletStatus,
};

use crate::repositories::actors::{ActorRow, DbApproval, DbRole};
use crate::repositories::transactions::{
    DbTransactionKind, DbTransactionStatus, NewTransactionRow, TransactionFilter, TransactionRow,
};
use crate::repositories::wallets::{DbWalletStatus, WalletRow};

// ============================================================================
// Enums
// ============================================================================

impl From<Role> for DbRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => DbRole::Admin,
            Role::Agent => DbRole::Agent,
            Role::User => DbRole::User,
        }
    }
}

impl From<DbRole> for Role {
    fn from(role: DbRole) -> Self {
        match role {
            DbRole::Admin => Role::Admin,
            DbRole::Agent => Role::Agent,
            DbRole::User => Role::User,
        }
    }
}

impl From<ApprovalStatus> for DbApproval {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => DbApproval::Pending,
            ApprovalStatus::Approved => DbApproval::Approved,
            ApprovalStatus::Suspended => DbApproval::Suspended,
        }
    }
}

impl From<DbApproval> for ApprovalStatus {
    fn from(status: DbApproval) -> Self {
        match status {
            DbApproval::Pending => ApprovalStatus::Pending,
            DbApproval::Approved => ApprovalStatus::Approved,
            DbApproval::Suspended => ApprovalStatus::Suspended,
        }
    }
}

impl From<WalletStatus> for DbWalletStatus {
    fn from(status: WalletStatus) -> Self {
        match status {
            WalletStatus::Active => DbWalletStatus::Active,
            WalletStatus::Blocked => DbWalletStatus::Blocked,
        }
    }
}

impl From<DbWalletStatus> for WalletStatus {
    fn from(status: DbWalletStatus) -> Self {
        match status {
            DbWalletStatus::Active => WalletStatus::Active,
            DbWalletStatus::Blocked => WalletStatus::Blocked,
        }
    }
}

impl From<TransactionKind> for DbTransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::AddMoney => DbTransactionKind::AddMoney,
            TransactionKind::Withdraw => DbTransactionKind::Withdraw,
            TransactionKind::SendMoney => DbTransactionKind::SendMoney,
            TransactionKind::ReceiveMoney => DbTransactionKind::ReceiveMoney,
            TransactionKind::CashIn => DbTransactionKind::CashIn,
            TransactionKind::CashOut => DbTransactionKind::CashOut,
            TransactionKind::Fee => DbTransactionKind::Fee,
            TransactionKind::Commission => DbTransactionKind::Commission,
            TransactionKind::InitialFunding => DbTransactionKind::InitialFunding,
        }
    }
}

impl From<DbTransactionKind> for TransactionKind {
    fn from(kind: DbTransactionKind) -> Self {
        match kind {
            DbTransactionKind::AddMoney => TransactionKind::AddMoney,
            DbTransactionKind::Withdraw => TransactionKind::Withdraw,
            DbTransactionKind::SendMoney => TransactionKind::SendMoney,
            DbTransactionKind::ReceiveMoney => TransactionKind::ReceiveMoney,
            DbTransactionKind::CashIn => TransactionKind::CashIn,
            DbTransactionKind::CashOut => TransactionKind::CashOut,
            DbTransactionKind::Fee => TransactionKind::Fee,
            DbTransactionKind::Commission => TransactionKind::Commission,
            DbTransactionKind::InitialFunding => TransactionKind::InitialFunding,
        }
    }
}

impl From<TransactionStatus> for DbTransactionStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => DbTransactionStatus::Pending,
            TransactionStatus::Success => DbTransactionStatus::Success,
            TransactionStatus::Failed => DbTransactionStatus::Failed,
        }
    }
}

impl From<DbTransactionStatus> for TransactionStatus {
    fn from(status: DbTransactionStatus) -> Self {
        match status {
            DbTransactionStatus::Pending => TransactionStatus::Pending,
            DbTransactionStatus::Success => TransactionStatus::Success,
            DbTransactionStatus::Failed => TransactionStatus::Failed,
        }
    }
}

// ============================================================================
// Records
// ============================================================================

pub(crate) fn actor_from_row(row: ActorRow) -> Result<Actor, LedgerError> {
    Ok(Actor {
        id: ActorId::from_uuid(row.actor_id),
        name: row.name,
        email: row.email,
        phone: row.phone,
        role: row.role.into(),
        approval: row.approval.into(),
        fee_rate: Rate::per_mille(row.fee_rate)?,
        commission_rate: Rate::per_mille(row.commission_rate)?,
        wallet_id: WalletId::from_uuid(row.wallet_id),
        created_at: row.created_at,
    })
}

pub(crate) fn actor_to_row(actor: &Actor) -> ActorRow {
    ActorRow {
        actor_id: actor.id.into(),
        name: actor.name.clone(),
        email: actor.email.clone(),
        phone: actor.phone.clone(),
        role: actor.role.into(),
        approval: actor.approval.into(),
        fee_rate: actor.fee_rate.as_per_mille(),
        commission_rate: actor.commission_rate.as_per_mille(),
        wallet_id: actor.wallet_id.into(),
        created_at: actor.created_at,
    }
}

pub(crate) fn wallet_from_row(row: WalletRow) -> Result<Wallet, LedgerError> {
    let currency: Currency = row.currency.parse()?;
    Ok(Wallet {
        id: WalletId::from_uuid(row.wallet_id),
        owner_id: ActorId::from_uuid(row.owner_id),
        balance: Money::new(row.balance, currency),
        status: row.status.into(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn wallet_to_row(wallet: &Wallet) -> WalletRow {
    WalletRow {
        wallet_id: wallet.id.into(),
        owner_id: wallet.owner_id.into(),
        balance: wallet.balance.amount(),
        currency: wallet.balance.currency().code().to_string(),
        status: wallet.status.into(),
        created_at: wallet.created_at,
        updated_at: wallet.updated_at,
    }
}

pub(crate) fn transaction_from_row(row: TransactionRow) -> Result<Transaction, LedgerError> {
    let currency: Currency = row.currency.parse()?;
    Ok(Transaction {
        id: TransactionId::from_uuid(row.transaction_id),
        kind: row.kind.into(),
        status: row.status.into(),
        amount: Money::new(row.amount, currency),
        fee: Money::new(row.fee, currency),
        commission: Money::new(row.commission, currency),
        wallet_id: WalletId::from_uuid(row.wallet_id),
        from_wallet_id: row.from_wallet_id.map(WalletId::from_uuid),
        to_wallet_id: row.to_wallet_id.map(WalletId::from_uuid),
        initiated_by: ActorId::from_uuid(row.initiated_by),
        resulting_balance: Money::new(row.resulting_balance, currency),
        note: row.note,
        created_at: row.created_at,
    })
}

pub(crate) fn new_transaction_row(entry: NewTransaction) -> NewTransactionRow {
    NewTransactionRow {
        transaction_id: TransactionId::new_v7().into(),
        kind: entry.kind.into(),
        status: DbTransactionStatus::Success,
        currency: entry.amount.currency().code().to_string(),
        amount: entry.amount.amount(),
        fee: entry.fee.amount(),
        commission: entry.commission.amount(),
        wallet_id: entry.wallet_id.into(),
        from_wallet_id: entry.from_wallet_id.map(Uuid::from),
        to_wallet_id: entry.to_wallet_id.map(Uuid::from),
        initiated_by: entry.initiated_by.into(),
        resulting_balance: entry.resulting_balance.amount(),
        note: entry.note,
    }
}

pub(crate) fn filter_from_query(query: &TransactionQuery) -> TransactionFilter {
    TransactionFilter {
        wallet_ids: query.wallets.iter().map(|w| Uuid::from(*w)).collect(),
        kind: query.kind.map(DbTransactionKind::from),
        status: query.status.map(DbTransactionStatus::from),
        from: query.from,
        to: query.to,
        ascending: query.sort == SortOrder::Ascending,
        limit: i64::from(query.pagination.limit),
        offset: i64::try_from(query.pagination.offset()).unwrap_or(i64::MAX),
    }
}
