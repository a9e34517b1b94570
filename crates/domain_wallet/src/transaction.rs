//! Ledger entries
//!
//! Entries are append-only. Each one snapshots the balance of exactly one
//! wallet (`wallet_id`) right after the movement it records, and names both
//! sides of the movement through `from_wallet_id` / `to_wallet_id`. A side
//! is `None` when money enters or leaves the system.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ActorId, Currency, Money, TransactionId, WalletId};

/// Kind of money movement recorded by an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    AddMoney,
    Withdraw,
    SendMoney,
    ReceiveMoney,
    CashIn,
    CashOut,
    Fee,
    Commission,
    InitialFunding,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 9] = [
        TransactionKind::AddMoney,
        TransactionKind::Withdraw,
        TransactionKind::SendMoney,
        TransactionKind::ReceiveMoney,
        TransactionKind::CashIn,
        TransactionKind::CashOut,
        TransactionKind::Fee,
        TransactionKind::Commission,
        TransactionKind::InitialFunding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::AddMoney => "add_money",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::SendMoney => "send_money",
            TransactionKind::ReceiveMoney => "receive_money",
            TransactionKind::CashIn => "cash_in",
            TransactionKind::CashOut => "cash_out",
            TransactionKind::Fee => "fee",
            TransactionKind::Commission => "commission",
            TransactionKind::InitialFunding => "initial_funding",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown transaction kind: {}", s))
    }
}

/// Status of an entry; the engine only writes `Success`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "success" => Ok(TransactionStatus::Success),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// A committed ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: Money,
    pub fee: Money,
    pub commission: Money,
    /// Wallet whose balance `resulting_balance` snapshots
    pub wallet_id: WalletId,
    pub from_wallet_id: Option<WalletId>,
    pub to_wallet_id: Option<WalletId>,
    pub initiated_by: ActorId,
    pub resulting_balance: Money,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Signed effect of this entry on `wallet_id`
    ///
    /// Outgoing entries (the entry's wallet is the `from` side) debit the
    /// amount plus any fee; every other entry credits the amount.
    pub fn signed_delta(&self) -> Decimal {
        if self.from_wallet_id == Some(self.wallet_id) {
            -(self.amount.amount() + self.fee.amount())
        } else {
            self.amount.amount()
        }
    }
}

/// An entry ready to be appended to the log
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub fee: Money,
    pub commission: Money,
    pub wallet_id: WalletId,
    pub from_wallet_id: Option<WalletId>,
    pub to_wallet_id: Option<WalletId>,
    pub initiated_by: ActorId,
    pub resulting_balance: Money,
    pub note: Option<String>,
}

impl NewTransaction {
    /// Creates an entry with zero fee and commission
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        wallet_id: WalletId,
        initiated_by: ActorId,
        resulting_balance: Money,
    ) -> Self {
        let currency: Currency = amount.currency();
        Self {
            kind,
            amount,
            fee: Money::zero(currency),
            commission: Money::zero(currency),
            wallet_id,
            from_wallet_id: None,
            to_wallet_id: None,
            initiated_by,
            resulting_balance,
            note: None,
        }
    }

    pub fn from_wallet(mut self, wallet: WalletId) -> Self {
        self.from_wallet_id = Some(wallet);
        self
    }

    pub fn to_wallet(mut self, wallet: WalletId) -> Self {
        self.to_wallet_id = Some(wallet);
        self
    }

    pub fn with_fee(mut self, fee: Money) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_commission(mut self, commission: Money) -> Self {
        self.commission = commission;
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Materializes the entry as a successful transaction
    pub fn into_transaction(self, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: TransactionId::new_v7(),
            kind: self.kind,
            status: TransactionStatus::Success,
            amount: self.amount,
            fee: self.fee,
            commission: self.commission,
            wallet_id: self.wallet_id,
            from_wallet_id: self.from_wallet_id,
            to_wallet_id: self.to_wallet_id,
            initiated_by: self.initiated_by,
            resulting_balance: self.resulting_balance,
            note: self.note,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_parse_round_trip() {
        for kind in TransactionKind::ALL {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
        assert!("refund".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_signed_delta_for_debit_with_fee() {
        let user = WalletId::new();
        let agent = WalletId::new();
        let entry = NewTransaction::new(
            TransactionKind::CashOut,
            Money::new(dec!(1000), Currency::BDT),
            user,
            ActorId::new(),
            Money::new(dec!(0), Currency::BDT),
        )
        .from_wallet(user)
        .to_wallet(agent)
        .with_fee(Money::new(dec!(20), Currency::BDT))
        .into_transaction(Utc::now());

        assert_eq!(entry.signed_delta(), dec!(-1020));
        assert_eq!(entry.status, TransactionStatus::Success);
    }

    #[test]
    fn test_signed_delta_for_external_credit() {
        let wallet = WalletId::new();
        let entry = NewTransaction::new(
            TransactionKind::AddMoney,
            Money::new(dec!(50), Currency::BDT),
            wallet,
            ActorId::new(),
            Money::new(dec!(50), Currency::BDT),
        )
        .to_wallet(wallet)
        .into_transaction(Utc::now());

        assert_eq!(entry.signed_delta(), dec!(50));
    }
}
