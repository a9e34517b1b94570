//! Read-only aggregates over wallets and the transaction log

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, TransactionKind};
use crate::wallet::{Wallet, WalletStatus};

/// Totals per transaction kind plus collected fees and paid commissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_add_money: Decimal,
    pub total_withdraw: Decimal,
    pub total_send_money: Decimal,
    pub total_receive_money: Decimal,
    pub total_cash_in: Decimal,
    pub total_cash_out: Decimal,
    pub total_initial_funding: Decimal,
    pub total_fee: Decimal,
    pub total_commission: Decimal,
    pub count: u64,
}

impl TransactionSummary {
    /// Folds one entry into the totals
    ///
    /// Fees are counted from the debit-side entries that carry them, and
    /// commissions from the `Commission` credit entries, so neither is
    /// double counted.
    pub fn accumulate(&mut self, entry: &Transaction) {
        self.record(entry.kind, entry.amount.amount(), entry.fee.amount(), 1);
    }

    /// Folds pre-aggregated totals for one kind
    pub fn record(&mut self, kind: TransactionKind, amount: Decimal, fee: Decimal, count: u64) {
        match kind {
            TransactionKind::AddMoney => self.total_add_money += amount,
            TransactionKind::Withdraw => self.total_withdraw += amount,
            TransactionKind::SendMoney => self.total_send_money += amount,
            TransactionKind::ReceiveMoney => self.total_receive_money += amount,
            TransactionKind::CashIn => self.total_cash_in += amount,
            TransactionKind::CashOut => self.total_cash_out += amount,
            TransactionKind::InitialFunding => self.total_initial_funding += amount,
            TransactionKind::Commission => self.total_commission += amount,
            TransactionKind::Fee => {}
        }
        self.total_fee += fee;
        self.count += count;
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            summary.accumulate(entry);
        }
        summary
    }
}

/// Wallet population and aggregate balance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletStatistics {
    pub total_wallets: u64,
    pub total_balance: Decimal,
    pub active_wallets: u64,
    pub blocked_wallets: u64,
}

impl WalletStatistics {
    pub fn from_wallets<'a>(wallets: impl IntoIterator<Item = &'a Wallet>) -> Self {
        let mut stats = Self::default();
        for wallet in wallets {
            stats.total_wallets += 1;
            stats.total_balance += wallet.balance.amount();
            match wallet.status {
                WalletStatus::Active => stats.active_wallets += 1,
                WalletStatus::Blocked => stats.blocked_wallets += 1,
            }
        }
        stats
    }
}

/// Dashboard view for the calling actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub wallet_balance: Decimal,
    pub total_users: u64,
    pub total_agents: u64,
    pub total_transactions: u64,
}

/// Transaction volume on one wallet over the trailing 7 and 30 days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub last_7_days: Decimal,
    pub last_30_days: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{ActorId, Currency, Money, WalletId};
    use rust_decimal_macros::dec;

    use crate::transaction::NewTransaction;

    fn entry(kind: TransactionKind, amount: Decimal, fee: Decimal) -> Transaction {
        let wallet = WalletId::new();
        NewTransaction::new(
            kind,
            Money::new(amount, Currency::BDT),
            wallet,
            ActorId::new(),
            Money::zero(Currency::BDT),
        )
        .with_fee(Money::new(fee, Currency::BDT))
        .into_transaction(Utc::now())
    }

    #[test]
    fn test_summary_accumulates_by_kind() {
        let entries = vec![
            entry(TransactionKind::CashOut, dec!(1000), dec!(20)),
            entry(TransactionKind::ReceiveMoney, dec!(1000), dec!(0)),
            entry(TransactionKind::Fee, dec!(20), dec!(0)),
            entry(TransactionKind::AddMoney, dec!(50), dec!(0)),
            entry(TransactionKind::Commission, dec!(5), dec!(0)),
        ];
        let summary = TransactionSummary::from_entries(&entries);

        assert_eq!(summary.total_cash_out, dec!(1000));
        assert_eq!(summary.total_receive_money, dec!(1000));
        assert_eq!(summary.total_add_money, dec!(50));
        assert_eq!(summary.total_fee, dec!(20));
        assert_eq!(summary.total_commission, dec!(5));
        assert_eq!(summary.count, 5);
    }

    #[test]
    fn test_summary_records_grouped_totals() {
        let mut summary = TransactionSummary::default();
        summary.record(TransactionKind::CashOut, dec!(3000), dec!(60), 3);
        summary.record(TransactionKind::Fee, dec!(60), dec!(0), 3);

        assert_eq!(summary.total_cash_out, dec!(3000));
        assert_eq!(summary.total_fee, dec!(60));
        assert_eq!(summary.count, 6);
    }

    #[test]
    fn test_wallet_statistics() {
        let mut a = Wallet::open(ActorId::new(), Currency::BDT);
        a.balance = Money::new(dec!(10), Currency::BDT);
        let mut b = Wallet::open(ActorId::new(), Currency::BDT);
        b.balance = Money::new(dec!(15.5), Currency::BDT);
        b.status = WalletStatus::Blocked;

        let stats = WalletStatistics::from_wallets(&[a, b]);
        assert_eq!(stats.total_wallets, 2);
        assert_eq!(stats.total_balance, dec!(25.5));
        assert_eq!(stats.active_wallets, 1);
        assert_eq!(stats.blocked_wallets, 1);
    }
}
