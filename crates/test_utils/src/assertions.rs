//! Custom Test Assertions
//!
//! Assertion helpers for money values and whole-ledger invariants, with
//! failure messages that name the offending wallet or entry.

use core_kernel::{Money, WalletId};
use domain_wallet::{InMemoryLedgerStore, LedgerReceipt, TransactionKind};
use rust_decimal::Decimal;

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that money values sum to a total
///
/// # Panics
///
/// Panics if the currencies differ or the sum doesn't equal the total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = parts.iter().fold(Money::zero(total.currency()), |acc, m| {
        acc.checked_add(m).expect("Currency mismatch in sum")
    });

    assert_eq!(
        sum.amount(),
        total.amount(),
        "Sum of parts ({}) doesn't equal total ({})",
        sum.amount(),
        total.amount()
    );
}

/// Asserts that no wallet in the store holds a negative balance
pub async fn assert_no_negative_balances(store: &InMemoryLedgerStore) {
    for wallet in store.wallets().await {
        assert!(
            !wallet.balance.is_negative(),
            "Wallet {} has negative balance {}",
            wallet.id,
            wallet.balance.amount()
        );
    }
}

/// Asserts that the sum of all wallet balances equals `expected`
///
/// Internal movements never change the total; only top-ups, withdrawals
/// and the seeded float do.
pub async fn assert_total_balance(store: &InMemoryLedgerStore, expected: Decimal) {
    let total: Decimal = store
        .wallets()
        .await
        .iter()
        .map(|w| w.balance.amount())
        .sum();
    assert_eq!(
        total, expected,
        "Total balance {} doesn't equal expected {}",
        total, expected
    );
}

/// Asserts that replaying a wallet's entries reproduces its balance
pub async fn assert_wallet_reconciles(store: &InMemoryLedgerStore, wallet: WalletId) {
    let replayed: Decimal = store
        .transactions()
        .await
        .iter()
        .filter(|t| t.wallet_id == wallet)
        .map(|t| t.signed_delta())
        .sum();
    let actual = store
        .wallets()
        .await
        .into_iter()
        .find(|w| w.id == wallet)
        .map(|w| w.balance.amount())
        .unwrap_or_else(|| panic!("Wallet {} not found", wallet));
    assert_eq!(
        replayed, actual,
        "Wallet {} entries sum to {} but balance is {}",
        wallet, replayed, actual
    );
}

/// Asserts that a receipt wrote exactly these entry kinds, in order
pub fn assert_entry_kinds(receipt: &LedgerReceipt, expected: &[TransactionKind]) {
    let kinds: Vec<TransactionKind> = receipt.entries.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds, expected,
        "Receipt entries {:?} don't match expected {:?}",
        kinds, expected
    );
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!("Expected Err matching {}, got Ok({:?})", stringify!($pattern), value),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}
