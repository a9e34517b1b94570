//! Concurrent operations against one shared engine

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::task::JoinSet;

use core_kernel::{Currency, Rate};
use domain_wallet::{
    Actor, AdminAccount, FeeSchedule, InMemoryLedgerStore, LedgerEngine, LedgerError,
    LedgerSettings, NewAccount, Role, TransferRequest,
};

async fn setup(initial_funding: Decimal, admin_float: Decimal) -> (Arc<InMemoryLedgerStore>, Arc<LedgerEngine>) {
    let store = Arc::new(InMemoryLedgerStore::new());
    let settings = LedgerSettings {
        fees: FeeSchedule {
            currency: Currency::BDT,
            user_fee_rate: Rate::per_mille(dec!(20)).unwrap(),
            agent_fee_rate: Rate::per_mille(dec!(20)).unwrap(),
            agent_commission_rate: Rate::per_mille(dec!(10)).unwrap(),
            initial_funding_amount: initial_funding,
            admin_float_amount: admin_float,
        },
        ..LedgerSettings::default()
    };
    let engine = Arc::new(LedgerEngine::new(store.clone(), "admin@wallet.local", settings));
    engine
        .seed_admin(AdminAccount {
            name: "Admin".to_string(),
            phone: "01700000000".to_string(),
        })
        .await
        .unwrap();
    (store, engine)
}

fn account(n: u32, role: Role) -> NewAccount {
    NewAccount {
        name: format!("Account {}", n),
        email: format!("account{}@example.com", n),
        phone: format!("018{:08}", n),
        role,
    }
}

async fn register(engine: &LedgerEngine, n: u32, role: Role) -> Actor {
    engine.register_account(account(n, role)).await.unwrap().actor
}

async fn total_balance(store: &InMemoryLedgerStore) -> Decimal {
    store.wallets().await.iter().map(|w| w.balance.amount()).sum()
}

// ============================================================================
// Contention Tests
// ============================================================================

mod contention_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_withdrawals_never_overdraw() {
        let (_, engine) = setup(dec!(0), dec!(0)).await;
        let user = register(&engine, 1, Role::User).await;
        engine.top_up(user.id, dec!(100), None).await.unwrap();

        let mut tasks = JoinSet::new();
        for _ in 0..20 {
            let engine = engine.clone();
            let id = user.id;
            tasks.spawn(async move { engine.withdraw(id, dec!(30), None).await });
        }

        let mut succeeded = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined.unwrap() {
                Ok(_) => succeeded += 1,
                Err(e) => assert!(matches!(e, LedgerError::InsufficientFunds { .. })),
            }
        }

        assert_eq!(succeeded, 3);
        let wallet = engine.wallet(user.wallet_id).await.unwrap();
        assert_eq!(wallet.balance.amount(), dec!(10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cash_outs_drain_once() {
        let (store, engine) = setup(dec!(0), dec!(1000)).await;
        let user = register(&engine, 1, Role::User).await;
        let agent = register(&engine, 2, Role::Agent).await;
        engine.top_up(user.id, dec!(1000), None).await.unwrap();
        let total_before = total_balance(&store).await;

        let first = {
            let engine = engine.clone();
            let request = TransferRequest::new(user.id, agent.id, dec!(600));
            tokio::spawn(async move { engine.cash_out(request).await })
        };
        let second = {
            let engine = engine.clone();
            let request = TransferRequest::new(user.id, agent.id, dec!(600));
            tokio::spawn(async move { engine.cash_out(request).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(LedgerError::InsufficientFunds { .. }))));

        let user_wallet = engine.wallet(user.wallet_id).await.unwrap();
        let agent_wallet = engine.wallet(agent.wallet_id).await.unwrap();
        assert_eq!(user_wallet.balance.amount(), dec!(388));
        assert_eq!(agent_wallet.balance.amount(), dec!(600));
        assert_eq!(total_balance(&store).await, total_before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_opposing_transfers_complete() {
        let (store, engine) = setup(dec!(0), dec!(0)).await;
        let alice = register(&engine, 1, Role::User).await;
        let bob = register(&engine, 2, Role::User).await;
        engine.top_up(alice.id, dec!(500), None).await.unwrap();
        engine.top_up(bob.id, dec!(500), None).await.unwrap();

        let mut tasks = JoinSet::new();
        for i in 0..50 {
            let engine = engine.clone();
            let (from, to) = if i % 2 == 0 {
                (alice.id, bob.id)
            } else {
                (bob.id, alice.id)
            };
            tasks.spawn(async move {
                engine
                    .send_money(TransferRequest::new(from, to, dec!(7.50)))
                    .await
            });
        }

        let drained = tokio::time::timeout(Duration::from_secs(10), async {
            while let Some(joined) = tasks.join_next().await {
                joined.unwrap().unwrap();
            }
        })
        .await;
        assert!(drained.is_ok(), "transfers did not finish");

        assert_eq!(total_balance(&store).await, dec!(1000));
        let alice_wallet = engine.wallet(alice.wallet_id).await.unwrap();
        assert_eq!(alice_wallet.balance.amount(), dec!(500));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_respect_admin_float() {
        let (store, engine) = setup(dec!(50), dec!(200)).await;

        let mut tasks = JoinSet::new();
        for n in 1..=10 {
            let engine = engine.clone();
            tasks.spawn(async move { engine.register_account(account(n, Role::User)).await });
        }

        let mut registered = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined.unwrap() {
                Ok(_) => registered += 1,
                Err(e) => assert!(matches!(e, LedgerError::InsufficientAdminFloat { .. })),
            }
        }

        assert_eq!(registered, 4);
        assert_eq!(store.actor_count().await, 5);
        assert_eq!(store.wallets().await.len(), 5);
        let admin = engine.admin_wallet().await.unwrap();
        assert!(admin.balance.is_zero());
        assert_eq!(total_balance(&store).await, dec!(200));
    }
}
