//! Ledger engine against PostgreSQL
//!
//! Each test starts its own container. Run with
//! `cargo test -p infra_db -- --ignored` on a machine with Docker.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_wallet::{
    Actor, LedgerEngine, LedgerError, Pagination, SortOrder, TransactionKind, TransactionQuery,
    TransferRequest, UnitOfWork, WalletStatus,
};
use infra_db::PostgresLedgerStore;
use test_utils::{AccountFixtures, LedgerDatabase, LedgerTable, SettingsFixtures, ADMIN_EMAIL};

struct Harness {
    db: LedgerDatabase,
    store: Arc<PostgresLedgerStore>,
    engine: Arc<LedgerEngine>,
    admin: Actor,
}

async fn harness() -> Harness {
    let db = LedgerDatabase::start()
        .await
        .expect("Failed to start test database");
    let store = Arc::new(PostgresLedgerStore::new(db.pool().clone()));
    let engine = Arc::new(LedgerEngine::new(
        store.clone(),
        ADMIN_EMAIL,
        SettingsFixtures::round_rates(dec!(100000)),
    ));
    let admin = engine
        .seed_admin(AccountFixtures::admin())
        .await
        .expect("Failed to seed admin");
    Harness {
        db,
        store,
        engine,
        admin,
    }
}

impl Harness {
    async fn user(&self, n: u32) -> Actor {
        self.engine
            .register_account(AccountFixtures::user(n))
            .await
            .unwrap()
            .actor
    }

    async fn agent(&self, n: u32) -> Actor {
        let agent = self
            .engine
            .register_account(AccountFixtures::agent(n))
            .await
            .unwrap()
            .actor;
        self.engine.approve_agent(agent.id).await.unwrap()
    }

    async fn balance(&self, actor: &Actor) -> Decimal {
        self.engine
            .wallet(actor.wallet_id)
            .await
            .unwrap()
            .balance
            .amount()
    }

    async fn total_balance(&self) -> Decimal {
        sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(balance), 0) FROM wallets")
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }
}

// ============================================================================
// Movements
// ============================================================================

mod movement_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_cash_out_persists_three_way_split() {
        let h = harness().await;
        let user = h.user(1).await;
        let agent = h.agent(2).await;
        h.engine.top_up(user.id, dec!(2000), None).await.unwrap();

        let receipt = h
            .engine
            .cash_out(TransferRequest::new(user.id, agent.id, dec!(1000)))
            .await
            .unwrap();

        let kinds: Vec<_> = receipt.entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![TransactionKind::CashOut, TransactionKind::ReceiveMoney, TransactionKind::Fee]
        );
        assert_eq!(h.balance(&user).await, dec!(980));
        assert_eq!(h.balance(&agent).await, dec!(1000));
        assert_eq!(h.balance(&h.admin).await, dec!(100020));
        assert_eq!(h.total_balance().await, dec!(102000));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_insufficient_funds_leaves_no_trace() {
        let h = harness().await;
        let alice = h.user(1).await;
        let bob = h.user(2).await;
        h.engine.top_up(alice.id, dec!(50), None).await.unwrap();
        let entries_before = h.db.row_count(LedgerTable::Transactions).await.unwrap();

        let err = h
            .engine
            .send_money(TransferRequest::new(alice.id, bob.id, dec!(80)))
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(h.balance(&alice).await, dec!(50));
        assert_eq!(h.balance(&bob).await, dec!(0));
        assert_eq!(h.db.row_count(LedgerTable::Transactions).await.unwrap(), entries_before);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_duplicate_phone_is_rejected() {
        let h = harness().await;
        h.user(1).await;
        let mut again = AccountFixtures::user(1);
        again.email = "someone.else@example.com".to_string();

        let err = h.engine.register_account(again).await.unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateAccount(_)));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_block_and_unblock_wallet() {
        let h = harness().await;
        let user = h.user(1).await;

        let blocked = h.engine.block_wallet(user.wallet_id).await.unwrap();
        assert_eq!(blocked.status, WalletStatus::Blocked);
        assert!(matches!(
            h.engine.block_wallet(user.wallet_id).await,
            Err(LedgerError::AlreadyInState(_))
        ));
        assert!(matches!(
            h.engine.top_up(user.id, dec!(10), None).await,
            Err(LedgerError::WalletBlocked(_))
        ));

        h.engine.unblock_wallet(user.wallet_id).await.unwrap();
        h.engine.top_up(user.id, dec!(10), None).await.unwrap();
        assert_eq!(h.balance(&user).await, dec!(10));
    }
}

// ============================================================================
// Unit of work
// ============================================================================

mod unit_of_work_tests {
    use super::*;
    use core_kernel::{Currency, Money};
    use domain_wallet::LedgerStore;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_dropped_unit_of_work_rolls_back() {
        let h = harness().await;
        let user = h.user(1).await;

        {
            let mut uow = h.store.begin().await.unwrap();
            uow.increment_balance(user.wallet_id, Money::new(dec!(500), Currency::BDT))
                .await
                .unwrap();
        }

        assert_eq!(h.balance(&user).await, dec!(0));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_conditional_debit_reports_shortfall() {
        let h = harness().await;
        let user = h.user(1).await;
        let mut uow = h.store.begin().await.unwrap();

        let err = uow
            .increment_balance(user.wallet_id, Money::new(dec!(-1), Currency::BDT))
            .await
            .unwrap_err();
        uow.rollback().await.unwrap();

        match err {
            LedgerError::InsufficientFunds {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, dec!(0));
                assert_eq!(requested, dec!(1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_currency_mismatch_is_rejected() {
        let h = harness().await;
        let user = h.user(1).await;
        let mut uow = h.store.begin().await.unwrap();

        let err = uow
            .increment_balance(user.wallet_id, Money::new(dec!(5), Currency::USD))
            .await
            .unwrap_err();
        uow.rollback().await.unwrap();

        assert!(matches!(err, LedgerError::Money(_)));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_lock_wallets_preserves_request_order() {
        let h = harness().await;
        let alice = h.user(1).await;
        let bob = h.user(2).await;
        let mut uow = h.store.begin().await.unwrap();

        let locked = uow
            .lock_wallets(&[bob.wallet_id, alice.wallet_id])
            .await
            .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(locked[0].id, bob.wallet_id);
        assert_eq!(locked[1].id, alice.wallet_id);
    }
}

// ============================================================================
// Reads
// ============================================================================

mod read_tests {
    use super::*;
    use domain_wallet::{AccountDirectory, Role, TransactionLog, WalletStore};

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_history_filters_and_orders() {
        let h = harness().await;
        let alice = h.user(1).await;
        let bob = h.user(2).await;
        h.engine.top_up(alice.id, dec!(300), None).await.unwrap();
        h.engine
            .send_money(TransferRequest::new(alice.id, bob.id, dec!(100)))
            .await
            .unwrap();
        h.engine.withdraw(alice.id, dec!(50), None).await.unwrap();

        let newest_first = h
            .engine
            .history(alice.id, TransactionQuery::all())
            .await
            .unwrap();
        let kinds: Vec<_> = newest_first.data.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TransactionKind::Withdraw, TransactionKind::SendMoney, TransactionKind::AddMoney]
        );
        assert_eq!(newest_first.meta.total, 3);

        let sends = h
            .engine
            .history(
                alice.id,
                TransactionQuery::all()
                    .kind(TransactionKind::SendMoney)
                    .sorted(SortOrder::Ascending),
            )
            .await
            .unwrap();
        assert_eq!(sends.meta.total, 1);
        assert_eq!(sends.data[0].resulting_balance.amount(), dec!(200));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_pagination_and_aggregates() {
        let h = harness().await;
        for n in 1..=3 {
            let user = h.user(n).await;
            h.engine.top_up(user.id, dec!(100), None).await.unwrap();
        }

        let page = h
            .store
            .list_wallets(Pagination::new(Some(2), Some(3)))
            .await
            .unwrap();
        assert_eq!(page.meta.total, 4);
        assert_eq!(page.meta.total_page, 2);
        assert_eq!(page.data.len(), 1);

        let stats = h.store.wallet_statistics().await.unwrap();
        assert_eq!(stats.total_wallets, 4);
        assert_eq!(stats.total_balance, dec!(100300));

        let summary = h.store.summary(None).await.unwrap();
        assert_eq!(summary.total_add_money, dec!(300));
        assert_eq!(summary.total_initial_funding, dec!(100000));
        // three top-ups plus the float seeding entry
        assert_eq!(summary.count, 4);
        assert_eq!(h.store.count().await.unwrap(), 4);
        assert_eq!(h.store.count_by_role(Role::User).await.unwrap(), 3);
    }
}
