//! PostgreSQL Ledger Adapter
//!
//! Implements the wallet domain's `LedgerStore` and `UnitOfWork` ports on
//! PostgreSQL. A unit of work wraps one sqlx transaction:
//!
//! - `lock_wallets` takes `SELECT ... FOR UPDATE` row locks in ascending
//!   wallet id order, so two units touching the same wallets queue instead
//!   of deadlocking.
//! - `increment_balance` is a single conditional `UPDATE`; the balance
//!   check and the write cannot be separated by another writer.
//! - Dropping the unit without committing rolls the transaction back.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::{create_pool, DatabaseConfig, PostgresLedgerStore};
//! use domain_wallet::{LedgerEngine, LedgerSettings};
//!
//! let pool = create_pool(DatabaseConfig::new(url)).await?;
//! let store = Arc::new(PostgresLedgerStore::new(pool));
//! let engine = LedgerEngine::new(store, "admin@wallet.local", LedgerSettings::default());
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    ActorId, DomainPort, HealthCheckResult, HealthCheckable, Money, MoneyError, WalletId,
};
use domain_wallet::{
    AccountDirectory, Actor, ApprovalStatus, LedgerError, LedgerStore, NewTransaction, Page,
    PageMeta, Pagination, Role, Transaction, TransactionLog, TransactionQuery, TransactionSummary,
    UnitOfWork, Wallet, WalletStatistics, WalletStatus, WalletStore,
};

use super::mapping::{
    actor_from_row, actor_to_row, filter_from_query, new_transaction_row, transaction_from_row,
    wallet_from_row, wallet_to_row,
};
use crate::error::DatabaseError;
use crate::repositories::{actors, transactions, wallets};

const ADAPTER_ID: &str = "postgres-ledger-store";

fn to_u64(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn page_window(pagination: Pagination) -> (i64, i64) {
    (
        i64::from(pagination.limit),
        i64::try_from(pagination.offset()).unwrap_or(i64::MAX),
    )
}

/// PostgreSQL-backed implementation of the ledger ports
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn conn(&self) -> Result<PoolConnection<Postgres>, LedgerError> {
        Ok(self.pool.acquire().await.map_err(DatabaseError::from)?)
    }
}

impl DomainPort for PostgresLedgerStore {}

#[async_trait]
impl HealthCheckable for PostgresLedgerStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => {
                HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {}", e))
            }
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError> {
        let tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        debug!("Opened PostgreSQL unit of work");
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

#[async_trait]
impl WalletStore for PostgresLedgerStore {
    #[instrument(skip(self), fields(wallet_id = %id))]
    async fn wallet(&self, id: WalletId) -> Result<Wallet, LedgerError> {
        let mut conn = self.conn().await?;
        let row = wallets::get(&mut conn, id.into())
            .await?
            .ok_or_else(|| LedgerError::wallet_not_found(id))?;
        wallet_from_row(row)
    }

    #[instrument(skip(self), fields(owner_id = %owner))]
    async fn wallet_by_owner(&self, owner: ActorId) -> Result<Wallet, LedgerError> {
        let mut conn = self.conn().await?;
        let row = wallets::get_by_owner(&mut conn, owner.into())
            .await?
            .ok_or_else(|| LedgerError::wallet_not_found(owner))?;
        wallet_from_row(row)
    }

    #[instrument(skip(self))]
    async fn list_wallets(&self, pagination: Pagination) -> Result<Page<Wallet>, LedgerError> {
        let mut conn = self.conn().await?;
        let (limit, offset) = page_window(pagination);
        let total = wallets::totals(&mut conn).await?.total_wallets;
        let data = wallets::list(&mut conn, limit, offset)
            .await?
            .into_iter()
            .map(wallet_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            data,
            meta: PageMeta::new(pagination, to_u64(total)),
        })
    }

    async fn wallet_statistics(&self) -> Result<WalletStatistics, LedgerError> {
        let mut conn = self.conn().await?;
        let totals = wallets::totals(&mut conn).await?;
        Ok(WalletStatistics {
            total_wallets: to_u64(totals.total_wallets),
            total_balance: totals.total_balance,
            active_wallets: to_u64(totals.active_wallets),
            blocked_wallets: to_u64(totals.blocked_wallets),
        })
    }
}

#[async_trait]
impl TransactionLog for PostgresLedgerStore {
    #[instrument(skip(self, query))]
    async fn query(&self, query: &TransactionQuery) -> Result<Page<Transaction>, LedgerError> {
        debug!(?query, "Querying transaction log");
        let mut conn = self.conn().await?;
        let (rows, total) = transactions::query(&mut conn, &filter_from_query(query)).await?;
        let data = rows
            .into_iter()
            .map(transaction_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            data,
            meta: PageMeta::new(query.pagination, to_u64(total)),
        })
    }

    async fn summary(&self, since: Option<DateTime<Utc>>) -> Result<TransactionSummary, LedgerError> {
        let mut conn = self.conn().await?;
        let mut summary = TransactionSummary::default();
        for row in transactions::totals_by_kind(&mut conn, since).await? {
            summary.record(row.kind.into(), row.amount, row.fee, to_u64(row.entries));
        }
        Ok(summary)
    }

    async fn wallet_volume(&self, wallet: WalletId, since: DateTime<Utc>) -> Result<Decimal, LedgerError> {
        let mut conn = self.conn().await?;
        Ok(transactions::wallet_volume(&mut conn, wallet.into(), since).await?)
    }

    async fn count(&self) -> Result<u64, LedgerError> {
        let mut conn = self.conn().await?;
        Ok(to_u64(transactions::count(&mut conn).await?))
    }
}

#[async_trait]
impl AccountDirectory for PostgresLedgerStore {
    #[instrument(skip(self), fields(actor_id = %id))]
    async fn lookup_actor(&self, id: ActorId) -> Result<Actor, LedgerError> {
        let mut conn = self.conn().await?;
        let row = actors::get(&mut conn, id.into())
            .await?
            .ok_or_else(|| LedgerError::actor_not_found(id))?;
        actor_from_row(row)
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Actor>, LedgerError> {
        let mut conn = self.conn().await?;
        actors::find_by_phone(&mut conn, phone)
            .await?
            .map(actor_from_row)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Actor>, LedgerError> {
        let mut conn = self.conn().await?;
        actors::find_by_email(&mut conn, email)
            .await?
            .map(actor_from_row)
            .transpose()
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, LedgerError> {
        let mut conn = self.conn().await?;
        Ok(to_u64(actors::count_by_role(&mut conn, role.into()).await?))
    }

    #[instrument(skip(self), fields(role = %role))]
    async fn list_by_role(&self, role: Role, pagination: Pagination) -> Result<Page<Actor>, LedgerError> {
        let mut conn = self.conn().await?;
        let (limit, offset) = page_window(pagination);
        let total = actors::count_by_role(&mut conn, role.into()).await?;
        let data = actors::list_by_role(&mut conn, role.into(), limit, offset)
            .await?
            .into_iter()
            .map(actor_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            data,
            meta: PageMeta::new(pagination, to_u64(total)),
        })
    }
}

/// One sqlx transaction
pub struct PostgresUnitOfWork {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn find_actor(&mut self, id: ActorId) -> Result<Option<Actor>, LedgerError> {
        actors::get(&mut self.tx, id.into())
            .await?
            .map(actor_from_row)
            .transpose()
    }

    async fn find_actor_by_email(&mut self, email: &str) -> Result<Option<Actor>, LedgerError> {
        actors::find_by_email(&mut self.tx, email)
            .await?
            .map(actor_from_row)
            .transpose()
    }

    async fn find_actor_by_phone(&mut self, phone: &str) -> Result<Option<Actor>, LedgerError> {
        actors::find_by_phone(&mut self.tx, phone)
            .await?
            .map(actor_from_row)
            .transpose()
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    async fn insert_actor(&mut self, actor: &Actor) -> Result<(), LedgerError> {
        debug!("Inserting actor");
        actors::insert(&mut self.tx, &actor_to_row(actor)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(actor_id = %id))]
    async fn set_approval(
        &mut self,
        id: ActorId,
        approval: ApprovalStatus,
    ) -> Result<Actor, LedgerError> {
        if let Some(row) = actors::set_approval(&mut self.tx, id.into(), approval.into()).await? {
            return actor_from_row(row);
        }
        match actors::get(&mut self.tx, id.into()).await? {
            Some(_) => Err(LedgerError::already_in_state(format!(
                "actor {} is already {}",
                id, approval
            ))),
            None => Err(LedgerError::actor_not_found(id)),
        }
    }

    #[instrument(skip(self, wallet), fields(wallet_id = %wallet.id))]
    async fn insert_wallet(&mut self, wallet: &Wallet) -> Result<(), LedgerError> {
        debug!("Inserting wallet");
        wallets::insert(&mut self.tx, &wallet_to_row(wallet)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn lock_wallets(&mut self, ids: &[WalletId]) -> Result<Vec<Wallet>, LedgerError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| Uuid::from(*id)).collect();
        let mut locked: HashMap<Uuid, Wallet> = HashMap::with_capacity(uuids.len());
        for row in wallets::lock(&mut self.tx, &uuids).await? {
            locked.insert(row.wallet_id, wallet_from_row(row)?);
        }
        debug!(locked = locked.len(), "Locked wallets");

        ids.iter()
            .map(|id| {
                locked
                    .get(id.as_uuid())
                    .cloned()
                    .ok_or_else(|| LedgerError::wallet_not_found(*id))
            })
            .collect()
    }

    #[instrument(skip(self, delta), fields(wallet_id = %id, delta = %delta.amount()))]
    async fn increment_balance(
        &mut self,
        id: WalletId,
        delta: Money,
    ) -> Result<Wallet, LedgerError> {
        let code = delta.currency().code();
        if let Some(row) = wallets::increment(&mut self.tx, id.into(), delta.amount(), code).await? {
            return wallet_from_row(row);
        }

        let current = wallets::get(&mut self.tx, id.into())
            .await?
            .ok_or_else(|| LedgerError::wallet_not_found(id))?;
        if current.currency != code {
            return Err(MoneyError::CurrencyMismatch(current.currency, code.to_string()).into());
        }
        Err(LedgerError::InsufficientFunds {
            wallet: id,
            available: current.balance,
            requested: -delta.amount(),
        })
    }

    #[instrument(skip(self), fields(wallet_id = %id))]
    async fn set_wallet_status(
        &mut self,
        id: WalletId,
        status: WalletStatus,
    ) -> Result<Wallet, LedgerError> {
        if let Some(row) = wallets::set_status(&mut self.tx, id.into(), status.into()).await? {
            return wallet_from_row(row);
        }
        match wallets::get(&mut self.tx, id.into()).await? {
            Some(_) => Err(LedgerError::already_in_state(format!(
                "wallet {} is already {}",
                id, status
            ))),
            None => Err(LedgerError::wallet_not_found(id)),
        }
    }

    #[instrument(skip(self, entry), fields(kind = %entry.kind, wallet_id = %entry.wallet_id))]
    async fn append(&mut self, entry: NewTransaction) -> Result<Transaction, LedgerError> {
        let row = transactions::insert(&mut self.tx, &new_transaction_row(entry)).await?;
        debug!(seq = row.seq, "Appended ledger entry");
        transaction_from_row(row)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        self.tx.commit().await.map_err(DatabaseError::from)?;
        debug!("Committed PostgreSQL unit of work");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError> {
        self.tx.rollback().await.map_err(DatabaseError::from)?;
        debug!("Rolled back PostgreSQL unit of work");
        Ok(())
    }
}
