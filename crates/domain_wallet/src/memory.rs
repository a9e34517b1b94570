//! In-memory ledger store
//!
//! A unit of work holds the store-wide mutex for its whole lifetime, so
//! units are fully serialized. Writes are staged on the unit and merged
//! into the shared state only on commit; dropping or rolling back the unit
//! discards them.
//!
//! Failure injection (`fail_nth_append`, `fail_next_commit`) lets tests
//! abort an operation half-way and check that nothing leaked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use core_kernel::{
    ActorId, DomainPort, HealthCheckResult, HealthCheckable, Money, PortError, WalletId,
};

use crate::actor::{Actor, ApprovalStatus, Role};
use crate::error::LedgerError;
use crate::ports::{AccountDirectory, LedgerStore, TransactionLog, UnitOfWork, WalletStore};
use crate::query::{Page, Pagination, SortOrder, TransactionQuery};
use crate::stats::{TransactionSummary, WalletStatistics};
use crate::transaction::{NewTransaction, Transaction};
use crate::wallet::{Wallet, WalletStatus};

#[derive(Debug, Default)]
struct State {
    actors: HashMap<ActorId, Actor>,
    wallets: HashMap<WalletId, Wallet>,
    /// Append order doubles as the tie-break for equal timestamps
    transactions: Vec<Transaction>,
}

impl State {
    fn actor_where(&self, pred: impl Fn(&Actor) -> bool) -> Option<&Actor> {
        self.actors.values().find(|a| pred(a))
    }
}

/// In-memory implementation of `LedgerStore`
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<State>>,
    fail_append_at: AtomicUsize,
    fail_commit: AtomicBool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`-th append (1-based) of the next unit of work fail
    pub fn fail_nth_append(&self, n: usize) {
        self.fail_append_at.store(n, Ordering::SeqCst);
    }

    /// Makes the commit of the next unit of work fail
    pub fn fail_next_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }

    /// Every committed wallet, ordered by creation
    pub async fn wallets(&self) -> Vec<Wallet> {
        let state = self.state.lock().await;
        let mut wallets: Vec<Wallet> = state.wallets.values().cloned().collect();
        wallets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        wallets
    }

    /// Every committed entry in append order
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }

    pub async fn actor_count(&self) -> usize {
        self.state.lock().await.actors.len()
    }
}

impl DomainPort for InMemoryLedgerStore {}

#[async_trait]
impl HealthCheckable for InMemoryLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-ledger-store", 0)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError> {
        let guard = self.state.clone().lock_owned().await;
        let fail_append_at = match self.fail_append_at.swap(0, Ordering::SeqCst) {
            0 => None,
            n => Some(n),
        };
        let fail_commit = self.fail_commit.swap(false, Ordering::SeqCst);

        Ok(Box::new(InMemoryUnitOfWork {
            state: guard,
            actors: HashMap::new(),
            wallets: HashMap::new(),
            appended: Vec::new(),
            appends: 0,
            fail_append_at,
            fail_commit,
        }))
    }
}

#[async_trait]
impl WalletStore for InMemoryLedgerStore {
    async fn wallet(&self, id: WalletId) -> Result<Wallet, LedgerError> {
        self.state
            .lock()
            .await
            .wallets
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::wallet_not_found(id))
    }

    async fn wallet_by_owner(&self, owner: ActorId) -> Result<Wallet, LedgerError> {
        self.state
            .lock()
            .await
            .wallets
            .values()
            .find(|w| w.owner_id == owner)
            .cloned()
            .ok_or_else(|| LedgerError::wallet_not_found(owner))
    }

    async fn list_wallets(&self, pagination: Pagination) -> Result<Page<Wallet>, LedgerError> {
        Ok(Page::from_sorted(self.wallets().await, pagination))
    }

    async fn wallet_statistics(&self) -> Result<WalletStatistics, LedgerError> {
        let state = self.state.lock().await;
        Ok(WalletStatistics::from_wallets(state.wallets.values()))
    }
}

#[async_trait]
impl TransactionLog for InMemoryLedgerStore {
    async fn query(&self, query: &TransactionQuery) -> Result<Page<Transaction>, LedgerError> {
        let state = self.state.lock().await;
        let mut matched: Vec<(usize, &Transaction)> = state
            .transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| query.matches(t))
            .collect();

        match query.sort {
            SortOrder::Ascending => {
                matched.sort_by(|a, b| a.1.created_at.cmp(&b.1.created_at).then(a.0.cmp(&b.0)))
            }
            SortOrder::Descending => {
                matched.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at).then(b.0.cmp(&a.0)))
            }
        }

        let sorted = matched.into_iter().map(|(_, t)| t.clone()).collect();
        Ok(Page::from_sorted(sorted, query.pagination))
    }

    async fn summary(&self, since: Option<DateTime<Utc>>) -> Result<TransactionSummary, LedgerError> {
        let state = self.state.lock().await;
        Ok(TransactionSummary::from_entries(
            state
                .transactions
                .iter()
                .filter(|t| since.map_or(true, |s| t.created_at >= s)),
        ))
    }

    async fn wallet_volume(&self, wallet: WalletId, since: DateTime<Utc>) -> Result<Decimal, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.wallet_id == wallet && t.created_at >= since)
            .map(|t| t.amount.amount())
            .sum())
    }

    async fn count(&self) -> Result<u64, LedgerError> {
        Ok(self.state.lock().await.transactions.len() as u64)
    }
}

#[async_trait]
impl AccountDirectory for InMemoryLedgerStore {
    async fn lookup_actor(&self, id: ActorId) -> Result<Actor, LedgerError> {
        self.state
            .lock()
            .await
            .actors
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::actor_not_found(id))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Actor>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.actor_where(|a| a.phone == phone).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Actor>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.actor_where(|a| a.email == email).cloned())
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.actors.values().filter(|a| a.role == role).count() as u64)
    }

    async fn list_by_role(&self, role: Role, pagination: Pagination) -> Result<Page<Actor>, LedgerError> {
        let state = self.state.lock().await;
        let mut actors: Vec<Actor> = state
            .actors
            .values()
            .filter(|a| a.role == role)
            .cloned()
            .collect();
        actors.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(Page::from_sorted(actors, pagination))
    }
}

/// Unit of work over the in-memory store
pub struct InMemoryUnitOfWork {
    state: OwnedMutexGuard<State>,
    actors: HashMap<ActorId, Actor>,
    wallets: HashMap<WalletId, Wallet>,
    appended: Vec<Transaction>,
    appends: usize,
    fail_append_at: Option<usize>,
    fail_commit: bool,
}

impl InMemoryUnitOfWork {
    fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id).or_else(|| self.state.actors.get(&id))
    }

    fn actor_where(&self, pred: impl Fn(&Actor) -> bool) -> Option<Actor> {
        self.actors
            .values()
            .find(|a| pred(a))
            .or_else(|| {
                self.state
                    .actor_where(|a| !self.actors.contains_key(&a.id) && pred(a))
            })
            .cloned()
    }

    fn wallet(&self, id: WalletId) -> Result<Wallet, LedgerError> {
        self.wallets
            .get(&id)
            .or_else(|| self.state.wallets.get(&id))
            .cloned()
            .ok_or_else(|| LedgerError::wallet_not_found(id))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn find_actor(&mut self, id: ActorId) -> Result<Option<Actor>, LedgerError> {
        Ok(self.actor(id).cloned())
    }

    async fn find_actor_by_email(&mut self, email: &str) -> Result<Option<Actor>, LedgerError> {
        Ok(self.actor_where(|a| a.email == email))
    }

    async fn find_actor_by_phone(&mut self, phone: &str) -> Result<Option<Actor>, LedgerError> {
        Ok(self.actor_where(|a| a.phone == phone))
    }

    async fn insert_actor(&mut self, actor: &Actor) -> Result<(), LedgerError> {
        let taken = self.actor(actor.id).is_some()
            || self
                .actor_where(|a| a.email == actor.email || a.phone == actor.phone)
                .is_some();
        if taken {
            return Err(LedgerError::DuplicateAccount(format!(
                "email {} or phone {} is already registered",
                actor.email, actor.phone
            )));
        }
        self.actors.insert(actor.id, actor.clone());
        Ok(())
    }

    async fn set_approval(
        &mut self,
        id: ActorId,
        approval: ApprovalStatus,
    ) -> Result<Actor, LedgerError> {
        let mut actor = self
            .actor(id)
            .cloned()
            .ok_or_else(|| LedgerError::actor_not_found(id))?;
        if actor.approval == approval {
            return Err(LedgerError::already_in_state(format!(
                "actor {} is already {}",
                id, approval
            )));
        }
        actor.approval = approval;
        self.actors.insert(id, actor.clone());
        Ok(actor)
    }

    async fn insert_wallet(&mut self, wallet: &Wallet) -> Result<(), LedgerError> {
        let owner_has_wallet = self
            .wallets
            .values()
            .chain(self.state.wallets.values())
            .any(|w| w.owner_id == wallet.owner_id || w.id == wallet.id);
        if owner_has_wallet {
            return Err(LedgerError::DuplicateAccount(format!(
                "actor {} already owns a wallet",
                wallet.owner_id
            )));
        }
        self.wallets.insert(wallet.id, wallet.clone());
        Ok(())
    }

    async fn lock_wallets(&mut self, ids: &[WalletId]) -> Result<Vec<Wallet>, LedgerError> {
        ids.iter().map(|id| self.wallet(*id)).collect()
    }

    async fn increment_balance(
        &mut self,
        id: WalletId,
        delta: Money,
    ) -> Result<Wallet, LedgerError> {
        let mut wallet = self.wallet(id)?;
        let balance = wallet.balance.checked_add(&delta)?;
        if balance.is_negative() {
            return Err(LedgerError::InsufficientFunds {
                wallet: id,
                available: wallet.balance.amount(),
                requested: -delta.amount(),
            });
        }
        wallet.balance = balance;
        wallet.updated_at = Utc::now();
        self.wallets.insert(id, wallet.clone());
        Ok(wallet)
    }

    async fn set_wallet_status(
        &mut self,
        id: WalletId,
        status: WalletStatus,
    ) -> Result<Wallet, LedgerError> {
        let mut wallet = self.wallet(id)?;
        if wallet.status == status {
            return Err(LedgerError::already_in_state(format!(
                "wallet {} is already {}",
                id, status
            )));
        }
        wallet.status = status;
        wallet.updated_at = Utc::now();
        self.wallets.insert(id, wallet.clone());
        Ok(wallet)
    }

    async fn append(&mut self, entry: NewTransaction) -> Result<Transaction, LedgerError> {
        self.appends += 1;
        if self.fail_append_at == Some(self.appends) {
            return Err(PortError::internal(format!("injected failure on append #{}", self.appends)).into());
        }
        let written = entry.into_transaction(Utc::now());
        self.appended.push(written.clone());
        Ok(written)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        if self.fail_commit {
            return Err(PortError::internal("injected commit failure").into());
        }

        let InMemoryUnitOfWork {
            mut state,
            actors,
            wallets,
            appended,
            ..
        } = *self;
        debug!(
            actors = actors.len(),
            wallets = wallets.len(),
            entries = appended.len(),
            "Committing in-memory unit of work"
        );
        state.actors.extend(actors);
        state.wallets.extend(wallets);
        state.transactions.extend(appended);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError> {
        debug!(entries = self.appended.len(), "Discarding in-memory unit of work");
        Ok(())
    }
}
