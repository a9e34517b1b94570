//! Admin float resolution
//!
//! The admin float is the wallet of the administrator account identified by
//! the configured admin email. It funds new wallets and agent commissions
//! and collects cash-out fees.
//!
//! Only the wallet *id* is cached. The balance is re-read under lock inside
//! every unit of work that touches it.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::WalletId;

use crate::actor::Role;
use crate::error::LedgerError;
use crate::ports::{AccountDirectory, UnitOfWork, WalletStore};
use crate::wallet::Wallet;

pub const DEFAULT_ADMIN_CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
struct CachedWallet {
    id: WalletId,
    resolved_at: Instant,
}

/// Resolves the admin wallet for each operation
#[derive(Debug)]
pub struct AdminFloat {
    admin_email: String,
    ttl: Duration,
    cached: RwLock<Option<CachedWallet>>,
}

impl AdminFloat {
    pub fn new(admin_email: impl Into<String>, ttl: Duration) -> Self {
        Self {
            admin_email: admin_email.into(),
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Returns the admin wallet id, from cache or from the account directory
    async fn wallet_id(&self, uow: &mut dyn UnitOfWork) -> Result<WalletId, LedgerError> {
        if let Some(id) = self.cached_id().await {
            return Ok(id);
        }
        let admin = uow
            .find_actor_by_email(&self.admin_email)
            .await?
            .filter(|actor| actor.role == Role::Admin)
            .ok_or(LedgerError::AdminNotConfigured)?;
        self.remember(admin.wallet_id).await;
        Ok(admin.wallet_id)
    }

    /// Returns the admin wallet, freshly read and locked inside `uow`
    ///
    /// The `participants` of the operation are locked in the same call so
    /// every lock is taken in ascending id order; their wallets come back
    /// in the order given. A cached id whose wallet is gone is dropped and
    /// reported as `AdminNotConfigured`.
    pub async fn resolve(
        &self,
        uow: &mut dyn UnitOfWork,
        participants: &[WalletId],
    ) -> Result<(Wallet, Vec<Wallet>), LedgerError> {
        let id = self.wallet_id(uow).await?;
        let mut ids = participants.to_vec();
        if !ids.contains(&id) {
            ids.push(id);
        }

        let mut wallets = match uow.lock_wallets(&ids).await {
            Ok(wallets) => wallets,
            Err(LedgerError::WalletNotFound(missing)) if missing == id.to_string() => {
                self.invalidate().await;
                return Err(LedgerError::AdminNotConfigured);
            }
            Err(e) => return Err(e),
        };

        let position = wallets
            .iter()
            .position(|w| w.id == id)
            .ok_or(LedgerError::AdminNotConfigured)?;
        let admin = if participants.contains(&id) {
            wallets[position].clone()
        } else {
            wallets.remove(position)
        };
        Ok((admin, wallets))
    }

    /// Read-path lookup of the admin wallet (not locked)
    pub async fn wallet<S>(&self, store: &S) -> Result<Wallet, LedgerError>
    where
        S: AccountDirectory + WalletStore + ?Sized,
    {
        let admin = store
            .find_by_email(&self.admin_email)
            .await?
            .filter(|actor| actor.role == Role::Admin)
            .ok_or(LedgerError::AdminNotConfigured)?;
        store.wallet(admin.wallet_id).await
    }

    /// Drops the cached wallet id
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn cached_id(&self) -> Option<WalletId> {
        let cached = *self.cached.read().await;
        cached
            .filter(|c| c.resolved_at.elapsed() < self.ttl)
            .map(|c| c.id)
    }

    async fn remember(&self, id: WalletId) {
        debug!(wallet_id = %id, "Cached admin wallet id");
        *self.cached.write().await = Some(CachedWallet {
            id,
            resolved_at: Instant::now(),
        });
    }
}
