//! Wallet repository
//!
//! Balances only change through [`increment`], a single conditional
//! `UPDATE` that refuses to take a balance below zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DatabaseError;

const WALLET_COLUMNS: &str = "wallet_id, owner_id, balance, currency, status, created_at, updated_at";

/// Database representation of a wallet
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WalletRow {
    pub wallet_id: Uuid,
    pub owner_id: Uuid,
    pub balance: Decimal,
    pub currency: String,
    pub status: DbWalletStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "wallet_status", rename_all = "snake_case")]
pub enum DbWalletStatus {
    Active,
    Blocked,
}

/// Aggregate row for wallet statistics
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WalletTotalsRow {
    pub total_wallets: i64,
    pub total_balance: Decimal,
    pub active_wallets: i64,
    pub blocked_wallets: i64,
}

pub async fn get(conn: &mut PgConnection, wallet_id: Uuid) -> Result<Option<WalletRow>, DatabaseError> {
    let sql = format!("SELECT {} FROM wallets WHERE wallet_id = $1", WALLET_COLUMNS);
    let row = sqlx::query_as::<_, WalletRow>(&sql)
        .bind(wallet_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn get_by_owner(conn: &mut PgConnection, owner_id: Uuid) -> Result<Option<WalletRow>, DatabaseError> {
    let sql = format!("SELECT {} FROM wallets WHERE owner_id = $1", WALLET_COLUMNS);
    let row = sqlx::query_as::<_, WalletRow>(&sql)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Reads and row-locks the given wallets, taking locks in ascending id order
pub async fn lock(conn: &mut PgConnection, wallet_ids: &[Uuid]) -> Result<Vec<WalletRow>, DatabaseError> {
    let mut ids = wallet_ids.to_vec();
    ids.sort();
    ids.dedup();

    let sql = format!(
        "SELECT {} FROM wallets WHERE wallet_id = ANY($1) ORDER BY wallet_id FOR UPDATE",
        WALLET_COLUMNS
    );
    let rows = sqlx::query_as::<_, WalletRow>(&sql)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

pub async fn insert(conn: &mut PgConnection, row: &WalletRow) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO wallets (wallet_id, owner_id, balance, currency, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(row.wallet_id)
    .bind(row.owner_id)
    .bind(row.balance)
    .bind(&row.currency)
    .bind(row.status)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Adds `delta` to the balance if the result stays non-negative
///
/// Returns `None` when the wallet is missing, holds another currency, or
/// would go negative; the caller re-reads the row to tell which.
pub async fn increment(
    conn: &mut PgConnection,
    wallet_id: Uuid,
    delta: Decimal,
    currency: &str,
) -> Result<Option<WalletRow>, DatabaseError> {
    let sql = format!(
        r#"
        UPDATE wallets
        SET balance = balance + $2, updated_at = now()
        WHERE wallet_id = $1 AND currency = $3 AND balance + $2 >= 0
        RETURNING {}
        "#,
        WALLET_COLUMNS
    );
    let row = sqlx::query_as::<_, WalletRow>(&sql)
        .bind(wallet_id)
        .bind(delta)
        .bind(currency)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Changes status only if it differs; `None` when nothing was updated
pub async fn set_status(
    conn: &mut PgConnection,
    wallet_id: Uuid,
    status: DbWalletStatus,
) -> Result<Option<WalletRow>, DatabaseError> {
    let sql = format!(
        r#"
        UPDATE wallets SET status = $2, updated_at = now()
        WHERE wallet_id = $1 AND status <> $2
        RETURNING {}
        "#,
        WALLET_COLUMNS
    );
    let row = sqlx::query_as::<_, WalletRow>(&sql)
        .bind(wallet_id)
        .bind(status)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn list(conn: &mut PgConnection, limit: i64, offset: i64) -> Result<Vec<WalletRow>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM wallets ORDER BY created_at, wallet_id LIMIT $1 OFFSET $2",
        WALLET_COLUMNS
    );
    let rows = sqlx::query_as::<_, WalletRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

pub async fn totals(conn: &mut PgConnection) -> Result<WalletTotalsRow, DatabaseError> {
    let row = sqlx::query_as::<_, WalletTotalsRow>(
        r#"
        SELECT
            COUNT(*) AS total_wallets,
            COALESCE(SUM(balance), 0) AS total_balance,
            COUNT(*) FILTER (WHERE status = 'active') AS active_wallets,
            COUNT(*) FILTER (WHERE status = 'blocked') AS blocked_wallets
        FROM wallets
        "#,
    )
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}
