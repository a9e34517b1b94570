//! Transaction log repository
//!
//! The log is append-only: there is no update or delete here. `seq` breaks
//! ties between entries written in the same database transaction, which
//! share a `created_at`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const TRANSACTION_COLUMNS: &str = r#"
    transaction_id, seq, kind, status, currency, amount, fee, commission,
    wallet_id, from_wallet_id, to_wallet_id, initiated_by,
    resulting_balance, note, created_at
"#;

/// Database representation of a ledger entry
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub transaction_id: Uuid,
    pub seq: i64,
    pub kind: DbTransactionKind,
    pub status: DbTransactionStatus,
    pub currency: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub commission: Decimal,
    pub wallet_id: Uuid,
    pub from_wallet_id: Option<Uuid>,
    pub to_wallet_id: Option<Uuid>,
    pub initiated_by: Uuid,
    pub resulting_balance: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry to insert; `seq` and `created_at` come from the database
#[derive(Debug, Clone)]
pub struct NewTransactionRow {
    pub transaction_id: Uuid,
    pub kind: DbTransactionKind,
    pub status: DbTransactionStatus,
    pub currency: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub commission: Decimal,
    pub wallet_id: Uuid,
    pub from_wallet_id: Option<Uuid>,
    pub to_wallet_id: Option<Uuid>,
    pub initiated_by: Uuid,
    pub resulting_balance: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transaction_kind", rename_all = "snake_case")]
pub enum DbTransactionKind {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
pub enum DbTransactionStatus {
    Pending,
    Success,
    Failed,
}

/// Filters applied to a log query
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub wallet_ids: Vec<Uuid>,
    pub kind: Option<DbTransactionKind>,
    pub status: Option<DbTransactionStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub ascending: bool,
    pub limit: i64,
    pub offset: i64,
}

/// Per-kind totals
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KindTotalsRow {
    pub kind: DbTransactionKind,
    pub amount: Decimal,
    pub fee: Decimal,
    pub entries: i64,
}

pub async fn insert(conn: &mut PgConnection, row: &NewTransactionRow) -> Result<TransactionRow, DatabaseError> {
    let sql = format!(
        r#"
        INSERT INTO ledger_transactions (
            transaction_id, kind, status, currency, amount, fee, commission,
            wallet_id, from_wallet_id, to_wallet_id, initiated_by,
            resulting_balance, note
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {}
        "#,
        TRANSACTION_COLUMNS
    );
    let written = sqlx::query_as::<_, TransactionRow>(&sql)
        .bind(row.transaction_id)
        .bind(row.kind)
        .bind(row.status)
        .bind(&row.currency)
        .bind(row.amount)
        .bind(row.fee)
        .bind(row.commission)
        .bind(row.wallet_id)
        .bind(row.from_wallet_id)
        .bind(row.to_wallet_id)
        .bind(row.initiated_by)
        .bind(row.resulting_balance)
        .bind(&row.note)
        .fetch_one(&mut *conn)
        .await?;
    Ok(written)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
    builder.push(" WHERE TRUE");
    if !filter.wallet_ids.is_empty() {
        builder
            .push(" AND wallet_id = ANY(")
            .push_bind(filter.wallet_ids.clone())
            .push(")");
    }
    if let Some(kind) = filter.kind {
        builder.push(" AND kind = ").push_bind(kind);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(from) = filter.from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND created_at <= ").push_bind(to);
    }
}

/// Returns one page of matching entries and the total match count
pub async fn query(
    conn: &mut PgConnection,
    filter: &TransactionFilter,
) -> Result<(Vec<TransactionRow>, i64), DatabaseError> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ledger_transactions");
    push_filters(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM ledger_transactions",
        TRANSACTION_COLUMNS
    ));
    push_filters(&mut select, filter);
    if filter.ascending {
        select.push(" ORDER BY created_at ASC, seq ASC");
    } else {
        select.push(" ORDER BY created_at DESC, seq DESC");
    }
    select
        .push(" LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);

    let rows = select
        .build_query_as::<TransactionRow>()
        .fetch_all(&mut *conn)
        .await?;
    Ok((rows, total))
}

pub async fn totals_by_kind(
    conn: &mut PgConnection,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<KindTotalsRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, KindTotalsRow>(
        r#"
        SELECT
            kind,
            COALESCE(SUM(amount), 0) AS amount,
            COALESCE(SUM(fee), 0) AS fee,
            COUNT(*) AS entries
        FROM ledger_transactions
        WHERE $1::timestamptz IS NULL OR created_at >= $1
        GROUP BY kind
        "#,
    )
    .bind(since)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn wallet_volume(
    conn: &mut PgConnection,
    wallet_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Decimal, DatabaseError> {
    let volume = sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM ledger_transactions
        WHERE wallet_id = $1 AND created_at >= $2
        "#,
    )
    .bind(wallet_id)
    .bind(since)
    .fetch_one(&mut *conn)
    .await?;
    Ok(volume)
}

pub async fn count(conn: &mut PgConnection) -> Result<i64, DatabaseError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ledger_transactions")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
