//! Actor repository
//!
//! Rows of the `actors` table. Every function takes a plain connection so
//! the same SQL serves pooled reads and statements inside a unit of work.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DatabaseError;

const ACTOR_COLUMNS: &str = r#"
    actor_id, name, email, phone, role, approval,
    fee_rate, commission_rate, wallet_id, created_at
"#;

/// Database representation of an actor
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActorRow {
    pub actor_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: DbRole,
    pub approval: DbApproval,
    pub fee_rate: Decimal,
    pub commission_rate: Decimal,
    pub wallet_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "actor_role", rename_all = "snake_case")]
pub enum DbRole {
    Admin,
    Agent,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
pub enum DbApproval {
    Pending,
    Approved,
    Suspended,
}

pub async fn get(conn: &mut PgConnection, actor_id: Uuid) -> Result<Option<ActorRow>, DatabaseError> {
    let sql = format!("SELECT {} FROM actors WHERE actor_id = $1", ACTOR_COLUMNS);
    let row = sqlx::query_as::<_, ActorRow>(&sql)
        .bind(actor_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_by_email(conn: &mut PgConnection, email: &str) -> Result<Option<ActorRow>, DatabaseError> {
    let sql = format!("SELECT {} FROM actors WHERE email = $1", ACTOR_COLUMNS);
    let row = sqlx::query_as::<_, ActorRow>(&sql)
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_by_phone(conn: &mut PgConnection, phone: &str) -> Result<Option<ActorRow>, DatabaseError> {
    let sql = format!("SELECT {} FROM actors WHERE phone = $1", ACTOR_COLUMNS);
    let row = sqlx::query_as::<_, ActorRow>(&sql)
        .bind(phone)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Inserts an actor; a taken email or phone surfaces as `DuplicateEntry`
pub async fn insert(conn: &mut PgConnection, row: &ActorRow) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO actors (
            actor_id, name, email, phone, role, approval,
            fee_rate, commission_rate, wallet_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(row.actor_id)
    .bind(&row.name)
    .bind(&row.email)
    .bind(&row.phone)
    .bind(row.role)
    .bind(row.approval)
    .bind(row.fee_rate)
    .bind(row.commission_rate)
    .bind(row.wallet_id)
    .bind(row.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Changes approval only if it differs; `None` when nothing was updated
pub async fn set_approval(
    conn: &mut PgConnection,
    actor_id: Uuid,
    approval: DbApproval,
) -> Result<Option<ActorRow>, DatabaseError> {
    let sql = format!(
        "UPDATE actors SET approval = $2 WHERE actor_id = $1 AND approval <> $2 RETURNING {}",
        ACTOR_COLUMNS
    );
    let row = sqlx::query_as::<_, ActorRow>(&sql)
        .bind(actor_id)
        .bind(approval)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn count_by_role(conn: &mut PgConnection, role: DbRole) -> Result<i64, DatabaseError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM actors WHERE role = $1")
        .bind(role)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn list_by_role(
    conn: &mut PgConnection,
    role: DbRole,
    limit: i64,
    offset: i64,
) -> Result<Vec<ActorRow>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM actors WHERE role = $1 ORDER BY created_at, actor_id LIMIT $2 OFFSET $3",
        ACTOR_COLUMNS
    );
    let rows = sqlx::query_as::<_, ActorRow>(&sql)
        .bind(role)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}
