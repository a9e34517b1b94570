//! PostgreSQL container for the ledger integration tests
//!
//! Every `LedgerDatabase` is its own container with the ledger schema
//! applied, so tests never share rows. Suites that use it are `#[ignore]`d
//! and run with `cargo test -- --ignored` where Docker is available.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const IMAGE: (&str, &str) = ("postgres", "16-alpine");
const USER: &str = "ledger";
const PASSWORD: &str = "ledger";
const DATABASE: &str = "wallet_test";

const SCHEMA: &str = include_str!("../../../migrations/20240101_000001_initial_schema.sql");

pub type DatabaseResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Tables the ledger writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerTable {
    Actors,
    Wallets,
    Transactions,
}

impl LedgerTable {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerTable::Actors => "actors",
            LedgerTable::Wallets => "wallets",
            LedgerTable::Transactions => "ledger_transactions",
        }
    }
}

fn connection_url(host: &str, port: u16) -> String {
    format!("postgres://{USER}:{PASSWORD}@{host}:{port}/{DATABASE}")
}

/// A running PostgreSQL container with the ledger schema
pub struct LedgerDatabase {
    _container: ContainerAsync<GenericImage>,
    pool: PgPool,
}

impl LedgerDatabase {
    /// Starts a container and applies the ledger schema
    pub async fn start() -> DatabaseResult<Self> {
        let (image, tag) = IMAGE;
        let container = GenericImage::new(image, tag)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr(
                "database system is ready to accept connections",
            ))
            .with_env_var("POSTGRES_USER", USER)
            .with_env_var("POSTGRES_PASSWORD", PASSWORD)
            .with_env_var("POSTGRES_DB", DATABASE)
            .start()
            .await?;

        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(5432).await?;
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&connection_url(&host, port))
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        Ok(Self {
            _container: container,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn row_count(&self, table: LedgerTable) -> DatabaseResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        Ok(sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?)
    }
}
