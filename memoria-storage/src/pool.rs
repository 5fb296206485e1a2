//! Connection pool configuration and construction, grounded on the
//! `PostgresConfig`/`PostgresBackend` shape: a small builder-style
//! config plus a pool wrapper that owns migrations and health checks.

use std::sync::Arc;

use deadpool_postgres::{Config as DeadpoolConfig, GenericClient, Pool, Runtime};
use memoria_core::{Status, StatusCode};
use tokio_postgres::NoTls;

use crate::migrations;

/// Connection settings for the Postgres-backed DAL.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub max_pool_size: usize,
}

impl PostgresConfig {
    /// Parse a `host:port/dbname` connection string (spec §0's `DB_URL`
    /// shape) plus separately supplied credentials.
    pub fn new(db_url: &str, user: impl Into<String>, password: impl Into<String>) -> Self {
        let (host_port, dbname) = db_url.split_once('/').unwrap_or((db_url, "memoria"));
        let (host, port) = host_port
            .split_once(':')
            .map(|(h, p)| (h, p.parse().unwrap_or(5432)))
            .unwrap_or((host_port, 5432));

        Self {
            host: host.to_string(),
            port,
            dbname: dbname.to_string(),
            user: user.into(),
            password: password.into(),
            max_pool_size: 16,
        }
    }

    #[must_use]
    pub fn with_max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }
}

/// A pooled connection to Postgres plus embedded migration support.
#[derive(Clone)]
pub struct PgPool {
    pool: Pool,
}

impl PgPool {
    /// Build the pool. Does not touch the network beyond the pool's own
    /// lazy first connection.
    pub fn new(config: &PostgresConfig) -> Result<Self, Status> {
        let mut cfg = DeadpoolConfig::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.dbname.clone());
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(config.max_pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| Status::with_cause(StatusCode::Unavailable, "failed to build pg pool", e))?;

        Ok(Self { pool })
    }

    pub async fn get_client(&self) -> Result<deadpool_postgres::Client, Status> {
        self.pool
            .get()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Unavailable, "failed to acquire pg connection", e))
    }

    /// `SELECT 1` liveness probe, used by the HTTP `/healthz` route.
    pub async fn is_healthy(&self) -> bool {
        match self.get_client().await {
            Ok(client) => client.simple_query("SELECT 1").await.is_ok(),
            Err(_) => false,
        }
    }

    /// Apply every embedded migration (spec §0: `refinery`-managed
    /// schema, idempotent across restarts).
    pub async fn run_migrations(&self) -> Result<(), Status> {
        let mut client = self.pool.get().await.map_err(|e| {
            Status::with_cause(StatusCode::Unavailable, "failed to acquire pg connection", e)
        })?;
        migrations::runner()
            .run_async(&mut *client)
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "migration failed", e))?;
        Ok(())
    }
}

pub type SharedPgPool = Arc<PgPool>;
