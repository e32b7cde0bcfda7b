//! MySQL access for the `/db-test` endpoint.
//!
//! The pool is created lazily: no connection is attempted until the first
//! query, so an unreachable database never delays or breaks startup. Each
//! query acquires one pooled connection and returns it when done.
//!
//! While the pool holds no connections, a query first makes one direct
//! connection attempt. The pool retries failed connects until its acquire
//! timeout and then reports only that it timed out; the direct attempt
//! surfaces the driver's own error (for example "Connection refused") at once.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{ConnectOptions, Connection};

use crate::config::DatabaseConfig;

/// Query issued by the database test endpoint
pub const NOW_QUERY: &str = "SELECT NOW() AS now";

/// One row of the test query result.
///
/// sqlx sets the session time zone to UTC, so `NOW()` is read as a UTC
/// instant and serialized as RFC 3339 with a trailing `Z`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct NowRow {
    pub now: DateTime<Utc>,
}

/// Source of the `/db-test` result.
#[async_trait]
pub trait NowQuery: Send + Sync {
    /// Run the test query and return every row.
    async fn now(&self) -> Result<Vec<NowRow>, sqlx::Error>;
}

/// Handle to the shared connection pool, cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: MySqlPool,
    options: MySqlConnectOptions,
    acquire_timeout: Duration,
}

impl Database {
    /// Build the pool without opening any connection.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);
        let acquire_timeout = Duration::from_secs(config.acquire_timeout_seconds);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy_with(options.clone());

        Self {
            pool,
            options,
            acquire_timeout,
        }
    }

    /// Number of connections currently held by the pool (idle or in use).
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    /// One direct connection attempt, bounded by the acquire timeout.
    async fn check_reachable(&self) -> Result<(), sqlx::Error> {
        match tokio::time::timeout(self.acquire_timeout, self.options.connect()).await {
            Ok(Ok(connection)) => {
                if let Err(e) = connection.close().await {
                    tracing::debug!(error = %e, "Failed to close check connection");
                }
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connect timed out after {}s", self.acquire_timeout.as_secs()),
            ))),
        }
    }
}

#[async_trait]
impl NowQuery for Database {
    #[tracing::instrument(name = "db::now", skip(self))]
    async fn now(&self) -> Result<Vec<NowRow>, sqlx::Error> {
        if self.pool.size() == 0 {
            self.check_reachable().await?;
        }

        let rows = sqlx::query_as::<_, NowRow>(NOW_QUERY)
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(rows = rows.len(), "Test query succeeded");
        Ok(rows)
    }
}
