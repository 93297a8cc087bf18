use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::StoreError;

const CREATE_USERS: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id      UUID PRIMARY KEY,
        uid     BIGINT NOT NULL UNIQUE,
        name    TEXT NOT NULL,
        age     INT NOT NULL,
        friends BIGINT[] NOT NULL DEFAULT '{}'
    )";

const CREATE_COUNTERS: &str = "
    CREATE TABLE IF NOT EXISTS counters (
        id  TEXT PRIMARY KEY,
        seq BIGINT NOT NULL
    )";

/// Owns the Postgres connection pool with an explicit lifecycle: opened once
/// at startup, injected into the store, closed at shutdown.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect using DATABASE_URL and the configured pool settings.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&url)
            .await?;

        info!("connected database pool");
        Ok(Self { pool })
    }

    /// Create the users and counters tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in [CREATE_USERS, CREATE_COUNTERS] {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool on shutdown.
    pub async fn close(self) {
        self.pool.close().await;
        info!("closed database pool");
    }
}
