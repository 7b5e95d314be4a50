use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the database handle
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Explicitly constructed database handle.
///
/// Built once at process start from `DATABASE_URL`, cloned into the router
/// state, and closed at shutdown. Handlers receive it as an argument rather
/// than reaching for process-wide state.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Connect the pool using the configured URL and limits
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!("Connected database pool (max_connections={})", config.max_connections);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Cheap liveness probe used by the /health endpoint
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Idempotent schema bootstrap: status enum, entity tables, join table.
    ///
    /// Membership rows reference both sides with ON DELETE CASCADE, so a
    /// deleted user or project takes its membership rows with it. The
    /// (project_id, user_id) pair is unique at the storage layer.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        const DDL: &[&str] = &[
            r#"
            DO $$ BEGIN
                CREATE TYPE project_status AS ENUM ('pending', 'in progress', 'completed');
            EXCEPTION WHEN duplicate_object THEN NULL;
            END $$
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id    SERIAL PRIMARY KEY,
                name  VARCHAR(255) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                age   INTEGER NOT NULL CHECK (age > 0)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id          SERIAL PRIMARY KEY,
                title       VARCHAR(255) NOT NULL,
                description VARCHAR(1000) NOT NULL,
                status      project_status NOT NULL DEFAULT 'pending'
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS project_users (
                id         SERIAL PRIMARY KEY,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                UNIQUE (project_id, user_id)
            )
            "#,
        ];

        for statement in DDL {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Database schema ready");
        Ok(())
    }

    /// Drain and close the pool at shutdown
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
