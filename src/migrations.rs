//! Schema migrations, delegated to `sqlx::migrate`.
//!
//! Each call opens its own connection (never one from the pool) and closes
//! it on every exit path. Applied versions are tracked by sqlx in
//! `_sqlx_migrations`.

use std::collections::HashSet;

use axum::async_trait;
use serde::Serialize;
use sqlx::{
    migrate::{Migrate, MigrateError, Migrator},
    Connection, PgConnection,
};
use tracing::{info, instrument, warn};

use crate::error::AppError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const LIST_FAILED: &str = "Failed to list pending migrations.";
const RUN_FAILED: &str = "Failed to run pending migrations.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationInfo {
    pub version: i64,
    pub description: String,
}

#[async_trait]
pub trait MigrationRunner: Send + Sync {
    async fn list_pending(&self) -> Result<Vec<MigrationInfo>, AppError>;
    /// Applies pending migrations and returns the ones that ran.
    async fn run_pending(&self) -> Result<Vec<MigrationInfo>, AppError>;
}

#[derive(Clone)]
pub struct PgMigrationRunner {
    database_url: String,
}

impl PgMigrationRunner {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    async fn connect(&self) -> Result<PgConnection, sqlx::Error> {
        PgConnection::connect(&self.database_url).await
    }
}

async fn pending(conn: &mut PgConnection) -> Result<Vec<MigrationInfo>, MigrateError> {
    conn.ensure_migrations_table().await?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    Ok(MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .filter(|m| !applied.contains(&m.version))
        .map(|m| MigrationInfo {
            version: m.version,
            description: m.description.to_string(),
        })
        .collect())
}

async fn apply(conn: &mut PgConnection) -> Result<Vec<MigrationInfo>, MigrateError> {
    let todo = pending(conn).await?;
    if !todo.is_empty() {
        // Equivalent to `MIGRATOR.run(&mut *conn)`; calling `run_direct` avoids
        // an `Acquire` lifetime-inference error inside the `Send` trait future.
        MIGRATOR.run_direct(conn).await?;
    }
    Ok(todo)
}

async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "closing migration connection failed");
    }
}

#[async_trait]
impl MigrationRunner for PgMigrationRunner {
    #[instrument(skip(self))]
    async fn list_pending(&self) -> Result<Vec<MigrationInfo>, AppError> {
        let mut conn = self
            .connect()
            .await
            .map_err(|e| AppError::service(LIST_FAILED, e))?;
        let result = pending(&mut conn).await;
        release(conn).await;
        result.map_err(|e| AppError::service(LIST_FAILED, e))
    }

    #[instrument(skip(self))]
    async fn run_pending(&self) -> Result<Vec<MigrationInfo>, AppError> {
        let mut conn = self
            .connect()
            .await
            .map_err(|e| AppError::service(RUN_FAILED, e))?;
        let result = apply(&mut conn).await;
        release(conn).await;

        let ran = result.map_err(|e| AppError::service(RUN_FAILED, e))?;
        info!(count = ran.len(), "migrations applied");
        Ok(ran)
    }
}
