use sqlx::{Connection, PgConnection};
use trawl_core::AppError;

use crate::config::DatabaseConfig;
use crate::repository::RecordRepository;

/// Database facade: opens connections, runs migrations, vends the record
/// repository.
///
/// No pool is kept. Every operation opens its own connection and closes it
/// before returning, success or not.
#[derive(Debug, Clone)]
pub struct Database {
    config: DatabaseConfig,
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Open a fresh connection.
    pub async fn connect(&self) -> Result<PgConnection, AppError> {
        PgConnection::connect_with(self.config.options())
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        let result = sqlx::migrate!("../../migrations")
            .run(&mut conn)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")));
        close(conn).await;
        result
    }

    /// Connectivity check: create a throwaway `test_table` if missing.
    pub async fn probe(&self) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(
            "CREATE TABLE IF NOT EXISTS test_table (id SERIAL PRIMARY KEY, name TEXT)",
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(|e| AppError::DatabaseError(format!("Probe failed: {e}")));
        close(conn).await;

        if result.is_ok() {
            tracing::info!("Database connection successful");
        }
        result
    }

    /// Get a [`RecordRepository`] using this configuration.
    pub fn record_repo(&self) -> RecordRepository {
        RecordRepository::new(self.clone())
    }
}

/// Close a connection, logging rather than propagating failures.
pub(crate) async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close database connection");
    }
}
