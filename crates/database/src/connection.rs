use crate::error::DbError;
use configuration::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The URL and pool limits come from the `[database]` section of the configuration
/// (or `DATABASE_URL`). The pool is cheap to clone and shared by every repository call.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let database_url = config
        .url()
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await?;

    info!(max_connections = config.max_connections, "Connected to database");
    Ok(pool)
}

/// Applies the embedded migrations so the schema is up to date before a run writes to it.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
