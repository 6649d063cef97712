//! Connection pool construction, migrations and health probe.

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use crate::config::DatabaseConfig;

/// Create a connection pool from configuration.
///
/// When a lock timeout is configured, every new connection gets
/// `SET lock_timeout` so a `FOR UPDATE` on a busy session fails instead of
/// queueing indefinitely.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let lock_timeout_ms = config.lock_timeout().map(|d| d.as_millis());

    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(Some(config.idle_timeout()))
        .max_lifetime(Some(config.max_lifetime()))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if let Some(ms) = lock_timeout_ms {
                    conn.execute(format!("SET lock_timeout = {}", ms).as_str())
                        .await?;
                }
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

/// Apply the embedded migrations in `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Round-trip a trivial query.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
