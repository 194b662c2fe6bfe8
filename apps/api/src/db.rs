use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;

/// Connection pool for the talentd database. Pool size comes from config
/// (`DB_MAX_CONNECTIONS`); uploads, AI handlers, and the background resume
/// pipeline all share this pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    info!(
        "Connecting to talentd database (max {} connections)",
        config.db_max_connections
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    info!("Database pool ready");
    Ok(pool)
}
