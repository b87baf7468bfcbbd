//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! customers migrate
//! ```
//!
//! # Environment Variables
//!
//! Same as the API server: `CUSTOMERS_DATABASE_URL`, then `DATABASE_URL`,
//! then `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`.
//!
//! # Migration Files
//!
//! `crates/api/migrations/`, embedded into the binary at build time.

use customers_api::config::ApiConfig;
use customers_api::db;
use tracing::info;

/// Apply pending migrations to the customers database.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;

    info!("Connecting to customers database...");
    let pool = db::create_pool(config.database_url(), 1).await?;

    info!("Running customers migrations...");
    db::run_migrations(&pool).await?;

    pool.close().await;
    info!("Customers migrations complete!");
    Ok(())
}
