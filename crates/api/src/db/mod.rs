//! Database operations for the customers service.
//!
//! # Tables
//!
//! - `customers` - Customer records (unique index on `email`)
//!
//! # Storage backends
//!
//! [`CustomerRepository`] is implemented by:
//! - [`PgCustomerRepository`] - `PostgreSQL` via a bounded pool
//! - [`MemoryCustomerRepository`] - Process-local map with the same semantics
//!
//! The service holds the chosen backend as a [`CustomerStore`] handle that is
//! opened once at startup and closed after graceful shutdown.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p customers-cli -- migrate
//! ```

pub mod customers;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use customers_core::{Customer, CustomerId, CustomerPatch, NewCustomer, PageRequest};

use crate::config::{ApiConfig, StorageBackend};

pub use customers::PgCustomerRepository;
pub use memory::MemoryCustomerRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence operations over the customers table.
///
/// Implementations must enforce email uniqueness atomically: two concurrent
/// inserts (or updates) claiming the same email must not both succeed.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Number of stored customers.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// One page of customers ordered by ascending id.
    async fn list(&self, request: PageRequest) -> Result<Vec<Customer>, RepositoryError>;

    /// Customer whose lowercased name equals `name_key` (lowest id wins).
    async fn find_by_name(&self, name_key: &str) -> Result<Option<Customer>, RepositoryError>;

    /// Customer by primary key.
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Insert a customer and return its new id.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already in use.
    async fn insert(&self, customer: &NewCustomer) -> Result<CustomerId, RepositoryError>;

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// Returns `RepositoryError::NotFound` if no row has this id and
    /// `RepositoryError::Conflict` if the new email belongs to another row.
    async fn update(&self, id: CustomerId, patch: &CustomerPatch) -> Result<(), RepositoryError>;

    /// Delete a customer. Returns `false` if no row had this id.
    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Release backend resources. Further calls may fail.
    async fn close(&self);
}

/// Shared handle to the configured repository.
pub type CustomerStore = Arc<dyn CustomerRepository>;

/// Create a `PostgreSQL` connection pool.
///
/// The pool is bounded: when every connection is in use, requests wait up
/// to the acquire timeout instead of failing immediately.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

/// Run the embedded migrations from `crates/api/migrations/`.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Open the store selected by the configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the `PostgreSQL` pool cannot be created.
pub async fn open_store(config: &ApiConfig) -> Result<CustomerStore, sqlx::Error> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool =
                create_pool(config.database_url(), config.database.max_connections).await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                "Database pool created"
            );
            Ok(Arc::new(PgCustomerRepository::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; customer records will not persist");
            Ok(Arc::new(MemoryCustomerRepository::new()))
        }
    }
}
