//! Seed the customers table from a file.
//!
//! The file holds a list of customers in YAML (JSON is accepted too, being
//! a subset). Every entry goes through the same validation and uniqueness
//! rules as `POST /customers`; entries whose email is already taken are
//! skipped, invalid entries are reported and skipped.

use std::path::Path;

use tracing::{error, info, warn};

use customers_api::config::ApiConfig;
use customers_api::db;
use customers_api::services::{CustomerError, CustomerService};
use customers_core::CustomerPayload;

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Customers inserted.
    pub inserted: usize,
    /// Entries skipped because their email already exists.
    pub skipped: usize,
    /// Entries rejected by validation, as (index in file, reason).
    pub invalid: Vec<(usize, String)>,
}

/// Parse a list of customers from YAML or JSON text.
///
/// # Errors
///
/// Returns `serde_yaml::Error` if the text is not a list of customer objects.
pub fn parse_customers(content: &str) -> Result<Vec<CustomerPayload>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Insert every customer through the service.
///
/// # Errors
///
/// Returns `CustomerError::Repository` if the store fails; validation and
/// duplicate-email failures are counted instead.
pub async fn seed(
    service: &CustomerService,
    customers: Vec<CustomerPayload>,
) -> Result<SeedReport, CustomerError> {
    let mut report = SeedReport::default();

    for (index, payload) in customers.into_iter().enumerate() {
        match service.create(payload).await {
            Ok(_) => report.inserted += 1,
            Err(CustomerError::EmailTaken) => report.skipped += 1,
            Err(CustomerError::Validation(e)) => {
                warn!(index, error = %e, "Skipping invalid customer");
                report.invalid.push((index, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Seed customers from `file_path` into the configured store.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the store
/// fails.
pub async fn customers(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading customers from file");
    let content = tokio::fs::read_to_string(path).await?;
    let customers = parse_customers(&content)?;
    info!(count = customers.len(), "Parsed customers");

    let config = ApiConfig::from_env()?;
    let store = db::open_store(&config).await?;
    let service = CustomerService::new(std::sync::Arc::clone(&store));

    let result = seed(&service, customers).await;
    store.close().await;
    let report = result?;

    info!("Seeding complete!");
    info!("  Customers inserted: {}", report.inserted);
    info!("  Customers skipped (email exists): {}", report.skipped);

    if !report.invalid.is_empty() {
        error!("  Invalid entries: {}", report.invalid.len());
        for (index, reason) in &report.invalid {
            error!("    - #{index}: {reason}");
        }
    }

    Ok(())
}
