//! Customers CLI - migrations, seeding and remote management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! customers migrate
//!
//! # Seed customers from a YAML or JSON file
//! customers seed -f data/customers.yaml
//!
//! # Talk to a running API
//! customers list --page 2
//! customers find jane-doe
//! customers browse
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert customers from a file through the service rules
//! - `list`, `get`, `find`, `create`, `update`, `delete` - Remote CRUD
//! - `browse` - Interactive paging and debounced search

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};

use customers_client::{DEFAULT_API_URL, DEFAULT_BROWSER_PAGE_SIZE};
use customers_core::CustomerPayload;

mod commands;

#[derive(Parser)]
#[command(name = "customers")]
#[command(author, version, about = "Customer records CLI tools")]
struct Cli {
    /// Base URL of the customers API
    #[arg(long, global = true, env = "CUSTOMERS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed customers from a YAML or JSON file
    Seed {
        /// Path to a file holding a list of customers
        #[arg(short, long)]
        file: String,
    },
    /// List one page of customers
    List {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Customers per page
        #[arg(long, default_value_t = DEFAULT_BROWSER_PAGE_SIZE)]
        size: u32,
    },
    /// Show a customer by id
    Get {
        /// Customer id
        id: String,
    },
    /// Find a customer by exact name (e.g. `jane-doe` or "Jane Doe")
    Find {
        /// Name or name slug
        name: String,
    },
    /// Create a customer
    Create {
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Update a customer; omitted fields are left unchanged
    Update {
        /// Customer id
        id: String,

        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Delete a customer
    Delete {
        /// Customer id
        id: String,
    },
    /// Browse customers interactively
    Browse {
        /// Customers per page
        #[arg(long, default_value_t = DEFAULT_BROWSER_PAGE_SIZE)]
        size: u32,
    },
}

/// Customer fields shared by `create` and `update`.
///
/// All optional here; the API reports missing required fields on create.
#[derive(Args, Debug, Default)]
struct CustomerFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    postal_zip: Option<String>,
    #[arg(long)]
    numberrange: Option<i64>,
}

impl From<CustomerFields> for CustomerPayload {
    fn from(fields: CustomerFields) -> Self {
        Self {
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            address: fields.address,
            country: fields.country,
            region: fields.region,
            postal_zip: fields.postal_zip,
            numberrange: fields.numberrange,
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads CUSTOMERS_API_URL
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let api_url = cli.api_url;
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => {
            commands::seed::customers(&file).await?;
        }
        Commands::List { page, size } => commands::remote::list(&api_url, page, size).await?,
        Commands::Get { id } => commands::remote::get(&api_url, &id).await?,
        Commands::Find { name } => commands::remote::find(&api_url, &name).await?,
        Commands::Create { fields } => commands::remote::create(&api_url, fields.into()).await?,
        Commands::Update { id, fields } => {
            commands::remote::update(&api_url, &id, fields.into()).await?;
        }
        Commands::Delete { id } => commands::remote::delete(&api_url, &id).await?,
        Commands::Browse { size } => commands::browse::run(&api_url, size).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_flags_are_optional() {
        let cli = Cli::try_parse_from(["customers", "update", "7", "--email", "a@b.co"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_fields_into_payload() {
        let payload: CustomerPayload = CustomerFields {
            postal_zip: Some("12345".to_string()),
            ..CustomerFields::default()
        }
        .into();
        assert_eq!(payload.postal_zip.as_deref(), Some("12345"));
        assert!(payload.name.is_none());
    }
}
