//! Client for the customer records API.
//!
//! # Architecture
//!
//! - [`CustomerClient`] - typed `reqwest` wrapper with a `moka` response cache
//! - [`CustomerBrowser`] - listing state (page, selection, active query)
//!   rebuilt from the server after every mutation
//! - [`Debouncer`] - delays search input and emits only the latest value
//!
//! # Example
//!
//! ```rust,ignore
//! use customers_client::{CustomerBrowser, CustomerClient};
//!
//! let client = CustomerClient::new("http://localhost:4000")?;
//! let mut browser = CustomerBrowser::new(client, 10);
//!
//! browser.refresh().await?;
//! browser.search("jane doe").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod browser;
pub mod client;
pub mod debounce;
pub mod error;

pub use browser::{CustomerBrowser, CustomerQuery};
pub use client::{CustomerClient, HealthStatus};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use error::ClientError;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Page size the browser starts with.
pub const DEFAULT_BROWSER_PAGE_SIZE: u32 = 10;
