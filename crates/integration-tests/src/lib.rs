//! Integration tests for the customer records service.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory store, no database needed
//! cargo test -p customers-integration-tests
//!
//! # PostgreSQL-backed tests (needs CUSTOMERS_DATABASE_URL)
//! cargo test -p customers-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `customers_api` - HTTP contract, client cache and browser flows
//! - `postgres_store` - Repository behavior against a real database

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use customers_api::config::ApiConfig;
use customers_api::db::{CustomerStore, MemoryCustomerRepository};
use customers_api::state::AppState;
use customers_client::CustomerClient;

/// A customers API served on an ephemeral local port.
///
/// The server shuts down gracefully when the handle is dropped.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    /// Serve a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if no local port can be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        Self::with_store(std::sync::Arc::new(MemoryCustomerRepository::new())).await
    }

    /// Serve the given store.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if no local port can be bound.
    pub async fn with_store(store: CustomerStore) -> std::io::Result<Self> {
        let config = ApiConfig::in_memory();
        let listener = TcpListener::bind(config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let state = AppState::new(store);
        let handle = tokio::spawn(customers_api::serve(listener, state, async move {
            let _ = rx.await;
        }));

        Ok(Self {
            addr,
            shutdown: Some(tx),
            handle,
        })
    }

    /// Base URL of the running server, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Absolute URL for `path` (which must start with `/`).
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    /// A typed client pointed at this server.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if the base URL is rejected.
    pub fn client(&self) -> Result<CustomerClient, customers_client::ClientError> {
        CustomerClient::new(&self.base_url())
    }

    /// Stop accepting connections and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns the server's I/O error, if it failed.
    pub async fn shutdown(mut self) -> std::io::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A complete, valid create payload with a unique email per `tag`.
#[must_use]
pub fn customer_json(name: &str, tag: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "email": format!("{tag}@example.com"),
        "phone": "555-0100",
        "address": "1 Main St",
        "country": "Canada",
    })
}
