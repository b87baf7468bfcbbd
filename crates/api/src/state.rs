//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::CustomerStore;
use crate::services::CustomerService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: CustomerStore,
    customers: CustomerService,
}

impl AppState {
    /// Build state around an opened store.
    #[must_use]
    pub fn new(store: CustomerStore) -> Self {
        let customers = CustomerService::new(Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                store,
                customers,
            }),
        }
    }

    /// Get the storage handle.
    #[must_use]
    pub fn store(&self) -> &CustomerStore {
        &self.inner.store
    }

    /// Get the customer service.
    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.customers
    }
}
