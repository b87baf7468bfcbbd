//! Process-local customer repository.
//!
//! Holds every record in a `BTreeMap` keyed by id behind one `RwLock`.
//! Email uniqueness is checked and the write applied under the same write
//! guard, so concurrent inserts cannot both claim an address.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use customers_core::{Customer, CustomerId, CustomerPatch, NewCustomer, PageRequest};

use super::{CustomerRepository, RepositoryError};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<CustomerId, Customer>,
    last_id: i32,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<CustomerId>) -> bool {
        self.rows
            .values()
            .any(|c| c.email.as_str() == email && Some(c.id) != except)
    }
}

/// In-memory customer repository with the same semantics as the
/// `PostgreSQL` one.
#[derive(Debug, Default)]
pub struct MemoryCustomerRepository {
    table: RwLock<Table>,
}

impl MemoryCustomerRepository {
    /// Create an empty repository. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for MemoryCustomerRepository {
    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.table.read().await.rows.len() as u64)
    }

    async fn list(&self, request: PageRequest) -> Result<Vec<Customer>, RepositoryError> {
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = request.size() as usize;

        let table = self.table.read().await;
        Ok(table.rows.values().skip(skip).take(take).cloned().collect())
    }

    async fn find_by_name(&self, name_key: &str) -> Result<Option<Customer>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|c| c.name.to_lowercase() == name_key)
            .cloned())
    }

    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<CustomerId, RepositoryError> {
        let mut table = self.table.write().await;
        if table.email_taken(customer.email.as_str(), None) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        table.last_id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::DataCorruption("customer id overflow".to_owned()))?;
        let id = CustomerId::new(table.last_id);
        table
            .rows
            .insert(id, customer.clone().into_customer(id, Utc::now()));
        Ok(id)
    }

    async fn update(&self, id: CustomerId, patch: &CustomerPatch) -> Result<(), RepositoryError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(email) = &patch.email
            && table.email_taken(email.as_str(), Some(id))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let customer = table.rows.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        customer.apply(patch.clone(), Utc::now());
        Ok(())
    }

    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn close(&self) {}
}
