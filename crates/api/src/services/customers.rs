//! Customer operations behind the HTTP handlers.
//!
//! The service owns the rule ordering for each operation (id, then
//! existence, then payload validation, then the write) and turns storage
//! failures into [`CustomerError::Repository`] tagged with the message the
//! client will see.

use tracing::{info, instrument, warn};

use customers_core::{
    Customer, CustomerId, CustomerPage, CustomerPayload, IdParseError, NameSlug, PageRequest,
    ValidationError,
};

use crate::db::{CustomerStore, RepositoryError};

/// Errors returned by [`CustomerService`].
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Path id is not a positive integer.
    #[error("invalid customer id: {0}")]
    InvalidId(#[from] IdParseError),

    /// Payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another customer already uses this email.
    #[error("email already exists")]
    EmailTaken,

    /// No customer matched; carries the client-facing message.
    #[error("{0}")]
    NotFound(String),

    /// Storage failed; `action` is the client-facing summary.
    #[error("{action}: {source}")]
    Repository {
        action: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl CustomerError {
    fn customer_not_found() -> Self {
        Self::NotFound("Customer not found".to_owned())
    }

    fn repository(action: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| Self::Repository { action, source }
    }
}

/// Customer operations over the configured store.
#[derive(Clone)]
pub struct CustomerService {
    store: CustomerStore,
}

impl CustomerService {
    /// Create a service over an opened store.
    #[must_use]
    pub const fn new(store: CustomerStore) -> Self {
        Self { store }
    }

    /// One page of customers plus table-wide totals.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Repository` if the store fails.
    #[instrument(skip(self), fields(page = request.page(), size = request.size()))]
    pub async fn list(&self, request: PageRequest) -> Result<CustomerPage, CustomerError> {
        const ACTION: &str = "Failed to retrieve customers";

        let total = self
            .store
            .count()
            .await
            .map_err(CustomerError::repository(ACTION))?;
        let customers = self
            .store
            .list(request)
            .await
            .map_err(CustomerError::repository(ACTION))?;

        Ok(CustomerPage::new(request, total, customers))
    }

    /// Exact, case-insensitive lookup by name slug.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` naming the normalized name if no
    /// customer matches.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn find_by_name(&self, slug: &NameSlug) -> Result<Customer, CustomerError> {
        let name_key = slug.to_name_key();
        self.store
            .find_by_name(&name_key)
            .await
            .map_err(CustomerError::repository("Failed to retrieve customers"))?
            .ok_or_else(|| CustomerError::NotFound(format!("Customer '{name_key}' not found")))
    }

    /// Customer by raw path id.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::InvalidId` for a malformed id and
    /// `CustomerError::NotFound` if no customer has it.
    #[instrument(skip(self))]
    pub async fn get(&self, raw_id: &str) -> Result<Customer, CustomerError> {
        let id: CustomerId = raw_id.parse()?;
        self.fetch(id, "Failed to retrieve customer").await
    }

    /// Validate and insert a new customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Validation` for missing fields or a malformed
    /// email, and `CustomerError::EmailTaken` if the email is in use.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: CustomerPayload) -> Result<CustomerId, CustomerError> {
        let customer = payload.into_new_customer()?;

        let id = self
            .store
            .insert(&customer)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CustomerError::EmailTaken,
                other => CustomerError::Repository {
                    action: "Failed to create customer",
                    source: other,
                },
            })?;

        info!(id = %id, "Customer created");
        Ok(id)
    }

    /// Apply a partial update.
    ///
    /// Checks run in order: id format, existence, email format, blank
    /// required fields, then email uniqueness at write time.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a `CustomerError`.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, raw_id: &str, payload: CustomerPayload) -> Result<(), CustomerError> {
        const ACTION: &str = "Failed to update customer";

        let id: CustomerId = raw_id.parse()?;
        self.fetch(id, ACTION).await?;

        let patch = payload.into_patch()?;
        if patch.is_empty() {
            warn!(id = %id, "Empty update; only updated_at changes");
        }

        self.store.update(id, &patch).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CustomerError::EmailTaken,
            RepositoryError::NotFound => CustomerError::customer_not_found(),
            other => CustomerError::Repository {
                action: ACTION,
                source: other,
            },
        })?;

        info!(id = %id, "Customer updated");
        Ok(())
    }

    /// Hard-delete a customer and return its id.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::InvalidId` for a malformed id and
    /// `CustomerError::NotFound` if no row was deleted.
    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<CustomerId, CustomerError> {
        let id: CustomerId = raw_id.parse()?;

        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(CustomerError::repository("Failed to delete customer"))?;
        if !deleted {
            return Err(CustomerError::customer_not_found());
        }

        info!(id = %id, "Customer deleted");
        Ok(id)
    }

    async fn fetch(&self, id: CustomerId, action: &'static str) -> Result<Customer, CustomerError> {
        self.store
            .get(id)
            .await
            .map_err(CustomerError::repository(action))?
            .ok_or_else(CustomerError::customer_not_found)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use customers_core::EmailError;

    use super::*;
    use crate::db::MemoryCustomerRepository;

    fn service() -> CustomerService {
        CustomerService::new(Arc::new(MemoryCustomerRepository::new()))
    }

    fn payload(name: &str, email: &str) -> CustomerPayload {
        CustomerPayload {
            name: Some(name.to_owned()),
            email: Some(email.to_owned()),
            phone: Some("555-0100".to_owned()),
            address: Some("1 Main St".to_owned()),
            country: Some("Canada".to_owned()),
            ..CustomerPayload::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();
        let id = service
            .create(payload("Jane Doe", "jane@example.com"))
            .await
            .unwrap();

        let customer = service.get(&id.to_string()).await.unwrap();
        assert_eq!(customer.name, "Jane Doe");
        assert!(customer.region.is_none());
        assert_eq!(customer.created_at, customer.updated_at);
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let service = service();
        service.create(payload("A", "a@x.com")).await.unwrap();
        let result = service.create(payload("B", "a@x.com")).await;
        assert!(matches!(result, Err(CustomerError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_get_invalid_and_missing() {
        let service = service();
        assert!(matches!(
            service.get("abc").await,
            Err(CustomerError::InvalidId(_))
        ));
        assert!(matches!(
            service.get("0").await,
            Err(CustomerError::InvalidId(IdParseError::NotPositive(0)))
        ));
        assert!(matches!(
            service.get("99").await,
            Err(CustomerError::NotFound(msg)) if msg == "Customer not found"
        ));
    }

    #[tokio::test]
    async fn test_find_by_name_message_uses_normalized_name() {
        let service = service();
        service.create(payload("Jane Doe", "j@x.com")).await.unwrap();

        let slug = NameSlug::parse("Jane-DOE").unwrap();
        assert_eq!(service.find_by_name(&slug).await.unwrap().name, "Jane Doe");

        let slug = NameSlug::parse("john-smith").unwrap();
        assert!(matches!(
            service.find_by_name(&slug).await,
            Err(CustomerError::NotFound(msg)) if msg == "Customer 'john smith' not found"
        ));
    }

    #[tokio::test]
    async fn test_update_checks_existence_before_payload() {
        let service = service();
        let bad_email = CustomerPayload {
            email: Some("nope".to_owned()),
            ..CustomerPayload::default()
        };
        assert!(matches!(
            service.update("7", bad_email.clone()).await,
            Err(CustomerError::NotFound(_))
        ));

        let id = service.create(payload("A", "a@x.com")).await.unwrap();
        assert!(matches!(
            service.update(&id.to_string(), bad_email).await,
            Err(CustomerError::Validation(ValidationError::InvalidEmail(
                EmailError::MissingAtSymbol
            )))
        ));
    }

    #[tokio::test]
    async fn test_update_only_email() {
        let service = service();
        let id = service.create(payload("A", "a@x.com")).await.unwrap();
        let before = service.get(&id.to_string()).await.unwrap();

        service
            .update(
                &id.to_string(),
                CustomerPayload {
                    email: Some("new@x.com".to_owned()),
                    ..CustomerPayload::default()
                },
            )
            .await
            .unwrap();

        let after = service.get(&id.to_string()).await.unwrap();
        assert_eq!(after.email.as_str(), "new@x.com");
        assert_eq!(after.name, before.name);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_update_to_taken_email() {
        let service = service();
        service.create(payload("A", "a@x.com")).await.unwrap();
        let b = service.create(payload("B", "b@x.com")).await.unwrap();

        let result = service
            .update(
                &b.to_string(),
                CustomerPayload {
                    email: Some("a@x.com".to_owned()),
                    ..CustomerPayload::default()
                },
            )
            .await;
        assert!(matches!(result, Err(CustomerError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let service = service();
        let id = service.create(payload("A", "a@x.com")).await.unwrap();
        assert_eq!(service.delete(&id.to_string()).await.unwrap(), id);
        assert!(matches!(
            service.delete(&id.to_string()).await,
            Err(CustomerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_pagination_metadata() {
        let service = service();
        for i in 0..15 {
            service
                .create(payload(&format!("C{i}"), &format!("c{i}@x.com")))
                .await
                .unwrap();
        }

        let page = service.list(PageRequest::new(2, 10)).await.unwrap();
        assert_eq!(page.total, 15);
        assert_eq!(page.pages, 2);
        assert_eq!(page.count, 5);
        assert_eq!(page.customers.len(), 5);
    }
}
