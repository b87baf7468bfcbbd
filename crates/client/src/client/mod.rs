//! HTTP client for the customers API.
//!
//! Reads are cached with `moka` (60-second TTL). Every successful create,
//! update or delete drops the whole cache, since any write can change page
//! contents, totals and name lookups.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use customers_core::{
    ApiErrorBody, CreatedCustomer, Customer, CustomerId, CustomerPage, CustomerPayload,
    DeletedCustomer, NameSlug, PageRequest,
};

use crate::error::ClientError;

pub use cache::{CacheKey, CacheValue};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

// =============================================================================
// CustomerClient
// =============================================================================

/// Client for the customers API.
///
/// Cheap to clone; clones share the connection pool and the cache.
#[derive(Clone)]
pub struct CustomerClient {
    inner: Arc<CustomerClientInner>,
}

struct CustomerClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CustomerClient {
    /// Create a client for the API served at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(CustomerClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
            }),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =========================================================================
    // Reads (cached)
    // =========================================================================

    /// Fetch one page of customers.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the API answers with an
    /// error.
    #[instrument(skip(self), fields(page = request.page(), size = request.size()))]
    pub async fn list(&self, request: PageRequest) -> Result<CustomerPage, ClientError> {
        let key = CacheKey::Page {
            page: request.page(),
            size: request.size(),
        };
        if let Some(CacheValue::Page(page)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for customer page");
            return Ok(page);
        }

        let mut url = self.endpoint(&["customers"])?;
        url.query_pairs_mut()
            .append_pair("page", &request.page().to_string())
            .append_pair("size", &request.size().to_string());

        let response = self.inner.client.get(url).send().await?;
        let page: CustomerPage = read_json(response).await?;

        self.inner.cache.insert(key, CacheValue::Page(page.clone())).await;
        Ok(page)
    }

    /// Look up a customer by exact name.
    ///
    /// A 404 from the API is reported as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` for any other failure.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn find_by_name(&self, slug: &NameSlug) -> Result<Option<Customer>, ClientError> {
        let key = CacheKey::Name(slug.as_str().to_owned());
        if let Some(CacheValue::Lookup(found)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for name lookup");
            return Ok(found.map(|c| *c));
        }

        let mut url = self.endpoint(&["customers"])?;
        url.query_pairs_mut().append_pair("name", slug.as_str());

        let response = self.inner.client.get(url).send().await?;
        let found = match read_json::<Customer>(response).await {
            Ok(customer) => Some(customer),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        self.inner
            .cache
            .insert(key, CacheValue::Lookup(found.clone().map(Box::new)))
            .await;
        Ok(found)
    }

    /// Fetch a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the customer does not
    /// exist.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: CustomerId) -> Result<Customer, ClientError> {
        let key = CacheKey::Customer(id);
        if let Some(CacheValue::Customer(customer)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for customer");
            return Ok(*customer);
        }

        let url = self.endpoint(&["customers", &id.to_string()])?;
        let response = self.inner.client.get(url).send().await?;
        let customer: Customer = read_json(response).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Customer(Box::new(customer.clone())))
            .await;
        Ok(customer)
    }

    /// Liveness check. Never cached.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the API is unreachable.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.endpoint(&["health"])?;
        let response = self.inner.client.get(url).send().await?;
        read_json(response).await
    }

    // =========================================================================
    // Writes (invalidate the cache)
    // =========================================================================

    /// Create a customer and return its id.
    ///
    /// Validation happens server-side; a rejected payload comes back as
    /// `ClientError::Api` with code 101, 102 or 200.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &CustomerPayload) -> Result<CustomerId, ClientError> {
        let url = self.endpoint(&["customers"])?;
        let response = self.inner.client.post(url).json(payload).send().await?;
        let created: CreatedCustomer = read_json(response).await?;

        self.invalidate_all();
        Ok(created.id)
    }

    /// Apply a partial update. Omitted fields keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    #[instrument(skip(self, payload), fields(id = %id))]
    pub async fn update(&self, id: CustomerId, payload: &CustomerPayload) -> Result<(), ClientError> {
        let url = self.endpoint(&["customers", &id.to_string()])?;
        let response = self.inner.client.put(url).json(payload).send().await?;
        read_empty(response).await?;

        self.invalidate_all();
        Ok(())
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the customer does not
    /// exist.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: CustomerId) -> Result<DeletedCustomer, ClientError> {
        let url = self.endpoint(&["customers", &id.to_string()])?;
        let response = self.inner.client.delete(url).send().await?;
        let deleted: DeletedCustomer = read_json(response).await?;

        self.invalidate_all();
        Ok(deleted)
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        debug!("Customer cache invalidated");
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Decode a success body, or turn an error status into `ClientError::Api`.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(api_error(status, &text));
    }

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse customers API response"
        );
        ClientError::Parse(e)
    })
}

/// Check the status of a response whose success body is empty.
async fn read_empty(response: reqwest::Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let text = response.text().await?;
    Err(api_error(status, &text))
}

fn api_error(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { error }) => ClientError::Api {
            status: status.as_u16(),
            code: Some(error.code),
            message: error.message,
            fields: error.fields.unwrap_or_default(),
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: None,
            message: body.chars().take(200).collect(),
            fields: Vec::new(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use customers_core::ErrorCode;

    use super::*;

    #[test]
    fn test_endpoint_appends_segments() {
        let client = CustomerClient::new("http://localhost:4000").unwrap();
        assert_eq!(
            client.endpoint(&["customers", "7"]).unwrap().as_str(),
            "http://localhost:4000/customers/7"
        );

        let client = CustomerClient::new("http://api.internal/v1/").unwrap();
        assert_eq!(
            client.endpoint(&["customers"]).unwrap().as_str(),
            "http://api.internal/v1/customers"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(matches!(
            CustomerClient::new("mailto:ops@example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(CustomerClient::new("not a url").is_err());
    }

    #[test]
    fn test_api_error_envelope() {
        let body = r#"{"error":{"message":"Missing required fields","code":102,"fields":["name"]}}"#;
        match api_error(StatusCode::BAD_REQUEST, body) {
            ClientError::Api {
                status,
                code,
                message,
                fields,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(ErrorCode::MissingRequiredFields));
                assert_eq!(message, "Missing required fields");
                assert_eq!(fields, vec!["name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_route_not_found() {
        let body = r#"{"error":{"message":"Route not found","code":"NOT_FOUND"}}"#;
        let err = api_error(StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        assert_eq!(err.code(), Some(ErrorCode::RouteNotFound));
    }

    #[test]
    fn test_api_error_without_envelope() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            err,
            ClientError::Api { status: 502, code: None, ref message, .. } if message == "upstream down"
        ));
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_cache() {
        let client = CustomerClient::new("http://localhost:4000").unwrap();
        let key = CacheKey::Name("jane-doe".to_string());
        client
            .inner
            .cache
            .insert(key.clone(), CacheValue::Lookup(None))
            .await;
        assert!(client.inner.cache.get(&key).await.is_some());

        client.invalidate_all();
        assert!(client.inner.cache.get(&key).await.is_none());
    }
}
