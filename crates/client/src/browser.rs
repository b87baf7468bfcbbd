//! Listing state for browsing customers.
//!
//! [`CustomerBrowser`] keeps the current page of customers, the selected
//! customer and the active [`CustomerQuery`]. It never patches its list by
//! hand: after a successful write the client cache is dropped and the
//! current query is fetched again, so the view always matches the server.
//!
//! Every method takes `&mut self` and awaits its request before returning,
//! so a slow response can never overwrite the result of a newer query.

use tracing::{debug, warn};

use customers_core::{
    Customer, CustomerId, CustomerPage, CustomerPayload, NameSlug, PageRequest,
};

use crate::client::CustomerClient;
use crate::error::ClientError;

/// What the browser is currently showing.
///
/// Name filter, page and size compose: changing the page keeps the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerQuery {
    /// Exact-name filter; `None` lists everyone.
    pub name: Option<NameSlug>,
    /// 1-based page number.
    pub page: u32,
    /// Rows per page.
    pub size: u32,
}

impl CustomerQuery {
    /// First page of the unfiltered list.
    #[must_use]
    pub const fn new(size: u32) -> Self {
        Self {
            name: None,
            page: 1,
            size,
        }
    }

    /// The page request sent to the API.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}

/// Client-side view of the customer list.
pub struct CustomerBrowser {
    client: CustomerClient,
    query: CustomerQuery,
    customers: Vec<Customer>,
    selected: Option<Customer>,
    total: u64,
    pages: u64,
    loading: bool,
    last_error: Option<String>,
}

impl CustomerBrowser {
    /// Create a browser showing nothing yet; call [`refresh`](Self::refresh)
    /// to load the first page.
    #[must_use]
    pub const fn new(client: CustomerClient, page_size: u32) -> Self {
        Self {
            client,
            query: CustomerQuery::new(page_size),
            customers: Vec::new(),
            selected: None,
            total: 0,
            pages: 0,
            loading: false,
            last_error: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Customers on the current page.
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// The customer opened for viewing or editing.
    #[must_use]
    pub const fn selected(&self) -> Option<&Customer> {
        self.selected.as_ref()
    }

    /// The active query.
    #[must_use]
    pub const fn query(&self) -> &CustomerQuery {
        &self.query
    }

    /// Total matching customers across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages at the current page size.
    #[must_use]
    pub const fn pages(&self) -> u64 {
        self.pages
    }

    /// True while a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the most recent failure, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The underlying API client.
    #[must_use]
    pub const fn client(&self) -> &CustomerClient {
        &self.client
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetch the active query and replace the visible page.
    ///
    /// On failure the visible page is left unchanged and the error recorded.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the API request fails.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.fetch().await;
        self.loading = false;
        self.record(result)
    }

    async fn fetch(&mut self) -> Result<(), ClientError> {
        let page = match &self.query.name {
            Some(slug) => {
                let found = self.client.find_by_name(slug).await?;
                CustomerPage::single(self.query.size, found)
            }
            None => self.client.list(self.query.page_request()).await?,
        };

        self.total = page.total;
        self.pages = page.pages;
        self.query.size = page.size;
        self.customers = page.customers;
        debug!(
            count = self.customers.len(),
            total = self.total,
            page = self.query.page,
            "Customer view refreshed"
        );
        Ok(())
    }

    /// Apply search text.
    ///
    /// Non-blank text becomes an exact-name filter (slugified); blank text
    /// clears the filter. Either way the view returns to page 1.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the API request fails.
    pub async fn search(&mut self, text: &str) -> Result<(), ClientError> {
        self.query.name = NameSlug::from_name(text).ok();
        self.query.page = 1;
        self.refresh().await
    }

    /// Move to `page`. Targets outside `1..=pages` are ignored.
    ///
    /// Returns whether the page changed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the API request fails.
    pub async fn go_to_page(&mut self, page: u32) -> Result<bool, ClientError> {
        if page < 1 || u64::from(page) > self.pages {
            debug!(page, pages = self.pages, "Ignoring out-of-range page");
            return Ok(false);
        }
        self.query.page = page;
        self.refresh().await?;
        Ok(true)
    }

    /// Move to the next page, if there is one.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the API request fails.
    pub async fn next_page(&mut self) -> Result<bool, ClientError> {
        self.go_to_page(self.query.page.saturating_add(1)).await
    }

    /// Move to the previous page, if there is one.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the API request fails.
    pub async fn previous_page(&mut self) -> Result<bool, ClientError> {
        self.go_to_page(self.query.page.saturating_sub(1)).await
    }

    /// Open a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the API request fails; the previous
    /// selection is kept.
    pub async fn select(&mut self, id: CustomerId) -> Result<&Customer, ClientError> {
        self.loading = true;
        let result = self.client.get(id).await;
        self.loading = false;

        let customer = self.record(result)?;
        Ok(self.selected.insert(customer))
    }

    /// Close the opened customer.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a customer, then re-fetch the current query.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the create is rejected or a request fails.
    pub async fn create(&mut self, payload: &CustomerPayload) -> Result<CustomerId, ClientError> {
        self.loading = true;
        let result = self.client.create(payload).await;
        self.loading = false;

        let id = self.record(result)?;
        self.refresh().await?;
        Ok(id)
    }

    /// Update a customer, then re-fetch the current query (and the
    /// selection, if it is the updated customer).
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the update is rejected or a request fails.
    pub async fn update(
        &mut self,
        id: CustomerId,
        payload: &CustomerPayload,
    ) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.client.update(id, payload).await;
        self.loading = false;

        self.record(result)?;
        if self.selected.as_ref().is_some_and(|c| c.id == id) {
            self.select(id).await?;
        }
        self.refresh().await
    }

    /// Delete a customer, then re-fetch the current query.
    ///
    /// If the current page empties and is not the first, the view steps
    /// back to the last remaining page.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the delete is rejected or a request fails.
    pub async fn delete(&mut self, id: CustomerId) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.client.delete(id).await;
        self.loading = false;

        self.record(result)?;
        if self.selected.as_ref().is_some_and(|c| c.id == id) {
            self.selected = None;
        }

        self.refresh().await?;
        if self.customers.is_empty() && self.query.page > 1 {
            self.query.page = u32::try_from(self.pages.max(1)).unwrap_or(1);
            self.refresh().await?;
        }
        Ok(())
    }

    fn record<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Customer request failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
