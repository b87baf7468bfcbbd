//! Offset pagination for the customer list.

use serde::{Deserialize, Serialize};

use super::customer::Customer;

/// Page size used when the request does not carry a usable `size` or `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on `size`; larger requests are clamped to this value.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page request.
///
/// `page` is 1-based and `size` is always within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request, replacing zero values with defaults and
    /// clamping `size` to [`MAX_PAGE_SIZE`].
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        let page = if page == 0 { 1 } else { page };
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        Self { page, size }
    }

    /// Build a page request from raw query-string values.
    ///
    /// Missing, unparseable or non-positive values fall back to defaults.
    /// `limit` is the legacy alias for `size` and is only consulted when
    /// `size` is not usable.
    #[must_use]
    pub fn from_query(page: Option<&str>, size: Option<&str>, limit: Option<&str>) -> Self {
        let page = page.and_then(parse_positive).unwrap_or(1);
        let size = size
            .and_then(parse_positive)
            .or_else(|| limit.and_then(parse_positive))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self::new(page, size)
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The number of rows per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Rows to skip: `(page - 1) * size`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.size)
    }

    /// Rows to take, as bound into SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Total number of pages for `total` rows: `ceil(total / size)`.
    #[must_use]
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.size))
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

/// One page of customers, as returned by `GET /customers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPage {
    /// Total number of customers in the table.
    pub total: u64,
    /// The page that was returned (1-based).
    pub page: u32,
    /// Total number of pages at this page size.
    pub pages: u64,
    /// Page size that was applied (after clamping).
    pub size: u32,
    /// Number of customers in this page.
    pub count: usize,
    /// The customers, ordered by ascending id.
    pub customers: Vec<Customer>,
}

impl CustomerPage {
    /// Assemble a page from a request, the table total, and the fetched rows.
    #[must_use]
    pub fn new(request: PageRequest, total: u64, customers: Vec<Customer>) -> Self {
        Self {
            total,
            page: request.page(),
            pages: request.page_count(total),
            size: request.size(),
            count: customers.len(),
            customers,
        }
    }

    /// A page holding the result of an exact-name lookup.
    ///
    /// Lookups return at most one customer, so the result is always a single
    /// page (or no pages at all when nothing matched).
    #[must_use]
    pub fn single(size: u32, customer: Option<Customer>) -> Self {
        let customers: Vec<Customer> = customer.into_iter().collect();
        let total = customers.len() as u64;
        Self {
            total,
            page: 1,
            pages: total,
            size,
            count: customers.len(),
            customers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::from_query(None, None, None);
        assert_eq!(req.page(), 1);
        assert_eq!(req.size(), DEFAULT_PAGE_SIZE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let req = PageRequest::from_query(Some("abc"), Some("-5"), None);
        assert_eq!(req.page(), 1);
        assert_eq!(req.size(), DEFAULT_PAGE_SIZE);

        let req = PageRequest::from_query(Some("0"), Some("0"), None);
        assert_eq!(req.page(), 1);
        assert_eq!(req.size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_limit_alias() {
        let req = PageRequest::from_query(None, None, Some("7"));
        assert_eq!(req.size(), 7);

        // size wins over limit
        let req = PageRequest::from_query(None, Some("5"), Some("7"));
        assert_eq!(req.size(), 5);

        // unusable size falls through to limit
        let req = PageRequest::from_query(None, Some("x"), Some("7"));
        assert_eq!(req.size(), 7);
    }

    #[test]
    fn test_size_is_clamped() {
        let req = PageRequest::from_query(None, Some("1000"), None);
        assert_eq!(req.size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(3, 10);
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_page_count() {
        let req = PageRequest::new(1, 10);
        assert_eq!(req.page_count(0), 0);
        assert_eq!(req.page_count(10), 1);
        assert_eq!(req.page_count(15), 2);
        assert_eq!(req.page_count(21), 3);
    }

    #[test]
    fn test_page_metadata() {
        let page = CustomerPage::new(PageRequest::new(2, 10), 15, Vec::new());
        assert_eq!(page.total, 15);
        assert_eq!(page.pages, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.size, 10);
        assert_eq!(page.count, 0);
    }

    #[test]
    fn test_single_empty() {
        let page = CustomerPage::single(10, None);
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 0);
        assert!(page.customers.is_empty());
    }
}
