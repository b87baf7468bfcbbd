//! Cache types for customers API responses.

use customers_core::{Customer, CustomerId, CustomerPage};

/// Cache key for read endpoints.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Page { page: u32, size: u32 },
    Name(String),
    Customer(CustomerId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Page(CustomerPage),
    /// Name lookups cache misses too, so a repeated search stays offline.
    Lookup(Option<Box<Customer>>),
    Customer(Box<Customer>),
}
