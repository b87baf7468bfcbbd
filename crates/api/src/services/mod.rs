//! Business logic services for the customers API.
//!
//! # Services
//!
//! - `customers` - Validation, uniqueness and not-found rules over the
//!   configured [`CustomerStore`](crate::db::CustomerStore)

pub mod customers;

pub use customers::{CustomerError, CustomerService};
