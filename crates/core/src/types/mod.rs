//! Core types for customer records.
//!
//! This module provides type-safe wrappers for the customer domain.

pub mod customer;
pub mod email;
pub mod error;
pub mod id;
pub mod pagination;
pub mod slug;

pub use customer::{
    CreatedCustomer, Customer, CustomerPatch, CustomerPayload, DeletedCustomer, NewCustomer,
    REQUIRED_FIELDS, ValidationError,
};
pub use email::{Email, EmailError};
pub use error::{ApiErrorBody, ApiErrorDetail, ErrorCode};
pub use id::*;
pub use pagination::{CustomerPage, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest};
pub use slug::{NameSlug, SlugError};
