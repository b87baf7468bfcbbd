//! Customers Core - Shared types library.
//!
//! This crate provides the types shared by every component of the customer
//! records system:
//! - `api` - The HTTP service that owns the `customers` table
//! - `client` - Typed HTTP client and listing state used by front ends
//! - `cli` - Command-line tools for migrations, seeding and remote commands
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. Both sides of the wire deserialize the same
//! structs, so the JSON contract lives in exactly one place.
//!
//! # Modules
//!
//! - [`types`] - Customer records, ids, emails, name slugs, pagination and
//!   the `{error: {message, code}}` envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
