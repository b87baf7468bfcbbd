//! CLI command implementations.

pub mod browse;
pub mod migrate;
pub mod remote;
pub mod seed;
