//! console-core: shared infrastructure for the admin console crates.
pub mod config;
pub mod error;
pub mod observability;
