//! NovaNest Core - goal tracking domain, XP ledger, services, and traits.
//!
//! This crate contains the business rules for personal and team goals.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod events;
pub mod goals;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
