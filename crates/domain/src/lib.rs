//! # Mailchimp Domain
//!
//! Wire types and shared definitions for the Mailchimp batch client.
//!
//! This crate contains:
//! - Batch wire types (`Operation`, `Batch`, `BatchStatus`)
//! - The error taxonomy and `Result` alias
//! - Configuration structures
//! - Path joining and API root helpers
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
