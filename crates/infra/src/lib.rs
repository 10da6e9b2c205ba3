//! # Mailchimp Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The HTTP transport (`ApiClient`) with basic auth, retry and timeouts
//! - Configuration loading from the environment and JSON/TOML files
//! - Tracing setup and request counters
//! - The `MailchimpClient` facade
//!
//! ## Architecture
//! - Implements traits defined in `mailchimp-core`
//! - Contains all "impure" code (network, environment, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod mailchimp;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder, CredentialProvider, StaticApiKey};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use mailchimp::MailchimpClient;
pub use observability::{init_tracing, LogFormat, RequestMetrics};
