//! Mailchimp REST API transport
//!
//! [`ApiClient`] is the production [`Transport`](mailchimp_core::Transport):
//! basic auth, per-attempt timeouts, retry on transient failures and mapping
//! of HTTP status codes onto `MailchimpError`.

pub mod auth;
pub mod client;

pub use auth::{CredentialProvider, StaticApiKey};
pub use client::{ApiClient, ApiClientBuilder};
