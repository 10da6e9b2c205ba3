//! API key credentials
//!
//! The API authenticates with HTTP basic auth: any username, the API key as
//! password. Keys come from a [`CredentialProvider`] so they can be rotated
//! or fetched from a secret store without rebuilding the client.

use async_trait::async_trait;
use mailchimp_domain::{MailchimpError, Result};

/// Trait for providing the API key
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get the current API key
    async fn api_key(&self) -> Result<String>;
}

/// Fixed API key known at construction time
#[derive(Clone)]
pub struct StaticApiKey {
    key: String,
}

impl StaticApiKey {
    /// Wrap a key
    ///
    /// # Errors
    /// Returns `MailchimpError::Config` for a blank key.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(MailchimpError::Config("API key is empty".to_string()));
        }
        Ok(Self { key })
    }
}

impl std::fmt::Debug for StaticApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticApiKey").field("key", &"<redacted>").finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticApiKey {
    async fn api_key(&self) -> Result<String> {
        Ok(self.key.clone())
    }
}
