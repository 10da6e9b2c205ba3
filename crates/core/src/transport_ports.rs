//! Port interface for the authenticated HTTP transport

use async_trait::async_trait;
use mailchimp_domain::Result;
use url::Url;

use crate::request::ApiRequest;

/// Performs one authenticated HTTP call against the versioned API root
///
/// Implementations return the raw response body on success (empty for
/// `204 No Content`) and a structured error for non-success statuses and
/// connectivity failures. Any retry policy lives here, never in the batching
/// layer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Versioned API root that resource paths are resolved against
    fn api_root(&self) -> &Url;

    /// Send a request and return the response body
    async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>>;
}
