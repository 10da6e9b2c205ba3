//! Authenticated API client
//!
//! Sends [`ApiRequest`]s to the versioned API root with basic auth and turns
//! non-success responses into structured errors. Retry and timeouts are
//! delegated to [`HttpClient`], which never repeats a `POST` or `PATCH` that
//! may have reached the server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mailchimp_core::{ApiRequest, Transport};
use mailchimp_domain::constants::BASIC_AUTH_USER;
use mailchimp_domain::{ApiConfig, HttpMethod, MailchimpError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::{CredentialProvider, StaticApiKey};
use crate::errors::InfraError;
use crate::http::HttpClient;
use crate::observability::RequestMetrics;

/// API client implementing [`Transport`]
pub struct ApiClient {
    http_client: HttpClient,
    auth: Arc<dyn CredentialProvider>,
    api_root: Url,
    metrics: Arc<RequestMetrics>,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Build a client from loaded configuration
    ///
    /// # Errors
    /// Returns `MailchimpError::Config` if the key is blank, the API root
    /// cannot be derived, or the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .auth(Arc::new(StaticApiKey::new(config.api_key.clone())?))
            .api_root(config.api_root()?)
            .timeout(config.timeout())
            .max_attempts(config.max_attempts)
            .base_backoff(config.backoff());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    /// Counters for requests made through this client
    pub fn metrics(&self) -> &Arc<RequestMetrics> {
        &self.metrics
    }

    fn map_status_error(status: StatusCode, url: &Url, body: &str) -> MailchimpError {
        let message = if body.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {body}")
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MailchimpError::Auth(message),
            StatusCode::NOT_FOUND => MailchimpError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => MailchimpError::RateLimit(message),
            s if s.is_server_error() => MailchimpError::Server(message),
            s if s.is_client_error() => MailchimpError::Client(message),
            _ => MailchimpError::Network(message),
        }
    }

    async fn execute(&self, request: &ApiRequest, url: Url) -> Result<Vec<u8>> {
        let key = self.auth.api_key().await?;

        let mut builder = self
            .http_client
            .request(to_reqwest_method(request.method), url.clone())
            .basic_auth(BASIC_AUTH_USER, Some(key));
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body.clone());
        }

        let response = self.http_client.send(builder).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| MailchimpError::from(InfraError::from(e)))?;

        if !status.is_success() {
            return Err(Self::map_status_error(status, &url, &String::from_utf8_lossy(&body)));
        }

        // No body by definition
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Ok(Vec::new());
        }

        debug!(%status, bytes = body.len(), "API request succeeded");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Transport for ApiClient {
    fn api_root(&self) -> &Url {
        &self.api_root
    }

    #[instrument(skip(self, request), fields(method = %request.method, path = %request.resource))]
    async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let url = request.url(&self.api_root)?;
        let sequence = self.metrics.record_sent();
        debug!(request = sequence, %url, "sending API request");

        match self.execute(request, url).await {
            Ok(body) => Ok(body),
            Err(err) => {
                self.metrics.record_failed();
                warn!(request = sequence, error = %err, "API request failed");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_root", &self.api_root.as_str())
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    auth: Option<Arc<dyn CredentialProvider>>,
    api_root: Option<String>,
    timeout: Option<Duration>,
    max_attempts: Option<usize>,
    base_backoff: Option<Duration>,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the credential provider
    pub fn auth(mut self, auth: Arc<dyn CredentialProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the versioned API root (e.g. `https://us13.api.mailchimp.com/3.0/`)
    pub fn api_root(mut self, root: impl Into<String>) -> Self {
        self.api_root = Some(root.into());
        self
    }

    /// Per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Total attempts per request (initial try + retries)
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Delay before the first retry of an idempotent request
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = Some(backoff);
        self
    }

    /// `User-Agent` header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the API client
    ///
    /// A root without a trailing slash gets one, so resource paths resolve
    /// below it.
    ///
    /// # Errors
    ///
    /// Returns `MailchimpError::Config` if required fields are missing, the
    /// root is not an absolute http(s) URL, or client creation fails
    pub fn build(self) -> Result<ApiClient> {
        let auth = self
            .auth
            .ok_or_else(|| MailchimpError::Config("credential provider not set".to_string()))?;
        let root = self
            .api_root
            .ok_or_else(|| MailchimpError::Config("API root not set".to_string()))?;

        let mut api_root = Url::parse(root.trim())
            .map_err(|e| MailchimpError::Config(format!("invalid API root {root:?}: {e}")))?;
        if !matches!(api_root.scheme(), "http" | "https") {
            return Err(MailchimpError::Config(format!("API root must be http(s): {root}")));
        }
        if !api_root.path().ends_with('/') {
            let path = format!("{}/", api_root.path());
            api_root.set_path(&path);
        }

        let mut http = HttpClient::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(attempts) = self.max_attempts {
            http = http.max_attempts(attempts);
        }
        if let Some(backoff) = self.base_backoff {
            http = http.base_backoff(backoff);
        }
        if let Some(agent) = self.user_agent {
            http = http.user_agent(agent);
        }

        Ok(ApiClient {
            http_client: http.build()?,
            auth,
            api_root,
            metrics: Arc::new(RequestMetrics::new()),
        })
    }
}
