//! Reqwest wrapper with per-attempt timeouts and method-aware retry

use std::time::Duration;

use mailchimp_domain::constants::{
    DEFAULT_BACKOFF_MILLIS, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS,
};
use mailchimp_domain::MailchimpError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with per-attempt timeouts and retry on transient failures.
///
/// Idempotent methods (`GET`, `HEAD`, `PUT`, `DELETE`, `OPTIONS`) are retried
/// with exponential backoff on connection failures, timeouts and 5xx
/// responses. `POST` and `PATCH` are retried only when the connection could
/// not be established, so a write is never sent twice. Any other response is
/// returned to the caller as-is.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns `MailchimpError::Config` if the TLS backend cannot be set up.
    pub fn new() -> Result<Self, MailchimpError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// # Errors
    /// Returns `MailchimpError::Timeout` when the last attempt timed out, or
    /// the first for a `POST` or `PATCH`, and `MailchimpError::Network` for
    /// connection failures.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, MailchimpError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                MailchimpError::InvalidInput(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                MailchimpError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            let is_last = attempt + 1 >= attempts;
            let replayable = is_idempotent(&method);
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match tokio::time::timeout(self.timeout, self.client.execute(request)).await {
                Ok(Ok(response)) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if status.is_server_error() && replayable && !is_last {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Ok(response);
                }
                Ok(Err(err)) => {
                    debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");

                    if !is_last && should_retry_error(&err, replayable) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    let infra: InfraError = err.into();
                    return Err(MailchimpError::from(infra));
                }
                Err(_) => {
                    debug!(
                        attempt = attempt + 1,
                        %method,
                        %url,
                        timeout = ?self.timeout,
                        "HTTP request timed out"
                    );

                    if replayable && !is_last {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Err(MailchimpError::Timeout(self.timeout));
                }
            }
        }

        Err(MailchimpError::Network(
            "http client exhausted retries without producing a result".into(),
        ))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = u32::try_from(retry_number.saturating_sub(1).min(8)).unwrap_or(8);
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(DEFAULT_BACKOFF_MILLIS),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Deadline applied to each attempt separately.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Delay before the first retry, doubled for each later one.
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// `User-Agent` header sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers added to every request.
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Finish building the client.
    ///
    /// # Errors
    /// Returns `MailchimpError::Config` if the underlying client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpClient, MailchimpError> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| MailchimpError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient {
            client,
            timeout: self.timeout,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(method.as_str(), "GET" | "HEAD" | "PUT" | "DELETE" | "OPTIONS")
}

// A failed connect means no bytes reached the server.
fn should_retry_error(err: &reqwest::Error, replayable: bool) -> bool {
    if replayable {
        err.is_timeout() || err.is_connect() || err.is_request()
    } else {
        err.is_connect()
    }
}
