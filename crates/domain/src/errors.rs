//! Error types used throughout the client
//!
//! A single taxonomy covers construction failures (malformed requests),
//! transport failures (network, status codes, timeouts) and decode failures.
//! Errors raised by a transport are passed through the batching layer
//! unchanged.

use std::time::Duration;

use thiserror::Error;

/// Categories of API errors for retry decisions made by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication errors (401, 403) - retry after fixing credentials
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth and rate limit) - non-retryable
    Client,
    /// Network/connection errors and timeouts - retryable
    Network,
    /// Local construction, encoding and decoding errors - non-retryable
    Local,
    /// Configuration errors - non-retryable
    Config,
}

/// Main error type for the Mailchimp client
#[derive(Debug, Error)]
pub enum MailchimpError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl MailchimpError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::RateLimit(_) => ErrorCategory::RateLimit,
            Self::Server(_) => ErrorCategory::Server,
            Self::NotFound(_) | Self::Client(_) => ErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ErrorCategory::Network,
            Self::InvalidInput(_) | Self::Decode(_) | Self::Serialization(_) | Self::Cancelled => {
                ErrorCategory::Local
            }
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Check if a caller may reasonably retry the failed call
    ///
    /// The batching layer never retries on its own; this is advice only.
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Server | ErrorCategory::Network
        )
    }

    /// Get suggested retry delay in seconds
    pub fn retry_delay_secs(&self) -> u64 {
        match self.category() {
            ErrorCategory::RateLimit => 60, // Wait for rate limit window
            ErrorCategory::Server => 10,
            ErrorCategory::Network => 5,
            ErrorCategory::Authentication
            | ErrorCategory::Client
            | ErrorCategory::Local
            | ErrorCategory::Config => 0,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, MailchimpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(MailchimpError::Auth("test".into()).category(), ErrorCategory::Authentication);
        assert_eq!(MailchimpError::RateLimit("test".into()).category(), ErrorCategory::RateLimit);
        assert_eq!(MailchimpError::Server("test".into()).category(), ErrorCategory::Server);
        assert_eq!(MailchimpError::NotFound("test".into()).category(), ErrorCategory::Client);
        assert_eq!(
            MailchimpError::Timeout(Duration::from_secs(1)).category(),
            ErrorCategory::Network
        );
        assert_eq!(MailchimpError::InvalidInput("test".into()).category(), ErrorCategory::Local);
        assert_eq!(MailchimpError::Cancelled.category(), ErrorCategory::Local);
    }

    #[test]
    fn test_should_retry() {
        assert!(MailchimpError::RateLimit("test".into()).should_retry());
        assert!(MailchimpError::Server("test".into()).should_retry());
        assert!(MailchimpError::Network("test".into()).should_retry());
        assert!(!MailchimpError::Auth("test".into()).should_retry());
        assert!(!MailchimpError::Client("test".into()).should_retry());
        assert!(!MailchimpError::InvalidInput("test".into()).should_retry());
        assert!(!MailchimpError::Decode("test".into()).should_retry());
    }

    #[test]
    fn test_retry_delays() {
        assert_eq!(MailchimpError::RateLimit("test".into()).retry_delay_secs(), 60);
        assert_eq!(MailchimpError::Server("test".into()).retry_delay_secs(), 10);
        assert_eq!(MailchimpError::Network("test".into()).retry_delay_secs(), 5);
        assert_eq!(MailchimpError::Client("test".into()).retry_delay_secs(), 0);
    }
}
