//! Conversions from external infrastructure errors into the client error.

use mailchimp_domain::MailchimpError;
use reqwest::Error as HttpError;

/// Error newtype that keeps reqwest conversions on the infrastructure side.
///
/// HTTP statuses are not mapped here; the API client reads the body first so
/// the message can carry it.
#[derive(Debug)]
pub struct InfraError(pub MailchimpError);

impl From<InfraError> for MailchimpError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

trait IntoMailchimpError {
    fn into_mailchimp(self) -> MailchimpError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MailchimpError */
/* -------------------------------------------------------------------------- */

impl IntoMailchimpError for HttpError {
    fn into_mailchimp(self) -> MailchimpError {
        if self.is_timeout() {
            return MailchimpError::Network(format!("HTTP request timed out: {self}"));
        }

        if self.is_connect() {
            return MailchimpError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return MailchimpError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return MailchimpError::Decode(format!("failed to read response body: {self}"));
        }

        MailchimpError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_mailchimp())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
