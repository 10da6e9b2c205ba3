//! Outbound request representations
//!
//! [`ApiRequest`] is what resource wrappers build: a verb, a resource path
//! relative to the API root, query parameters and an optional JSON body.
//! [`PendingRequest`] is the same call after resolution against the API root,
//! i.e. the full server path and raw query string that would go on the wire.

use mailchimp_domain::utils::single_joining_slash;
use mailchimp_domain::{HttpMethod, MailchimpError, Result};
use serde::Serialize;
use url::Url;

/// A resource call before it is sent or recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP verb
    pub method: HttpMethod,
    /// Path relative to the API root (e.g. `lists/123/members`)
    pub resource: String,
    /// Query parameters in insertion order
    pub params: Vec<(String, String)>,
    /// Serialized JSON body
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Create a bodyless request
    pub fn new(method: HttpMethod, resource: impl Into<String>) -> Self {
        Self { method, resource: resource.into(), params: Vec::new(), body: None }
    }

    /// `GET` a resource
    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, resource)
    }

    /// `DELETE` a resource
    pub fn delete(resource: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, resource)
    }

    /// `POST` a JSON body to a resource
    ///
    /// # Errors
    /// Returns `MailchimpError::Serialization` if the body cannot be encoded.
    pub fn post<T: Serialize + ?Sized>(resource: impl Into<String>, body: &T) -> Result<Self> {
        Self::new(HttpMethod::Post, resource).with_json(body)
    }

    /// `PUT` a JSON body to a resource
    ///
    /// # Errors
    /// Returns `MailchimpError::Serialization` if the body cannot be encoded.
    pub fn put<T: Serialize + ?Sized>(resource: impl Into<String>, body: &T) -> Result<Self> {
        Self::new(HttpMethod::Put, resource).with_json(body)
    }

    /// `PATCH` a JSON body to a resource
    ///
    /// # Errors
    /// Returns `MailchimpError::Serialization` if the body cannot be encoded.
    pub fn patch<T: Serialize + ?Sized>(resource: impl Into<String>, body: &T) -> Result<Self> {
        Self::new(HttpMethod::Patch, resource).with_json(body)
    }

    /// Replace the body with the JSON encoding of `body`
    ///
    /// # Errors
    /// Returns `MailchimpError::Serialization` if the body cannot be encoded.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes =
            serde_json::to_vec(body).map_err(|e| MailchimpError::Serialization(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Append a query parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Resolve against the versioned API root
    ///
    /// Parameters are form-encoded into the query string.
    ///
    /// # Errors
    /// Returns `MailchimpError::InvalidInput` if the joined URL does not parse.
    pub fn url(&self, api_root: &Url) -> Result<Url> {
        let joined = single_joining_slash(api_root.as_str(), &self.resource);
        let mut url = Url::parse(&joined).map_err(|e| {
            MailchimpError::InvalidInput(format!("malformed request URL {joined}: {e}"))
        })?;

        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }

        Ok(url)
    }
}

/// A request resolved to its wire form, ready to be sent or recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// HTTP verb
    pub method: HttpMethod,
    /// Full server path, including the versioned API root
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    /// Raw body bytes
    pub body: Option<Vec<u8>>,
}

impl PendingRequest {
    /// Create a request for `path` with no query or body
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: None, body: None }
    }

    /// Take path and query from a resolved URL
    pub fn from_url(method: HttpMethod, url: &Url, body: Option<Vec<u8>>) -> Self {
        Self {
            method,
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
            body,
        }
    }

    /// Set the raw query string
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the raw body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}
