//! Operation encoder
//!
//! Pure transformation from a resolved request into the operation record the
//! batch endpoint expects. The stored path is relative to the API root so the
//! record does not depend on which API revision built the original call.

use std::collections::BTreeMap;

use mailchimp_domain::utils::is_version_segment;
use mailchimp_domain::{MailchimpError, Operation, Result};
use url::Url;

use crate::request::PendingRequest;

/// How malformed query-string fragments are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryParsing {
    /// Drop fragments that are not exactly `key=value`
    #[default]
    Lenient,
    /// Reject the request on the first malformed fragment
    Strict,
}

/// Converts pending requests into batch operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationEncoder {
    query_parsing: QueryParsing,
    api_root_path: Option<String>,
}

impl OperationEncoder {
    /// Lenient encoder that strips a leading version segment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query parsing mode
    pub fn with_query_parsing(mut self, mode: QueryParsing) -> Self {
        self.query_parsing = mode;
        self
    }

    /// Strip this root's path prefix instead of guessing the version segment
    ///
    /// Roots without a path (e.g. `http://localhost/`) leave the fallback in
    /// place.
    pub fn with_api_root(mut self, root: &Url) -> Self {
        let path = root.path().trim_end_matches('/');
        self.api_root_path = (!path.is_empty()).then(|| path.to_string());
        self
    }

    /// Current query parsing mode
    pub fn query_parsing(&self) -> QueryParsing {
        self.query_parsing
    }

    /// Encode a request into an operation
    ///
    /// # Errors
    /// Returns `MailchimpError::InvalidInput` when the path is empty or not
    /// absolute, the body is not UTF-8, or (in strict mode) the query string
    /// holds a malformed fragment.
    pub fn encode(&self, request: &PendingRequest) -> Result<Operation> {
        if !request.path.starts_with('/') {
            return Err(MailchimpError::InvalidInput(format!(
                "can't batch request without an absolute path: {:?}",
                request.path
            )));
        }

        let params = match request.query.as_deref() {
            None | Some("") => None,
            Some(raw) => self.param_map(raw)?,
        };

        let body = match request.body.as_deref() {
            None | Some([]) => None,
            Some(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                MailchimpError::InvalidInput(format!("request body is not UTF-8: {e}"))
            })?),
        };

        Ok(Operation {
            method: request.method,
            path: self.relative_path(&request.path),
            params,
            body,
            operation_id: None,
        })
    }

    fn relative_path(&self, path: &str) -> String {
        if let Some(root) = self.api_root_path.as_deref() {
            if let Some(rest) = path.strip_prefix(root) {
                if rest.is_empty() {
                    return "/".to_string();
                }
                if rest.starts_with('/') {
                    return rest.to_string();
                }
            }
        }
        strip_version_segment(path)
    }

    fn param_map(&self, raw: &str) -> Result<Option<BTreeMap<String, String>>> {
        let mut params = BTreeMap::new();
        for part in raw.split('&') {
            let kv: Vec<&str> = part.split('=').collect();
            match kv.as_slice() {
                [key, value] => {
                    params.insert((*key).to_string(), (*value).to_string());
                }
                _ if self.query_parsing == QueryParsing::Strict => {
                    return Err(MailchimpError::InvalidInput(format!(
                        "malformed query fragment: {part:?}"
                    )));
                }
                _ => {}
            }
        }
        Ok((!params.is_empty()).then_some(params))
    }
}

/// Remove a leading API version segment from a server path
///
/// `/3.0/lists/1` becomes `/lists/1`; paths without a leading version
/// segment are returned unchanged.
pub fn strip_version_segment(path: &str) -> String {
    let rest = path.strip_prefix('/').unwrap_or(path);
    let (first, tail) = match rest.split_once('/') {
        Some((first, tail)) => (first, Some(tail)),
        None => (rest, None),
    };

    if !is_version_segment(first) {
        return path.to_string();
    }

    match tail {
        Some(tail) => format!("/{tail}"),
        None => "/".to_string(),
    }
}
