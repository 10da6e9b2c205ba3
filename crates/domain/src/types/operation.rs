//! Deferred operation records submitted inside a batch request

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MailchimpError;

/// HTTP verb accepted by the batch endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Uppercase verb as it appears on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = MailchimpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(MailchimpError::InvalidInput(format!("unsupported HTTP method: {other}"))),
        }
    }
}

/// A single deferred HTTP call
///
/// `path` is relative to the API root with the version segment removed.
/// `params` is `None` (and omitted on the wire) when the original request had
/// no usable query string; it is never an empty map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The HTTP method to use for the operation
    pub method: HttpMethod,

    /// The relative path to use for the operation
    pub path: String,

    /// URL params, only meaningful for GET operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,

    /// The exact JSON body of the original request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Caller-supplied id echoed back in the per-operation results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl Operation {
    /// Create an operation without params, body or id
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), params: None, body: None, operation_id: None }
    }

    /// Attach a correlation id
    pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }
}

/// Body of the batch submission request
#[derive(Debug, Serialize)]
pub struct BatchSubmission<'a> {
    /// Operations in the order they were recorded
    pub operations: &'a [Operation],
}
