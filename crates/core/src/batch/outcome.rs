//! Results of a dispatched call
//!
//! A call recorded into a batch has no response yet. Instead of handing back
//! an empty object typed as the real resource, dispatch returns
//! [`Outcome::Deferred`] so callers cannot mistake the placeholder for data.

use mailchimp_domain::constants::PLACEHOLDER_BODY;

/// Placeholder for a call that was recorded into a batch
///
/// Every recorded call yields the same value regardless of method or body.
/// Its JSON form is the empty object `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Deferred;

impl Deferred {
    /// Raw placeholder body
    pub fn as_bytes(self) -> &'static [u8] {
        PLACEHOLDER_BODY.as_bytes()
    }

    /// Placeholder as a JSON value
    pub fn to_json(self) -> serde_json::Value {
        serde_json::Value::Object(serde_json::Map::new())
    }
}

/// Result of dispatching a call: real data, or a batch placeholder
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The call was sent and the response decoded
    Completed(T),
    /// The call was recorded into the active batch
    Deferred(Deferred),
}

impl<T> Outcome<T> {
    /// Response data, or `None` for a deferred call
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    /// Whether the call was sent
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Whether the call was recorded into a batch
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Map completed data, passing placeholders through
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Deferred(placeholder) => Outcome::Deferred(placeholder),
        }
    }
}

impl<T> From<Deferred> for Outcome<T> {
    fn from(placeholder: Deferred) -> Self {
        Self::Deferred(placeholder)
    }
}
