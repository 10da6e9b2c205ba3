//! Server-side batch job records

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/* -------------------------------------------------------------------------- */
/* Batch Status */
/* -------------------------------------------------------------------------- */

/// Lifecycle of an asynchronous batch job
///
/// Unrecognised values are kept verbatim in [`BatchStatus::Other`] so that a
/// new server-side state never fails a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BatchStatus {
    /// Accepted, not yet looked at
    Pending,
    /// Operations are being validated and expanded
    Preprocessing,
    /// Operations are executing
    Started,
    /// Results are being archived
    Finalizing,
    /// All operations completed; the result archive is available
    Finished,
    /// Any status this client does not know about
    Other(String),
}

impl BatchStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Preprocessing => "preprocessing",
            Self::Started => "started",
            Self::Finalizing => "finalizing",
            Self::Finished => "finished",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the job will make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl From<String> for BatchStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "preprocessing" => Self::Preprocessing,
            "started" => Self::Started,
            "finalizing" => Self::Finalizing,
            "finished" => Self::Finished,
            _ => Self::Other(value),
        }
    }
}

impl From<BatchStatus> for String {
    fn from(value: BatchStatus) -> Self {
        match value {
            BatchStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* -------------------------------------------------------------------------- */
/* Batch */
/* -------------------------------------------------------------------------- */

/// Handle for an asynchronous batch job, as returned on submission and polls
///
/// Counters satisfy `finished <= total` and `errored <= finished` on every
/// response the server sends. Per-operation outcomes live only in the archive
/// behind `response_body_url`, which is set once the job is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Opaque job identifier
    pub id: String,

    /// Current lifecycle status
    pub status: BatchStatus,

    /// Total number of operations in the job
    #[serde(default)]
    pub total_operations: u32,

    /// Completed operations, including those that returned an error
    #[serde(default)]
    pub finished_operations: u32,

    /// Completed operations that returned an error
    #[serde(default)]
    pub errored_operations: u32,

    /// When the server received the job
    #[serde(default, deserialize_with = "empty_as_none_datetime")]
    pub submitted_at: Option<DateTime<FixedOffset>>,

    /// When all operations completed; `None` until the job is finished
    #[serde(default, deserialize_with = "empty_as_none_datetime")]
    pub completed_at: Option<DateTime<FixedOffset>>,

    /// Location of the gzipped archive of per-operation results
    #[serde(default, deserialize_with = "empty_as_none_string")]
    pub response_body_url: Option<String>,
}

impl Batch {
    /// Whether the job reached its terminal status
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Operations not yet completed
    pub fn pending_operations(&self) -> u32 {
        self.total_operations.saturating_sub(self.finished_operations)
    }

    /// Completed operations that did not error
    pub fn succeeded_operations(&self) -> u32 {
        self.finished_operations.saturating_sub(self.errored_operations)
    }

    /// Check the counter ordering the server guarantees
    pub fn counters_consistent(&self) -> bool {
        self.finished_operations <= self.total_operations
            && self.errored_operations <= self.finished_operations
    }

    /// Result archive location, only once the job is finished
    pub fn results_url(&self) -> Option<&str> {
        if self.is_finished() {
            self.response_body_url.as_deref()
        } else {
            None
        }
    }
}

/// Page of batch jobs returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchList {
    /// Jobs on this page
    #[serde(default)]
    pub batches: Vec<Batch>,

    /// Total number of jobs across all pages
    #[serde(default)]
    pub total_items: u32,
}

fn empty_as_none_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

fn empty_as_none_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            DateTime::parse_from_rfc3339(value).map(Some).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PENDING: &str = r#"{"id":"8cxk2b5b4a","status":"pending","total_operations":2,
        "finished_operations":0,"errored_operations":0,
        "submitted_at":"2016-09-16T14:55:51+00:00","completed_at":"","response_body_url":""}"#;

    #[test]
    fn decodes_pending_batch_with_empty_fields() {
        let batch: Batch = serde_json::from_str(PENDING).unwrap();

        assert_eq!(batch.id, "8cxk2b5b4a");
        assert_eq!(batch.status, BatchStatus::Pending);
        assert_eq!(batch.total_operations, 2);
        assert_eq!(batch.pending_operations(), 2);
        assert_eq!(
            batch.submitted_at,
            Some(DateTime::parse_from_rfc3339("2016-09-16T14:55:51+00:00").unwrap())
        );
        assert!(batch.completed_at.is_none());
        assert!(batch.response_body_url.is_none());
        assert!(!batch.is_finished());
        assert!(batch.counters_consistent());
    }

    #[test]
    fn finished_batch_exposes_results_url() {
        let batch: Batch = serde_json::from_str(
            r#"{"id":"b1","status":"finished","total_operations":3,"finished_operations":3,
            "errored_operations":1,"submitted_at":"2016-09-16T14:55:51+00:00",
            "completed_at":"2016-09-16T14:56:10+00:00",
            "response_body_url":"https://example.com/results.tar.gz"}"#,
        )
        .unwrap();

        assert!(batch.is_finished());
        assert_eq!(batch.succeeded_operations(), 2);
        assert_eq!(batch.results_url(), Some("https://example.com/results.tar.gz"));
        assert!(batch.completed_at.is_some());
    }

    #[test]
    fn results_url_hidden_until_finished() {
        let mut batch: Batch = serde_json::from_str(PENDING).unwrap();
        batch.response_body_url = Some("https://example.com/partial".into());
        assert_eq!(batch.results_url(), None);
    }

    #[test]
    fn unknown_status_is_preserved() {
        let batch: Batch =
            serde_json::from_str(r#"{"id":"b2","status":"archiving"}"#).unwrap();
        assert_eq!(batch.status, BatchStatus::Other("archiving".into()));
        assert_eq!(batch.status.to_string(), "archiving");
        assert!(!batch.status.is_terminal());
    }

    #[test]
    fn inconsistent_counters_are_detected() {
        let mut batch: Batch = serde_json::from_str(PENDING).unwrap();
        batch.finished_operations = 1;
        batch.errored_operations = 2;
        assert!(!batch.counters_consistent());
    }

    #[test]
    fn invalid_timestamp_is_a_decode_error() {
        let result: Result<Batch, _> =
            serde_json::from_str(r#"{"id":"b3","status":"pending","submitted_at":"yesterday"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn decodes_batch_list() {
        let list: BatchList = serde_json::from_str(&format!(
            r#"{{"batches":[{PENDING}],"total_items":7,"_links":[]}}"#
        ))
        .unwrap();
        assert_eq!(list.total_items, 7);
        assert_eq!(list.batches.len(), 1);
    }
}
