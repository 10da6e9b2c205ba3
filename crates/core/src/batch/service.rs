//! Batch endpoint service
//!
//! Owns the `/batches` resource: submission, status lookup, listing and
//! deletion. Each call is exactly one transport round trip; polling loops
//! and retries belong to the caller.

use std::sync::Arc;

use mailchimp_domain::constants::BATCHES_PATH;
use mailchimp_domain::utils::slash_join;
use mailchimp_domain::{Batch, BatchList, BatchSubmission, MailchimpError, Operation, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::request::ApiRequest;
use crate::transport_ports::Transport;

/// Client for the batch job endpoint
#[derive(Clone)]
pub struct BatchService {
    transport: Arc<dyn Transport>,
}

impl BatchService {
    /// Create a service over the given transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Submit operations as one batch job
    ///
    /// Operations are sent in slice order.
    ///
    /// # Errors
    /// Transport errors are returned unchanged; an undecodable response is
    /// `MailchimpError::Decode`.
    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub async fn submit(&self, operations: &[Operation]) -> Result<Batch> {
        let request = ApiRequest::post(BATCHES_PATH, &BatchSubmission { operations })?;

        let body = self.transport.send(&request).await.map_err(|err| {
            warn!(error = %err, "batch submission failed");
            err
        })?;

        let batch: Batch = decode(&body).map_err(|err| {
            warn!(error = %err, "batch submission response could not be decoded");
            err
        })?;

        info!(batch_id = %batch.id, status = %batch.status, "batch submitted");
        Ok(batch)
    }

    /// Fetch the current status of a batch job
    ///
    /// # Errors
    /// Returns `MailchimpError::InvalidInput` for an empty or path-like id,
    /// transport errors unchanged, and `MailchimpError::Decode` for an
    /// undecodable response.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Batch> {
        let request = ApiRequest::get(batch_path(id)?);

        let body = self.transport.send(&request).await.map_err(|err| {
            warn!(batch_id = %id, error = %err, "batch status request failed");
            err
        })?;

        let batch: Batch = decode(&body).map_err(|err| {
            warn!(batch_id = %id, error = %err, "batch status could not be decoded");
            err
        })?;

        debug!(
            batch_id = %batch.id,
            status = %batch.status,
            finished = batch.finished_operations,
            errored = batch.errored_operations,
            total = batch.total_operations,
            "batch status"
        );
        Ok(batch)
    }

    /// List batch jobs
    ///
    /// # Errors
    /// Transport errors are returned unchanged; an undecodable response is
    /// `MailchimpError::Decode`.
    #[instrument(skip(self))]
    pub async fn list(&self, count: Option<u32>, offset: Option<u32>) -> Result<BatchList> {
        let mut request = ApiRequest::get(BATCHES_PATH);
        if let Some(count) = count {
            request = request.with_param("count", count);
        }
        if let Some(offset) = offset {
            request = request.with_param("offset", offset);
        }

        let body = self.transport.send(&request).await?;
        decode(&body)
    }

    /// Stop a batch job and delete its results
    ///
    /// # Errors
    /// Returns `MailchimpError::InvalidInput` for an empty or path-like id
    /// and transport errors unchanged.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let request = ApiRequest::delete(batch_path(id)?);
        self.transport.send(&request).await?;
        info!(batch_id = %id, "batch deleted");
        Ok(())
    }
}

fn batch_path(id: &str) -> Result<String> {
    if id.trim().is_empty() || id.contains(['/', '?', '#']) {
        return Err(MailchimpError::InvalidInput(format!("invalid batch id: {id:?}")));
    }
    Ok(slash_join(&[BATCHES_PATH, id]))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| MailchimpError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use mailchimp_domain::{BatchStatus, HttpMethod};

    use super::*;
    use crate::testing::MockTransport;

    const STATUS: &str = r#"{"id":"abc123","status":"started","total_operations":4,
        "finished_operations":2,"errored_operations":1,
        "submitted_at":"2016-09-16T14:55:51+00:00","completed_at":"","response_body_url":""}"#;

    #[tokio::test]
    async fn get_requests_batch_by_id() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(STATUS);
        let service = BatchService::new(transport.clone());

        let batch = service.get("abc123").await.unwrap();

        assert_eq!(batch.status, BatchStatus::Started);
        assert_eq!(batch.finished_operations, 2);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].resource, "batches/abc123");
    }

    #[tokio::test]
    async fn get_rejects_bad_ids_without_sending() {
        let transport = Arc::new(MockTransport::new());
        let service = BatchService::new(transport.clone());

        for id in ["", "  ", "a/b", "a?b"] {
            let result = service.get(id).await;
            assert!(matches!(result, Err(MailchimpError::InvalidInput(_))), "id {id:?}");
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn get_surfaces_decode_errors() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with("<html>oops</html>");
        let service = BatchService::new(transport);

        let result = service.get("abc123").await;
        assert!(matches!(result, Err(MailchimpError::Decode(_))));
    }

    #[tokio::test]
    async fn list_sends_paging_params() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with(format!(r#"{{"batches":[{STATUS}],"total_items":1}}"#));
        let service = BatchService::new(transport.clone());

        let list = service.list(Some(10), Some(20)).await.unwrap();

        assert_eq!(list.total_items, 1);
        assert_eq!(list.batches[0].id, "abc123");
        let requests = transport.requests();
        assert_eq!(requests[0].resource, "batches");
        assert_eq!(
            requests[0].params,
            vec![("count".to_string(), "10".to_string()), ("offset".to_string(), "20".to_string())]
        );
    }

    #[tokio::test]
    async fn delete_issues_delete_request() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_with("");
        let service = BatchService::new(transport.clone());

        service.delete("abc123").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Delete);
        assert_eq!(requests[0].resource, "batches/abc123");
    }

    #[tokio::test]
    async fn submit_propagates_transport_errors() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_with(MailchimpError::RateLimit("slow down".into()));
        let service = BatchService::new(transport);

        let result = service.submit(&[Operation::new(HttpMethod::Get, "/lists")]).await;
        assert!(matches!(result, Err(MailchimpError::RateLimit(msg)) if msg == "slow down"));
    }
}
