//! Batch queue
//!
//! Passive accumulator of operations. `enqueue` encodes a would-be request
//! and appends it without touching the network; `run` submits everything in
//! one `POST /batches`. Order of the submitted operations is exactly the order
//! of `enqueue` calls.

use std::fmt;
use std::sync::Arc;

use mailchimp_domain::{Batch, MailchimpError, Operation, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::encoder::OperationEncoder;
use super::outcome::Deferred;
use super::service::BatchService;
use crate::request::PendingRequest;
use crate::transport_ports::Transport;

/// Ordered collection of operations awaiting submission
pub struct BatchQueue {
    operations: Vec<Operation>,
    encoder: OperationEncoder,
    service: BatchService,
}

impl BatchQueue {
    /// Empty queue that strips the transport's API root from recorded paths
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let encoder = OperationEncoder::new().with_api_root(transport.api_root());
        Self::with_encoder(transport, encoder)
    }

    /// Empty queue with a custom encoder
    pub fn with_encoder(transport: Arc<dyn Transport>, encoder: OperationEncoder) -> Self {
        Self { operations: Vec::new(), encoder, service: BatchService::new(transport) }
    }

    /// Record a request instead of sending it
    ///
    /// Always yields the same [`Deferred`] placeholder for a well-formed
    /// request.
    ///
    /// # Errors
    /// Returns `MailchimpError::InvalidInput` for a malformed request; the
    /// queue is left unchanged.
    pub fn enqueue(&mut self, request: &PendingRequest) -> Result<Deferred> {
        let operation = self.encoder.encode(request)?;
        self.push(operation);
        Ok(Deferred)
    }

    /// Record a request tagged with a caller-supplied correlation id
    ///
    /// # Errors
    /// Returns `MailchimpError::InvalidInput` for a malformed request; the
    /// queue is left unchanged.
    pub fn enqueue_with_id(
        &mut self,
        request: &PendingRequest,
        operation_id: impl Into<String>,
    ) -> Result<Deferred> {
        let operation = self.encoder.encode(request)?.with_operation_id(operation_id);
        self.push(operation);
        Ok(Deferred)
    }

    fn push(&mut self, operation: Operation) {
        debug!(
            method = %operation.method,
            path = %operation.path,
            position = self.operations.len(),
            "operation queued"
        );
        self.operations.push(operation);
    }

    /// Operations in submission order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of recorded operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Service used for submission and status lookups
    pub fn service(&self) -> &BatchService {
        &self.service
    }

    /// Submit every queued operation as one batch job
    ///
    /// The queue is not consumed, so a failed submission can be retried.
    ///
    /// # Errors
    /// Transport and decode errors are returned unchanged.
    pub async fn run(&self) -> Result<Batch> {
        if self.operations.is_empty() {
            warn!("submitting an empty batch");
        }
        self.service.submit(&self.operations).await
    }

    /// [`run`](Self::run), abandoned when `cancel` fires
    ///
    /// # Errors
    /// Returns `MailchimpError::Cancelled` if the token fires first, otherwise
    /// the result of `run`.
    pub async fn run_until_cancelled(&self, cancel: &CancellationToken) -> Result<Batch> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(operations = self.operations.len(), "batch submission cancelled");
                Err(MailchimpError::Cancelled)
            }
            result = self.run() => result,
        }
    }

    /// Fetch the status of a submitted batch
    ///
    /// # Errors
    /// See [`BatchService::get`].
    pub async fn get(&self, id: &str) -> Result<Batch> {
        self.service.get(id).await
    }
}

impl fmt::Debug for BatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchQueue")
            .field("operations", &self.operations)
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}
