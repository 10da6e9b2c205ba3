//! Per-call diversion between sending and recording
//!
//! Resource wrappers hand every call to a [`Dispatcher`]. In
//! [`DispatchMode::Direct`] the call goes straight to the transport; in
//! [`DispatchMode::Recording`] it is resolved against the API root and
//! appended to the active [`BatchQueue`] instead.

use std::mem;
use std::sync::Arc;

use mailchimp_domain::{Batch, MailchimpError, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::batch::{BatchQueue, BatchService, Deferred, OperationEncoder, Outcome, QueryParsing};
use crate::request::{ApiRequest, PendingRequest};
use crate::transport_ports::Transport;

/// Whether calls are sent or recorded
#[derive(Debug, Default)]
pub enum DispatchMode {
    /// Send every call immediately
    #[default]
    Direct,
    /// Record every call into the queue
    Recording(BatchQueue),
}

/// Routes calls to the transport or the active batch queue
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    mode: DispatchMode,
    encoder: OperationEncoder,
}

impl Dispatcher {
    /// Direct-mode dispatcher over `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let encoder = OperationEncoder::new().with_api_root(transport.api_root());
        Self { transport, mode: DispatchMode::Direct, encoder }
    }

    /// Set how recorded query strings are parsed
    ///
    /// Applies to queues created by later calls to [`activate`](Self::activate).
    pub fn with_query_parsing(mut self, mode: QueryParsing) -> Self {
        self.encoder = self.encoder.with_query_parsing(mode);
        self
    }

    /// Transport used for direct calls and batch submission
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Current dispatch mode
    pub fn mode(&self) -> &DispatchMode {
        &self.mode
    }

    /// Whether calls are currently being recorded
    pub fn is_recording(&self) -> bool {
        matches!(self.mode, DispatchMode::Recording(_))
    }

    /// Active queue, if recording
    pub fn queue(&self) -> Option<&BatchQueue> {
        match &self.mode {
            DispatchMode::Recording(queue) => Some(queue),
            DispatchMode::Direct => None,
        }
    }

    /// Start recording into a fresh queue
    ///
    /// An already active queue is discarded along with its operations.
    pub fn activate(&mut self) {
        let queue = BatchQueue::with_encoder(self.transport.clone(), self.encoder.clone());
        let previous = mem::replace(&mut self.mode, DispatchMode::Recording(queue));
        if let DispatchMode::Recording(previous) = previous {
            warn!(
                dropped_operations = previous.len(),
                "batch restarted, queued operations discarded"
            );
        }
    }

    /// Stop recording and hand back the queue without submitting it
    pub fn detach(&mut self) -> Option<BatchQueue> {
        match mem::take(&mut self.mode) {
            DispatchMode::Recording(queue) => Some(queue),
            DispatchMode::Direct => None,
        }
    }

    /// Stop recording and submit the queue
    ///
    /// The dispatcher is back in direct mode whether or not submission
    /// succeeds. Use [`detach`](Self::detach) to keep the queue for a retry.
    ///
    /// # Errors
    /// Returns `MailchimpError::InvalidInput` when not recording, otherwise
    /// the result of [`BatchQueue::run`].
    pub async fn finalize(&mut self) -> Result<Batch> {
        let queue = self
            .detach()
            .ok_or_else(|| MailchimpError::InvalidInput("no batch is active".to_string()))?;
        queue.run().await
    }

    /// Send or record a call
    ///
    /// # Errors
    /// Direct calls return transport errors unchanged. Recorded calls fail
    /// only when the request cannot be resolved or encoded.
    #[instrument(skip(self, request), fields(method = %request.method, resource = %request.resource))]
    pub async fn dispatch(&mut self, request: ApiRequest) -> Result<Outcome<Vec<u8>>> {
        match &mut self.mode {
            DispatchMode::Direct => {
                let body = self.transport.send(&request).await?;
                Ok(Outcome::Completed(body))
            }
            DispatchMode::Recording(queue) => {
                let url = request.url(self.transport.api_root())?;
                let pending = PendingRequest::from_url(request.method, &url, request.body);
                let placeholder: Deferred = queue.enqueue(&pending)?;
                debug!(queued = queue.len(), "call recorded into batch");
                Ok(Outcome::Deferred(placeholder))
            }
        }
    }

    /// [`dispatch`](Self::dispatch) and decode a completed response
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<T>` work for
    /// `204 No Content` endpoints.
    ///
    /// # Errors
    /// As `dispatch`, plus `MailchimpError::Decode` for an undecodable body.
    pub async fn dispatch_json<T: DeserializeOwned>(
        &mut self,
        request: ApiRequest,
    ) -> Result<Outcome<T>> {
        match self.dispatch(request).await? {
            Outcome::Completed(body) => decode_body(&body).map(Outcome::Completed),
            Outcome::Deferred(placeholder) => Ok(Outcome::Deferred(placeholder)),
        }
    }

    /// New direct-mode dispatcher sharing this transport
    ///
    /// Recording state is never shared with the fork.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            mode: DispatchMode::Direct,
            encoder: self.encoder.clone(),
        }
    }

    /// Service for the batch endpoint, independent of the dispatch mode
    pub fn batches(&self) -> BatchService {
        BatchService::new(self.transport.clone())
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let result = if body.is_empty() {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    result.map_err(|e| MailchimpError::Decode(e.to_string()))
}
