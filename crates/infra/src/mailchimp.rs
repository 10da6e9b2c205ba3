//! Client facade
//!
//! [`MailchimpClient`] pairs an [`ApiClient`] with a [`Dispatcher`]. Between
//! [`start_batch`](MailchimpClient::start_batch) and
//! [`run_batch`](MailchimpClient::run_batch) every call is recorded instead of
//! sent and yields [`Outcome::Deferred`].

use std::sync::Arc;

use mailchimp_core::{
    ApiRequest, BatchQueue, BatchService, Dispatcher, Outcome, QueryParsing, Transport,
};
use mailchimp_domain::{Batch, Config, MailchimpError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::ApiClient;
use crate::observability::RequestMetrics;

/// Mailchimp API client with optional request batching
pub struct MailchimpClient {
    api: Arc<ApiClient>,
    dispatcher: Dispatcher,
}

impl MailchimpClient {
    /// Wrap an API client
    pub fn new(api: ApiClient) -> Self {
        Self::from_shared(Arc::new(api))
    }

    fn from_shared(api: Arc<ApiClient>) -> Self {
        let transport: Arc<dyn Transport> = api.clone();
        Self { api, dispatcher: Dispatcher::new(transport) }
    }

    /// Build a client from loaded configuration
    ///
    /// # Errors
    /// See [`ApiClient::from_config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(ApiClient::from_config(&config.api)?))
    }

    /// Build a client from an API key with a datacenter suffix
    ///
    /// # Errors
    /// Returns `MailchimpError::Config` for a key without a datacenter.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&Config { api: mailchimp_domain::ApiConfig::new(api_key) })
    }

    /// Reject malformed query fragments in recorded calls
    #[must_use]
    pub fn with_query_parsing(mut self, mode: QueryParsing) -> Self {
        self.dispatcher = self.dispatcher.with_query_parsing(mode);
        self
    }

    /// `GET` a resource
    ///
    /// # Errors
    /// Transport errors, or `MailchimpError::Decode` for an unexpected body.
    pub async fn get<T: DeserializeOwned>(
        &mut self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Outcome<T>> {
        let request = params.iter().fold(ApiRequest::get(resource), |request, (key, value)| {
            request.with_param(*key, value)
        });
        self.call(request).await
    }

    /// `POST` a JSON body
    ///
    /// # Errors
    /// Serialization and transport errors, or `MailchimpError::Decode`.
    pub async fn post<B, T>(&mut self, resource: &str, body: &B) -> Result<Outcome<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(ApiRequest::post(resource, body)?).await
    }

    /// `PUT` a JSON body
    ///
    /// # Errors
    /// Serialization and transport errors, or `MailchimpError::Decode`.
    pub async fn put<B, T>(&mut self, resource: &str, body: &B) -> Result<Outcome<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(ApiRequest::put(resource, body)?).await
    }

    /// `PATCH` a JSON body
    ///
    /// # Errors
    /// Serialization and transport errors, or `MailchimpError::Decode`.
    pub async fn patch<B, T>(&mut self, resource: &str, body: &B) -> Result<Outcome<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(ApiRequest::patch(resource, body)?).await
    }

    /// `DELETE` a resource
    ///
    /// # Errors
    /// Transport errors.
    pub async fn delete(&mut self, resource: &str) -> Result<Outcome<()>> {
        let outcome = self.dispatcher.dispatch(ApiRequest::delete(resource)).await?;
        self.note_deferred(&outcome);
        Ok(outcome.map(|_| ()))
    }

    async fn call<T: DeserializeOwned>(&mut self, request: ApiRequest) -> Result<Outcome<T>> {
        let outcome = self.dispatcher.dispatch_json(request).await?;
        self.note_deferred(&outcome);
        Ok(outcome)
    }

    fn note_deferred<T>(&self, outcome: &Outcome<T>) {
        if outcome.is_deferred() {
            self.api.metrics().record_batched();
        }
    }

    /// Record subsequent calls instead of sending them
    ///
    /// Calling this while a batch is active discards the queued calls.
    pub fn start_batch(&mut self) {
        self.dispatcher.activate();
    }

    /// Whether calls are currently being recorded
    pub fn is_batching(&self) -> bool {
        self.dispatcher.is_recording()
    }

    /// Calls recorded so far, if batching
    pub fn pending_batch(&self) -> Option<&BatchQueue> {
        self.dispatcher.queue()
    }

    /// Stop recording and submit the recorded calls as one batch job
    ///
    /// # Errors
    /// Returns `MailchimpError::InvalidInput` when no batch is active, and
    /// transport or decode errors from submission. The recorded calls are
    /// discarded either way; use [`take_batch`](Self::take_batch) to keep them.
    pub async fn run_batch(&mut self) -> Result<Batch> {
        let batch = self.dispatcher.finalize().await?;
        info!(batch_id = %batch.id, total = batch.total_operations, "batch running");
        Ok(batch)
    }

    /// [`run_batch`](Self::run_batch), abandoned when `cancel` fires
    ///
    /// A cancelled batch stays active so it can be run again. Any other
    /// outcome ends the batch, as with `run_batch`.
    ///
    /// # Errors
    /// Returns `MailchimpError::Cancelled` if the token fires first, otherwise
    /// as `run_batch`.
    pub async fn run_batch_until_cancelled(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Batch> {
        let queue = self
            .dispatcher
            .queue()
            .ok_or_else(|| MailchimpError::InvalidInput("no batch is active".to_string()))?;
        let result = queue.run_until_cancelled(cancel).await;
        if !matches!(result, Err(MailchimpError::Cancelled)) {
            self.dispatcher.detach();
        }
        result
    }

    /// Stop recording and take the recorded calls without submitting them
    pub fn take_batch(&mut self) -> Option<BatchQueue> {
        self.dispatcher.detach()
    }

    /// Independent client sharing this client's connection and credentials
    ///
    /// The fork starts in direct mode whether or not this client is batching.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self { api: self.api.clone(), dispatcher: self.dispatcher.fork() }
    }

    /// Service for inspecting and deleting batch jobs
    pub fn batches(&self) -> BatchService {
        self.dispatcher.batches()
    }

    /// Request counters shared by this client and its forks
    pub fn metrics(&self) -> &RequestMetrics {
        self.api.metrics()
    }

    /// Underlying transport
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }
}

impl std::fmt::Debug for MailchimpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailchimpClient")
            .field("api", &self.api)
            .field("batching", &self.is_batching())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::Deserialize;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::StaticApiKey;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Member {
        id: String,
    }

    fn client_for(server: &MockServer) -> MailchimpClient {
        let api = ApiClient::builder()
            .auth(Arc::new(StaticApiKey::new("key-us1").unwrap()))
            .api_root(format!("{}/3.0/", server.uri()))
            .base_backoff(Duration::from_millis(1))
            .build()
            .unwrap();
        MailchimpClient::new(api)
    }

    #[tokio::test]
    async fn direct_get_decodes_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3.0/lists/l1/members/m1"))
            .and(query_param("fields", "id"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"m1"}"#))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        let member: Outcome<Member> =
            client.get("lists/l1/members/m1", &[("fields", "id")]).await.unwrap();

        assert_eq!(member.completed(), Some(Member { id: "m1".into() }));
        assert_eq!(client.metrics().snapshot().sent, 1);
    }

    #[tokio::test]
    async fn batched_calls_are_counted_not_sent() {
        let server = MockServer::start().await;
        let mut client = client_for(&server);

        client.start_batch();
        let outcome: Outcome<Member> = client
            .put("lists/l1/members/m1", &serde_json::json!({"status": "subscribed"}))
            .await
            .unwrap();
        let deleted = client.delete("lists/l1/members/m2").await.unwrap();

        assert!(outcome.is_deferred());
        assert!(deleted.is_deferred());
        assert_eq!(client.pending_batch().unwrap().len(), 2);
        assert_eq!(client.metrics().snapshot().batched, 2);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_batch_without_start_is_rejected() {
        let server = MockServer::start().await;
        let mut client = client_for(&server);

        let result = client.run_batch().await;
        assert!(matches!(result, Err(MailchimpError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn fork_sends_directly_while_parent_batches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3.0/ping"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"health_status":"ok"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.start_batch();
        let mut fork = client.fork();

        let pong: Outcome<serde_json::Value> = fork.get("ping", &[]).await.unwrap();

        assert!(pong.is_completed());
        assert!(client.is_batching());
        assert!(!fork.is_batching());
        assert!(client.pending_batch().unwrap().is_empty());
        assert_eq!(client.metrics().snapshot().sent, 1);
    }

    #[tokio::test]
    async fn failed_run_until_cancelled_ends_the_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/3.0/batches"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.start_batch();
        let _ = client.delete("lists/l1/members/m1").await.unwrap();

        let result = client.run_batch_until_cancelled(&CancellationToken::new()).await;

        assert!(matches!(result, Err(MailchimpError::Server(_))));
        assert!(!client.is_batching());
    }

    #[test]
    fn from_api_key_requires_datacenter() {
        assert!(matches!(
            MailchimpClient::from_api_key("nodatacenter"),
            Err(MailchimpError::Config(_))
        ));
        let client = MailchimpClient::from_api_key("abc-us6").unwrap();
        assert_eq!(client.api().api_root().as_str(), "https://us6.api.mailchimp.com/3.0/");
    }
}
