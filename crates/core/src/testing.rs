//! In-memory transport for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use mailchimp_domain::{MailchimpError, Result};
use url::Url;

use crate::request::ApiRequest;
use crate::transport_ports::Transport;

enum Reply {
    Body(Vec<u8>),
    Fail(MailchimpError),
    Hang,
}

/// Mock transport replaying scripted replies and recording every request
pub(crate) struct MockTransport {
    root: Url,
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::with_root("https://us13.api.mailchimp.com/3.0/")
    }

    pub(crate) fn with_root(root: &str) -> Self {
        Self {
            root: Url::parse(root).unwrap(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn respond_with(&self, body: impl Into<String>) {
        self.push(Reply::Body(body.into().into_bytes()));
    }

    pub(crate) fn fail_with(&self, error: MailchimpError) {
        self.push(Reply::Fail(error));
    }

    /// Next call never completes
    pub(crate) fn hang(&self) {
        self.push(Reply::Hang);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn api_root(&self) -> &Url {
        &self.root
    }

    async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(MailchimpError::Network("no scripted reply".to_string())),
        }
    }
}
