//! # Mailchimp Core
//!
//! Request batching for the Mailchimp client. No network code lives here.
//!
//! This crate contains:
//! - The [`Transport`] port that performs authenticated HTTP calls
//! - The operation encoder and [`BatchQueue`]
//! - [`BatchService`] for the `/batches` endpoint
//! - The [`Dispatcher`] that sends or records each call
//!
//! ## Architecture Principles
//! - Only depends on `mailchimp-domain`
//! - All I/O goes through [`Transport`]
//! - Transport errors are passed through unchanged

pub mod batch;
pub mod dispatch;
pub mod request;

// Infrastructure ports
pub mod transport_ports;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{
    BatchQueue, BatchService, Deferred, OperationEncoder, Outcome, QueryParsing,
};
pub use dispatch::{DispatchMode, Dispatcher};
pub use request::{ApiRequest, PendingRequest};
pub use transport_ports::Transport;
