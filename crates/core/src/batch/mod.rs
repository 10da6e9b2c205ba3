//! Request batching
//!
//! Captures outgoing calls as operations, submits them as one server-side
//! batch job and looks the job up by id.

pub mod encoder;
pub mod outcome;
pub mod queue;
pub mod service;

pub use encoder::{strip_version_segment, OperationEncoder, QueryParsing};
pub use outcome::{Deferred, Outcome};
pub use queue::BatchQueue;
pub use service::BatchService;
