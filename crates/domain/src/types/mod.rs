//! Wire types exchanged with the batch endpoint

pub mod batch;
pub mod operation;

pub use batch::{Batch, BatchList, BatchStatus};
pub use operation::{BatchSubmission, HttpMethod, Operation};
