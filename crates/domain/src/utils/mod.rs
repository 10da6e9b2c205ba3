//! Domain utilities

pub mod paths;

pub use paths::{api_root_for_key, is_version_segment, single_joining_slash, slash_join};
