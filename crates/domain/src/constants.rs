//! Client constants
//!
//! Centralized location for endpoint paths and defaults shared by the core
//! and infrastructure crates.

// Endpoint paths (relative to the versioned API root)
/// Batch operations endpoint
pub const BATCHES_PATH: &str = "batches";

// API root derivation
/// Version segment of the derived API root
pub const DEFAULT_API_VERSION: &str = "3.0";
/// Host suffix appended to the key's datacenter
pub const API_HOST_SUFFIX: &str = "api.mailchimp.com";

/// Body returned for a request that was recorded into a batch instead of sent
pub const PLACEHOLDER_BODY: &str = "{}";

// Transport defaults
/// Per-attempt timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Total attempts for a replayable request
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
/// Delay before the first retry in milliseconds
pub const DEFAULT_BACKOFF_MILLIS: u64 = 200;

/// Username sent with basic auth; the API ignores it and checks the key only
pub const BASIC_AUTH_USER: &str = "anystring";
