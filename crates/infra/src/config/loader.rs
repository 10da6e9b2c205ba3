//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `MAILCHIMP_API_KEY` is set, loads from environment variables and
//!    reports any invalid variable as an error
//! 2. Otherwise, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MAILCHIMP_API_KEY`: API key with datacenter suffix (required)
//! - `MAILCHIMP_BASE_URL`: Explicit versioned API root
//! - `MAILCHIMP_TIMEOUT_SECS`: Per-attempt timeout in seconds
//! - `MAILCHIMP_MAX_ATTEMPTS`: Total attempts per request
//! - `MAILCHIMP_BACKOFF_MILLIS`: Base retry backoff in milliseconds
//! - `MAILCHIMP_USER_AGENT`: User-Agent header
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./mailchimp.json` or `./mailchimp.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mailchimp_domain::{ApiConfig, Config, MailchimpError, Result};

/// API key with datacenter suffix
pub const ENV_API_KEY: &str = "MAILCHIMP_API_KEY";
/// Explicit versioned API root
pub const ENV_BASE_URL: &str = "MAILCHIMP_BASE_URL";
/// Per-attempt timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "MAILCHIMP_TIMEOUT_SECS";
/// Total attempts per request
pub const ENV_MAX_ATTEMPTS: &str = "MAILCHIMP_MAX_ATTEMPTS";
/// Base retry backoff in milliseconds
pub const ENV_BACKOFF_MILLIS: &str = "MAILCHIMP_BACKOFF_MILLIS";
/// `User-Agent` header
pub const ENV_USER_AGENT: &str = "MAILCHIMP_USER_AGENT";

/// Load configuration with automatic fallback strategy
///
/// Uses environment variables when `MAILCHIMP_API_KEY` is set, and a config
/// file otherwise. An invalid optional variable is an error; it never causes
/// a silent switch to a file.
///
/// # Errors
/// Returns `MailchimpError::Config` if:
/// - An environment variable does not parse
/// - The key is unset and no config file is found
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    load_in(std::env::current_dir().ok().as_deref())
}

fn load_in(dir: Option<&Path>) -> Result<Config> {
    if env_opt(ENV_API_KEY).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!(var = ENV_API_KEY, "API key not set in environment, trying file");
    let path = dir.and_then(probe_from).ok_or_else(no_config_file)?;
    load_from_file(Some(path))
}

/// Load configuration from environment variables
///
/// Only the API key is required; unset optional variables take their
/// defaults.
///
/// # Errors
/// Returns `MailchimpError::Config` if the key is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut api = ApiConfig::new(env_var(ENV_API_KEY)?);

    api.base_url = env_opt(ENV_BASE_URL);
    api.user_agent = env_opt(ENV_USER_AGENT);
    if let Some(timeout) = env_parse(ENV_TIMEOUT_SECS)? {
        api.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse(ENV_MAX_ATTEMPTS)? {
        api.max_attempts = attempts;
    }
    if let Some(backoff) = env_parse(ENV_BACKOFF_MILLIS)? {
        api.backoff_millis = backoff;
    }

    Ok(Config { api })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `MailchimpError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MailchimpError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(no_config_file)?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MailchimpError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MailchimpError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MailchimpError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MailchimpError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory (`./config.{json,toml}`,
/// `./mailchimp.{json,toml}`) and then up to two parent directories.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(dir: &Path) -> Option<PathBuf> {
    let candidates = [
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("mailchimp.json"),
        dir.join("mailchimp.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ];

    candidates.into_iter().find(|path| path.exists())
}

fn no_config_file() -> MailchimpError {
    MailchimpError::Config("No config file found in any of the standard locations".to_string())
}

/// Get required environment variable
///
/// # Errors
/// Returns `MailchimpError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        MailchimpError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| MailchimpError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
