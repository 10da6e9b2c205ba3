//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! building a client from it.

use std::io::Write;
use std::path::PathBuf;

use mailchimp_domain::MailchimpError;
use mailchimp_infra::{config, MailchimpClient};
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    (temp_file, path)
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "api": {
            "api_key": "0123abcd-us19",
            "timeout_secs": 10,
            "max_attempts": 5,
            "backoff_millis": 100,
            "user_agent": "integration-test"
        }
    }"#;
    let (_temp, path) = write_config(json_content, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(&path).ok();

    let config = result.expect("Failed to load config from JSON file");
    assert_eq!(config.api.api_key, "0123abcd-us19");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.api.max_attempts, 5);
    assert_eq!(config.api.backoff_millis, 100);
    assert_eq!(config.api.user_agent.as_deref(), Some("integration-test"));
    assert_eq!(config.api.api_root().unwrap(), "https://us19.api.mailchimp.com/3.0/");
}

#[test]
fn test_load_config_from_toml_file_and_build_client() {
    let toml_content = r#"
[api]
api_key = "0123abcd-us4"
base_url = "http://127.0.0.1:9/3.0/"
"#;
    let (_temp, path) = write_config(toml_content, "toml");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(&path).ok();

    let config = result.expect("Failed to load config from TOML file");
    assert_eq!(config.api.timeout_secs, 30);

    let client = MailchimpClient::from_config(&config).expect("client from config");
    assert_eq!(
        mailchimp_core::Transport::api_root(client.api().as_ref()).as_str(),
        "http://127.0.0.1:9/3.0/"
    );
}

#[test]
fn test_key_without_datacenter_fails_client_construction() {
    let (_temp, path) = write_config(r#"{ "api": { "api_key": "0123abcd" } }"#, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(&path).ok();

    let config = result.expect("file parses");
    let err = MailchimpClient::from_config(&config).unwrap_err();
    assert!(matches!(err, MailchimpError::Config(_)));
}

#[test]
fn test_load_config_missing_file() {
    let result = config::load_from_file(Some(PathBuf::from("/nonexistent/mailchimp.toml")));
    assert!(matches!(result, Err(MailchimpError::Config(_))));
}

#[test]
fn test_load_config_invalid_toml() {
    let (_temp, path) = write_config("[api\napi_key = ", "toml");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(MailchimpError::Config(msg)) if msg.contains("TOML")));
}
