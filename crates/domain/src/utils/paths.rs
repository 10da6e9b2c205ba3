//! Path joining and API root helpers

use crate::constants::{API_HOST_SUFFIX, DEFAULT_API_VERSION};
use crate::errors::{MailchimpError, Result};

/// Join path components with single slashes
///
/// One leading and one trailing slash is removed from every component, so
/// `slash_join(&["/batches/", "abc"])` is `"batches/abc"`.
pub fn slash_join(components: &[&str]) -> String {
    components
        .iter()
        .map(|component| {
            let component = component.strip_prefix('/').unwrap_or(component);
            component.strip_suffix('/').unwrap_or(component)
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Join `a` and `b` with exactly one slash between them
pub fn single_joining_slash(a: &str, b: &str) -> String {
    match (a.ends_with('/'), b.starts_with('/')) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{a}/{b}"),
        _ => format!("{a}{b}"),
    }
}

/// Whether a path segment is an API version token such as `3.0` or `v1`
pub fn is_version_segment(segment: &str) -> bool {
    let token = segment.strip_prefix(['v', 'V']).unwrap_or(segment);
    token.starts_with(|c: char| c.is_ascii_digit())
        && !token.ends_with('.')
        && token.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Derive the versioned API root from an API key's datacenter suffix
///
/// Keys look like `<hex>-us13`; the suffix names the datacenter host.
///
/// # Errors
/// Returns `MailchimpError::Config` if the key has no datacenter suffix.
pub fn api_root_for_key(api_key: &str) -> Result<String> {
    let mut parts = api_key.trim().split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(dc), None) if !key.is_empty() && !dc.is_empty() => {
            Ok(format!("https://{dc}.{API_HOST_SUFFIX}/{DEFAULT_API_VERSION}/"))
        }
        _ => Err(MailchimpError::Config(
            "API key must end with a datacenter suffix such as '-us13'".to_string(),
        )),
    }
}
