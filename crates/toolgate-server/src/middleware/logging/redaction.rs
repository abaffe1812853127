//! Sensitive header redaction for request logs.

use crate::middleware::{ACCESS_KEY_HEADER, PROVIDER_API_KEY_HEADER, PROVIDER_CLIENT_ID_HEADER};
use std::collections::HashSet;

/// Headers that are never written to logs verbatim.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    ACCESS_KEY_HEADER,
    PROVIDER_API_KEY_HEADER,
    PROVIDER_CLIENT_ID_HEADER,
];

/// Redact sensitive headers from a header map.
pub fn redact_headers(
    headers: &axum::http::HeaderMap,
    additional: &[String],
) -> Vec<(String, String)> {
    let sensitive: HashSet<&str> = SENSITIVE_HEADERS
        .iter()
        .copied()
        .chain(additional.iter().map(|s| s.as_str()))
        .collect();

    headers
        .iter()
        .map(|(name, value)| {
            // HeaderName is already lowercase.
            let value_str = if sensitive.contains(name.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[non-utf8]").to_string()
            };
            (name.as_str().to_string(), value_str)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    fn lookup<'a>(redacted: &'a [(String, String)], name: &str) -> &'a str {
        redacted
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_gateway_credentials_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-access-key", "abc123".parse().unwrap());
        headers.insert("x-google-api-key", "K".parse().unwrap());
        headers.insert("x-google-csi-id", "C".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let redacted = redact_headers(&headers, &[]);

        assert_eq!(lookup(&redacted, "x-access-key"), "[REDACTED]");
        assert_eq!(lookup(&redacted, "x-google-api-key"), "[REDACTED]");
        assert_eq!(lookup(&redacted, "x-google-csi-id"), "[REDACTED]");
        assert_eq!(lookup(&redacted, "content-type"), "application/json");
    }

    #[test]
    fn test_redact_headers_with_additional() {
        let mut headers = HeaderMap::new();
        headers.insert("x-custom-secret", "secret123".parse().unwrap());
        headers.insert("x-public-header", "public".parse().unwrap());

        let additional = vec!["x-custom-secret".to_string()];
        let redacted = redact_headers(&headers, &additional);

        assert_eq!(lookup(&redacted, "x-custom-secret"), "[REDACTED]");
        assert_eq!(lookup(&redacted, "x-public-header"), "public");
    }
}
