//! Shared plumbing for the HTTP store clients.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::{StoreError, StoreResult};

/// Builds a client with a bounded per-call timeout and optional bearer auth.
pub(crate) fn build_client(timeout: Duration, token: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let raw = token.trim();
        let bearer = if raw.starts_with("Bearer ") || raw.starts_with("bearer ") {
            raw.to_string()
        } else {
            format!("Bearer {raw}")
        };

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).context("Invalid store token format")?,
        );
    }

    reqwest::Client::builder()
        .user_agent("statesync-syncer/0.1.0")
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

/// Maps a non-success status onto the store-error taxonomy, reading the
/// error body for context.
pub(crate) async fn check_status(resp: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = format!("status={status}: {body}");

    Err(match status.as_u16() {
        404 => StoreError::NotFound(detail),
        409 => StoreError::Conflict(detail),
        408 | 429 => StoreError::Transient(detail),
        _ if status.is_server_error() => StoreError::Transient(detail),
        _ => StoreError::Unexpected(detail),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn response_with_status(status: u16) -> StoreResult<reqwest::Response> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = build_client(Duration::from_secs(5), None).unwrap();
        let resp = client
            .get(format!("{}/probe", server.uri()))
            .send()
            .await
            .unwrap();
        check_status(resp).await
    }

    #[rstest]
    #[case(404, "not_found")]
    #[case(409, "conflict")]
    #[case(408, "transient")]
    #[case(429, "transient")]
    #[case(500, "transient")]
    #[case(503, "transient")]
    #[case(400, "unexpected")]
    #[tokio::test]
    async fn test_status_maps_onto_taxonomy(#[case] status: u16, #[case] expected: &str) {
        let err = response_with_status(status).await.unwrap_err();
        let actual = match err {
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Transient(_) => "transient",
            StoreError::Unexpected(_) => "unexpected",
        };
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        assert!(response_with_status(200).await.is_ok());
    }

    #[test]
    fn test_bearer_token_accepted_with_or_without_prefix() {
        assert!(build_client(Duration::from_secs(5), Some("Bearer abc")).is_ok());
        assert!(build_client(Duration::from_secs(5), Some("abc")).is_ok());
        assert!(build_client(Duration::from_secs(5), None).is_ok());
    }
}
