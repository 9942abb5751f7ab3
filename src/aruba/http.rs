//! HTTP transport for Aruba Cloud REST API calls

use anyhow::{Context, Result};
use axum::body::Bytes;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Raw upstream answer: status, content type and the unread body bytes
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// HTTP client wrapper for Aruba Cloud API calls
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Clone)]
pub struct ArubaHttpClient {
    client: Client,
}

impl ArubaHttpClient {
    /// Create a new HTTP client, optionally bounded by an overall request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            "aruba-subnet-plugin/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Issue a single request, forwarding the caller's `Authorization` value as-is
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        authorization: &HeaderValue,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, authorization.clone());

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        request.send().await.context("failed to execute request")
    }

    /// Drain a response into an [`UpstreamResponse`]
    pub async fn read(response: reqwest::Response) -> Result<UpstreamResponse> {
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
