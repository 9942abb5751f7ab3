//! Aruba Cloud Client
//!
//! Resolves subnet endpoints against the configured API base URL and issues
//! the single upstream call each inbound request is allowed.

use super::http::{ArubaHttpClient, UpstreamResponse};
use anyhow::Result;
use reqwest::header::HeaderValue;
use reqwest::Method;
use std::time::Duration;

/// Public Aruba Cloud API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.arubacloud.com";

/// Main Aruba Cloud client
#[derive(Clone)]
pub struct ArubaClient {
    pub http: ArubaHttpClient,
    base_url: String,
}

impl ArubaClient {
    /// Create a new client for the given API base URL
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let http = ArubaHttpClient::new(timeout)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and read the whole response
    ///
    /// The two failure stages are reported separately so callers can tell a
    /// failed exchange from a truncated body.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        authorization: &HeaderValue,
        body: Option<Vec<u8>>,
    ) -> Result<UpstreamResponse, SendError> {
        let response = self
            .http
            .execute(method, url, authorization, body)
            .await
            .map_err(SendError::Request)?;

        ArubaHttpClient::read(response)
            .await
            .map_err(SendError::Body)
    }

    // =========================================================================
    // Aruba.Network API helpers
    // =========================================================================

    /// Build the subnet collection URL of a VPC
    pub fn subnets_url(&self, project_id: &str, vpc_id: &str) -> String {
        format!(
            "{}/projects/{}/providers/Aruba.Network/vpcs/{}/subnets",
            self.base_url,
            urlencoding::encode(project_id),
            urlencoding::encode(vpc_id)
        )
    }

    /// Build the URL of a single subnet
    pub fn subnet_url(&self, project_id: &str, vpc_id: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.subnets_url(project_id, vpc_id),
            urlencoding::encode(id)
        )
    }
}

/// Stage at which an upstream exchange failed
#[derive(Debug)]
pub enum SendError {
    Request(anyhow::Error),
    Body(anyhow::Error),
}

/// Append a query string to a URL, skipping empty ones
pub fn with_query(url: String, query: &str) -> String {
    if query.is_empty() {
        url
    } else {
        format!("{}?{}", url, query)
    }
}
