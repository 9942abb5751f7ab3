//! Aruba Cloud API interaction module
//!
//! This module owns the upstream side of the adapter: the shared HTTP
//! transport and the subnet endpoint layout of the Aruba.Network provider.
//!
//! # Module Structure
//!
//! - [`client`] - Base URL handling, URL builders and the single-call `send`
//! - [`http`] - Raw reqwest transport and log sanitising
//!
//! # Example
//!
//! ```ignore
//! use crate::aruba::client::ArubaClient;
//!
//! async fn example(auth: &reqwest::header::HeaderValue) -> anyhow::Result<()> {
//!     let client = ArubaClient::new("https://api.arubacloud.com", None)?;
//!     let url = client.subnets_url("my-project", "my-vpc");
//!     let _ = client.send(reqwest::Method::GET, &url, auth, None).await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
