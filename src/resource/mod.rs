//! Subnet resource layer
//!
//! This module turns one inbound flattened request into one upstream call and
//! reshapes the provider's answer back into the flattened form.
//!
//! # Architecture
//!
//! - [`flatten`] - Hoists the `metadata` object of a document to the top level
//! - [`subnet`] - Nested provider models and their flattened counterparts
//! - [`pipeline`] - The validate, invoke, decode, reshape, emit sequence
//! - [`error`] - Failure taxonomy and its HTTP rendering
//!
//! # Example
//!
//! ```ignore
//! use crate::resource::{run, OperationKind, SubnetRequest};
//!
//! async fn get(client: &ArubaClient, auth: HeaderValue) -> Result<Outcome, PipelineError> {
//!     let request = SubnetRequest::new(OperationKind::Get, "p1", "v1")
//!         .with_id("s1")
//!         .with_query(Some("api-version=1.0".into()))
//!         .with_authorization(Some(auth));
//!     run(client, &request).await
//! }
//! ```

pub mod error;
pub mod flatten;
pub mod pipeline;
pub mod subnet;

pub use error::PipelineError;
pub use flatten::{flatten_object, FlattenError, METADATA_KEY};
pub use pipeline::{run, validate_request, OperationKind, Outcome, SubnetRequest};
