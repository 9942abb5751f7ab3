//! Operation Pipeline
//!
//! Every subnet operation runs the same sequence: validate the inbound
//! parameters, shape the request body (writes only), issue one upstream call,
//! check the upstream status, then decode, re-encode and flatten the answer.
//! Verb-specific behaviour is carried by [`OperationKind`].

use super::error::PipelineError;
use super::flatten::{flatten_object, METADATA_KEY};
use super::subnet::{
    FlattenedSubnet, FlattenedSubnetCreate, FlattenedSubnetList, FlattenedSubnetUpdate,
    ListEnvelope, Subnet, SubnetCreate, SubnetUpdate,
};
use crate::aruba::client::{with_query, ArubaClient, SendError};
use crate::aruba::http::{sanitize_for_log, UpstreamResponse};
use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

/// Query parameter carrying the provider API version
pub const API_VERSION_PARAM: &str = "api-version";

/// The four subnet operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Get,
    Create,
    Update,
    List,
}

impl OperationKind {
    pub fn method(self) -> Method {
        match self {
            OperationKind::Get | OperationKind::List => Method::GET,
            OperationKind::Create => Method::POST,
            OperationKind::Update => Method::PUT,
        }
    }

    /// Upstream status that counts as success; also the status we answer with
    pub fn success_status(self) -> StatusCode {
        match self {
            OperationKind::Create => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    /// Human label used in error messages and logs
    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Get => "get subnet",
            OperationKind::Create => "create subnet",
            OperationKind::Update => "update subnet",
            OperationKind::List => "list subnets",
        }
    }

    /// Whether the operation addresses one subnet by id
    fn targets_single(self) -> bool {
        matches!(self, OperationKind::Get | OperationKind::Update)
    }

    /// Reads forward the caller's whole query string; writes only the API version
    fn forwards_query(self) -> bool {
        matches!(self, OperationKind::Get | OperationKind::List)
    }
}

/// Everything a pipeline run needs from the inbound request
#[derive(Debug, Clone)]
pub struct SubnetRequest {
    pub kind: OperationKind,
    pub project_id: String,
    pub vpc_id: String,
    pub id: Option<String>,
    pub raw_query: Option<String>,
    pub authorization: Option<HeaderValue>,
    pub body: Bytes,
}

impl SubnetRequest {
    pub fn new(kind: OperationKind, project_id: &str, vpc_id: &str) -> Self {
        Self {
            kind,
            project_id: project_id.to_string(),
            vpc_id: vpc_id.to_string(),
            id: None,
            raw_query: None,
            authorization: None,
            body: Bytes::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_query(mut self, raw_query: Option<String>) -> Self {
        self.raw_query = raw_query;
        self
    }

    pub fn with_authorization(mut self, authorization: Option<HeaderValue>) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }
}

/// Parameters that passed validation
#[derive(Debug)]
struct Validated<'a> {
    project_id: &'a str,
    vpc_id: &'a str,
    id: Option<&'a str>,
    api_version: String,
    query: &'a str,
    authorization: &'a HeaderValue,
}

/// Successful or relayed end of a pipeline run
#[derive(Debug)]
pub enum Outcome {
    /// Flattened JSON document with the operation's success status
    Success { status: StatusCode, body: Vec<u8> },
    /// Upstream answer relayed without reinterpretation
    Passthrough(UpstreamResponse),
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Success { status, body } => (
                status,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                body,
            )
                .into_response(),
            Outcome::Passthrough(upstream) => {
                let mut response = (upstream.status, upstream.body).into_response();
                match upstream.content_type {
                    Some(content_type) => {
                        response.headers_mut().insert(CONTENT_TYPE, content_type);
                    }
                    None => {
                        response.headers_mut().remove(CONTENT_TYPE);
                    }
                }
                response
            }
        }
    }
}

/// Run one subnet operation end to end
pub async fn run(
    client: &ArubaClient,
    request: &SubnetRequest,
) -> Result<Outcome, PipelineError> {
    let kind = request.kind;
    let params = validate(request)?;
    let body = shape_request_body(kind, &request.body)?;
    let url = upstream_url(client, kind, &params);

    let upstream = client
        .send(kind.method(), &url, params.authorization, body)
        .await
        .map_err(|err| match err {
            SendError::Request(cause) => PipelineError::Transport {
                operation: kind.label(),
                cause,
            },
            SendError::Body(cause) => PipelineError::UpstreamBody {
                operation: kind.label(),
                cause,
            },
        })?;

    if upstream.status != kind.success_status() {
        tracing::warn!(
            "Aruba Cloud API returned non-{} status for {}: {}. Body: {}",
            kind.success_status().as_u16(),
            kind.label(),
            upstream.status.as_u16(),
            sanitize_for_log(&String::from_utf8_lossy(&upstream.body))
        );
        return Ok(Outcome::Passthrough(upstream));
    }

    let body = match kind {
        OperationKind::List => reshape_list(&upstream.body)?,
        _ => reshape_single(&upstream.body)?,
    };

    log_success(kind, &params);

    Ok(Outcome::Success {
        status: kind.success_status(),
        body,
    })
}

/// Run only the parameter checks of a request
pub fn validate_request(request: &SubnetRequest) -> Result<(), PipelineError> {
    validate(request).map(|_| ())
}

/// Check inputs in declaration order; the first failure wins
fn validate(request: &SubnetRequest) -> Result<Validated<'_>, PipelineError> {
    if request.project_id.is_empty() {
        return Err(PipelineError::MissingParameter("Project ID"));
    }
    if request.vpc_id.is_empty() {
        return Err(PipelineError::MissingParameter("VPC ID"));
    }

    let id = if request.kind.targets_single() {
        match request.id.as_deref() {
            Some(id) if !id.is_empty() => Some(id),
            _ => return Err(PipelineError::MissingParameter("Subnet ID")),
        }
    } else {
        None
    };

    let query = request.raw_query.as_deref().unwrap_or_default();
    let api_version = query_value(query, API_VERSION_PARAM)
        .filter(|v| !v.is_empty())
        .ok_or(PipelineError::MissingParameter("API version"))?;

    let authorization = request
        .authorization
        .as_ref()
        .filter(|v| !v.as_bytes().is_empty())
        .ok_or(PipelineError::MissingAuthorization)?;

    Ok(Validated {
        project_id: &request.project_id,
        vpc_id: &request.vpc_id,
        id,
        api_version,
        query,
        authorization,
    })
}

/// First value of `name` in a raw query string
fn query_value(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Decode the flattened write body and regroup it into the provider shape
fn shape_request_body(
    kind: OperationKind,
    body: &[u8],
) -> Result<Option<Vec<u8>>, PipelineError> {
    match kind {
        OperationKind::Create => {
            let flat: FlattenedSubnetCreate = decode_request(body)?;
            encode_request(&SubnetCreate::from(flat)).map(Some)
        }
        OperationKind::Update => {
            let flat: FlattenedSubnetUpdate = decode_request(body)?;
            encode_request(&SubnetUpdate::from(flat)).map(Some)
        }
        OperationKind::Get | OperationKind::List => Ok(None),
    }
}

fn decode_request<T: DeserializeOwned>(body: &[u8]) -> Result<T, PipelineError> {
    serde_json::from_slice(body).map_err(PipelineError::InvalidBody)
}

fn encode_request<T: Serialize>(nested: &T) -> Result<Vec<u8>, PipelineError> {
    let body = serde_json::to_vec(nested).map_err(PipelineError::EncodeRequest)?;
    tracing::debug!(
        "Request body to send to Aruba Cloud: {}",
        String::from_utf8_lossy(&body)
    );
    Ok(body)
}

fn upstream_url(client: &ArubaClient, kind: OperationKind, params: &Validated<'_>) -> String {
    let base = match params.id {
        Some(id) => client.subnet_url(params.project_id, params.vpc_id, id),
        None => client.subnets_url(params.project_id, params.vpc_id),
    };

    if kind.forwards_query() {
        with_query(base, params.query)
    } else {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(API_VERSION_PARAM, &params.api_version)
            .finish();
        with_query(base, &query)
    }
}

/// Re-encode a decoded subnet, dropping unmodelled fields, hoist `metadata`
/// and check the result against the flattened schema
fn flatten_subnet(subnet: &Subnet) -> Result<FlattenedSubnet, PipelineError> {
    let validated = serde_json::to_value(subnet).map_err(PipelineError::EncodeResponse)?;
    let hoisted = flatten_object(validated, METADATA_KEY)?;
    serde_json::from_value(hoisted).map_err(PipelineError::DecodeFlattened)
}

fn reshape_single(body: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let subnet: Subnet = serde_json::from_slice(body).map_err(PipelineError::DecodeResponse)?;
    let flattened = flatten_subnet(&subnet)?;
    serde_json::to_vec(&flattened).map_err(PipelineError::EncodeResponse)
}

fn reshape_list(body: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let list: ListEnvelope<Subnet> =
        serde_json::from_slice(body).map_err(PipelineError::DecodeResponse)?;
    let flattened: FlattenedSubnetList = list.try_map(|subnet| flatten_subnet(&subnet))?;
    serde_json::to_vec(&flattened).map_err(PipelineError::EncodeResponse)
}

fn log_success(kind: OperationKind, params: &Validated<'_>) {
    let id = params.id.unwrap_or_default();
    match kind {
        OperationKind::Get => {
            tracing::info!("Successfully retrieved and flattened subnet '{}'", id)
        }
        OperationKind::Create => tracing::info!(
            "Successfully created subnet in project '{}', vpc '{}'",
            params.project_id,
            params.vpc_id
        ),
        OperationKind::Update => tracing::info!("Successfully updated subnet '{}'", id),
        OperationKind::List => tracing::info!(
            "Successfully listed subnets for project '{}', vpc '{}'",
            params.project_id,
            params.vpc_id
        ),
    }
}
