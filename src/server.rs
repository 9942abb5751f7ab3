//! HTTP surface
//!
//! Registers the four subnet routes and the two probe endpoints. Handlers only
//! collect path, query, header and body into a [`SubnetRequest`]; everything
//! else happens in the pipeline.

use crate::aruba::client::ArubaClient;
use crate::resource::{self, OperationKind, PipelineError, SubnetRequest};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub const SUBNETS_PATH: &str =
    "/projects/{projectId}/providers/Aruba.Network/vpcs/{vpcId}/subnets";
pub const SUBNET_PATH: &str =
    "/projects/{projectId}/providers/Aruba.Network/vpcs/{vpcId}/subnets/{id}";

/// Shared, read-only per-process state
#[derive(Clone)]
pub struct AppState {
    pub client: ArubaClient,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionPath {
    project_id: String,
    vpc_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemPath {
    project_id: String,
    vpc_id: String,
    id: String,
}

/// Build the application router
pub fn build_router(client: ArubaClient) -> Router {
    Router::new()
        .route(SUBNETS_PATH, get(list_subnets).post(create_subnet))
        .route(SUBNET_PATH, get(get_subnet).put(update_subnet))
        .route("/healthz", get(liveness))
        .route("/readyz", get(readiness))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { client })
}

fn authorization(headers: &HeaderMap) -> Option<axum::http::HeaderValue> {
    headers.get(AUTHORIZATION).cloned()
}

async fn dispatch(state: &AppState, request: SubnetRequest) -> Response {
    match resource::run(&state.client, &request).await {
        Ok(outcome) => outcome.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_subnet(
    State(state): State<AppState>,
    Path(path): Path<ItemPath>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let request = SubnetRequest::new(OperationKind::Get, &path.project_id, &path.vpc_id)
        .with_id(&path.id)
        .with_query(query)
        .with_authorization(authorization(&headers));

    dispatch(&state, request).await
}

async fn list_subnets(
    State(state): State<AppState>,
    Path(path): Path<CollectionPath>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let request = SubnetRequest::new(OperationKind::List, &path.project_id, &path.vpc_id)
        .with_query(query)
        .with_authorization(authorization(&headers));

    dispatch(&state, request).await
}

async fn create_subnet(
    State(state): State<AppState>,
    Path(path): Path<CollectionPath>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request = SubnetRequest::new(OperationKind::Create, &path.project_id, &path.vpc_id)
        .with_query(query)
        .with_authorization(authorization(&headers));

    with_body(&state, request, body).await
}

async fn update_subnet(
    State(state): State<AppState>,
    Path(path): Path<ItemPath>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request = SubnetRequest::new(OperationKind::Update, &path.project_id, &path.vpc_id)
        .with_id(&path.id)
        .with_query(query)
        .with_authorization(authorization(&headers));

    with_body(&state, request, body).await
}

/// Attach the inbound body; an unreadable one only matters once parameters are valid
async fn with_body(
    state: &AppState,
    request: SubnetRequest,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => dispatch(state, request.with_body(body)).await,
        Err(rejection) => {
            tracing::debug!("request body rejected: {}", rejection);
            match resource::validate_request(&request) {
                Err(err) => err.into_response(),
                Ok(()) => PipelineError::UnreadableBody.into_response(),
            }
        }
    }
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ok"
}
