//! Pipeline failures and their HTTP rendering
//!
//! Every variant ends a request with a plain-text body. Upstream statuses
//! other than the expected one are not errors here: they are relayed as-is
//! by [`super::pipeline::Outcome::Passthrough`].

use super::flatten::FlattenError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0} parameter is required")]
    MissingParameter(&'static str),

    #[error("Authorization header is required")]
    MissingAuthorization,

    #[error("Failed to read request body")]
    UnreadableBody,

    #[error("Invalid JSON in request body")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Failed to marshal Aruba Cloud request body")]
    EncodeRequest(#[source] serde_json::Error),

    #[error("Failed to make {operation} request: {cause:#}")]
    Transport {
        operation: &'static str,
        cause: anyhow::Error,
    },

    #[error("Failed to read {operation} response")]
    UpstreamBody {
        operation: &'static str,
        cause: anyhow::Error,
    },

    #[error("Failed to unmarshal Aruba Cloud response: {0}")]
    DecodeResponse(#[source] serde_json::Error),

    #[error("Failed to marshal validated response: {0}")]
    EncodeResponse(#[source] serde_json::Error),

    #[error("Failed to flatten response: {0}")]
    Flatten(#[from] FlattenError),

    #[error("Failed to unmarshal flattened subnet: {0}")]
    DecodeFlattened(#[source] serde_json::Error),
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::MissingParameter(_)
            | PipelineError::UnreadableBody
            | PipelineError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            PipelineError::MissingAuthorization => StatusCode::UNAUTHORIZED,
            PipelineError::EncodeRequest(_)
            | PipelineError::Transport { .. }
            | PipelineError::UpstreamBody { .. }
            | PipelineError::DecodeResponse(_)
            | PipelineError::EncodeResponse(_)
            | PipelineError::Flatten(_)
            | PipelineError::DecodeFlattened(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match self {
            PipelineError::UpstreamBody { cause, .. } => {
                tracing::error!("{}: {:#}", message, cause)
            }
            _ if status.is_server_error() => tracing::error!("{}", message),
            _ => tracing::warn!("{}", message),
        }

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_client_statuses() {
        assert_eq!(
            PipelineError::MissingParameter("Project ID").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PipelineError::MissingAuthorization.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PipelineError::UnreadableBody.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            PipelineError::MissingParameter("VPC ID").to_string(),
            "VPC ID parameter is required"
        );
        let err = PipelineError::Transport {
            operation: "get subnet",
            cause: anyhow::anyhow!("connection refused"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to make get subnet request: connection refused"
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_flatten_failure_is_a_server_error() {
        let err = PipelineError::from(FlattenError::NotAnObject);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Failed to flatten response: document is not a JSON object"
        );
    }

    #[test]
    fn test_flattened_schema_failure_is_a_server_error() {
        let cause = serde_json::from_str::<Vec<String>>("1").unwrap_err();
        let err = PipelineError::DecodeFlattened(cause);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err
            .to_string()
            .starts_with("Failed to unmarshal flattened subnet: "));
    }
}
