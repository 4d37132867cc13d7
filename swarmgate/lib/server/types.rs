use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::SwarmgateError;

//--------------------------------------------------------------------------------------------------
// Types: Queries
//--------------------------------------------------------------------------------------------------

/// Query string of the inspect and list routes that can include finished tasks.
#[derive(Debug, Default, Deserialize)]
pub struct AllQuery {
    /// `1` or `true` to include every task.
    pub all: Option<String>,
}

/// Query string of the events route.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Unix time in seconds at which the stream ends.
    pub until: Option<i64>,
}

//--------------------------------------------------------------------------------------------------
// Types: Responses
//--------------------------------------------------------------------------------------------------

/// Response body of the remove routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    /// The ID of the removed entity.
    pub id: String,
}

//--------------------------------------------------------------------------------------------------
// Types: Error Response
//--------------------------------------------------------------------------------------------------

/// Standard error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub code: u16,

    /// Error message
    pub message: String,

    /// Error type for categorizing errors
    pub error_type: ErrorType,

    /// Optional additional details about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Types of errors that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Invalid request parameters or body
    ValidationError,

    /// The update would not change anything
    NoChange,

    /// Resource not found
    NotFound,

    /// The identifier or the submitted version does not match the stored state
    Conflict,

    /// The control plane did not answer in time or the call was cancelled
    Unavailable,

    /// The control plane refused the call
    RemoteError,

    /// Internal server errors
    InternalError,
}

/// A [`SwarmgateError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub SwarmgateError);

/// A JSON request body whose decoding failures render as [`ApiError`]s.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl AllQuery {
    /// Returns `true` if every task was asked for.
    pub fn all(&self) -> bool {
        matches!(self.all.as_deref().map(str::trim), Some("1" | "true"))
    }
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: u16, message: String, error_type: ErrorType) -> Self {
        Self {
            code,
            message,
            error_type,
            details: None,
        }
    }

    /// Add details to the error response, ignoring details for 500-level errors
    pub fn with_details(mut self, details: String) -> Self {
        // Only include details for non-500 errors
        if self.code < 500 {
            self.details = Some(details);
        }
        self
    }
}

impl ApiError {
    /// Returns the status code and error type the error renders with.
    pub fn classify(&self) -> (StatusCode, ErrorType) {
        match &self.0 {
            SwarmgateError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorType::NotFound),
            SwarmgateError::Ambiguous { .. }
            | SwarmgateError::Conflict { .. }
            | SwarmgateError::AlreadyExists { .. } => (StatusCode::CONFLICT, ErrorType::Conflict),
            SwarmgateError::Validation(_) | SwarmgateError::InvalidArgument(_) => {
                (StatusCode::BAD_REQUEST, ErrorType::ValidationError)
            }
            SwarmgateError::NoChange(_) => (StatusCode::BAD_REQUEST, ErrorType::NoChange),
            SwarmgateError::DeadlineExceeded => {
                (StatusCode::GATEWAY_TIMEOUT, ErrorType::Unavailable)
            }
            SwarmgateError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, ErrorType::Unavailable),
            SwarmgateError::Remote(_) => (StatusCode::BAD_GATEWAY, ErrorType::RemoteError),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ErrorType::InternalError),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<SwarmgateError> for ApiError {
    fn from(error: SwarmgateError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SwarmgateError::InvalidArgument(rejection.body_text()))
    }
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();
        let mut body = ErrorResponse::new(status.as_u16(), self.0.to_string(), error_type);

        match &self.0 {
            SwarmgateError::Validation(e) => body = body.with_details(format!("{:?}", e)),
            SwarmgateError::Ambiguous { matches, .. } => {
                body = body.with_details(format!("{} matches found", matches))
            }
            _ => {}
        }

        if status.is_server_error() {
            tracing::error!(code = status.as_u16(), "{}", self.0);
        } else {
            tracing::debug!(code = status.as_u16(), "{}", self.0);
        }

        (status, Json(body)).into_response()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::EntityKind, ValidationError};

    #[test]
    fn test_types_status_mapping() {
        let cases = [
            (
                SwarmgateError::NotFound {
                    kind: EntityKind::Service,
                    identifier: "web".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                SwarmgateError::Ambiguous {
                    kind: EntityKind::Node,
                    identifier: "worker".to_string(),
                    matches: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                SwarmgateError::Validation(ValidationError::ReplicasInGlobalMode),
                StatusCode::BAD_REQUEST,
            ),
            (
                SwarmgateError::NoChange("no changes detected".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (SwarmgateError::DeadlineExceeded, StatusCode::GATEWAY_TIMEOUT),
            (SwarmgateError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (SwarmgateError::Remote("down".to_string()), StatusCode::BAD_GATEWAY),
            (
                SwarmgateError::custom(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError(error).classify().0, status);
        }
    }

    #[test]
    fn test_types_all_query_flag() {
        let query = |all: Option<&str>| AllQuery {
            all: all.map(str::to_string),
        };

        assert!(query(Some("1")).all());
        assert!(query(Some("true")).all());
        assert!(!query(Some("0")).all());
        assert!(!query(None).all());
    }

    #[test]
    fn test_types_error_details_skipped_for_server_errors() {
        let response = ErrorResponse::new(500, "boom".to_string(), ErrorType::InternalError)
            .with_details("stack".to_string());
        assert!(response.details.is_none());

        let response = ErrorResponse::new(400, "bad".to_string(), ErrorType::ValidationError)
            .with_details("field".to_string());
        assert_eq!(response.details.as_deref(), Some("field"));
    }
}
