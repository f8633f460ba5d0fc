//! Error body returned by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    UnprocessableError,
    ServerError,
    UpstreamError,
    ServiceUnavailableError,
    TimeoutError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::UnprocessableError => write!(f, "unprocessable_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
            Self::TimeoutError => write!(f, "timeout_error"),
        }
    }
}

/// `{"error": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    /// Stable machine-readable code
    pub code: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        error_type: ApiErrorType,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: code.into(),
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiErrorType::InvalidRequestError,
            "validation_error",
            message,
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ApiErrorType::NotFoundError,
            "not_found",
            message,
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorType::ServerError,
            "internal_error",
            message,
        )
    }

    /// Replace the code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = code.into();
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();

        match &err {
            DomainError::Validation { .. } => Self::bad_request(message),
            DomainError::NotFound { .. } => Self::not_found(message),
            DomainError::NoReasonText { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorType::UnprocessableError,
                "no_reason_text",
                message,
            ),
            DomainError::ProviderUnavailable { .. } => {
                warn!(error = %err, "Embedding provider not configured");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    ApiErrorType::ServiceUnavailableError,
                    "provider_unavailable",
                    message,
                )
            }
            DomainError::Provider { .. } => {
                warn!(error = %err, "Embedding provider failed");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    ApiErrorType::ServiceUnavailableError,
                    "provider_error",
                    message,
                )
            }
            DomainError::SearchBackend { .. } => Self::new(
                StatusCode::BAD_GATEWAY,
                ApiErrorType::UpstreamError,
                "search_backend_error",
                message,
            ),
            DomainError::Timeout { .. } => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                ApiErrorType::TimeoutError,
                "timeout",
                message,
            ),
            DomainError::Configuration { .. }
            | DomainError::Cache { .. }
            | DomainError::Internal { .. } => {
                error!(error = %err, "Request failed with internal error");
                Self::internal(message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}
