//! HTTP-facing error type for gembridge handlers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gembridge_types::protocol::openai::{ErrorBody, ErrorResponse};
use gembridge_types::{ConfigError, GatewayError, ProviderError, TranslationError};
use thiserror::Error;

/// A `GatewayError` on its way out as an OpenAI-style error body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(transparent)]
pub struct ApiError(pub GatewayError);

/// Result type alias for handler code.
pub type AppResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::BAD_GATEWAY)
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                message: self.0.to_string(),
                kind: self.0.error_type().to_string(),
                code: self.0.code(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            tracing::debug!("Rejected request: {}", self.0);
        } else {
            tracing::warn!("Request failed with {}: {}", self.status(), self.0);
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self(e)
    }
}

impl From<TranslationError> for ApiError {
    fn from(e: TranslationError) -> Self {
        Self(e.into())
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        Self(e.into())
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        Self(e.into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self(GatewayError::invalid_request(e.to_string()))
    }
}

/// Malformed or non-JSON bodies get the same OpenAI-shaped 400 as schema errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(GatewayError::invalid_request(rejection.body_text()))
    }
}
