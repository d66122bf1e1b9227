//! Typed error definitions for gembridge.
//!
//! Domain errors are serializable for API responses and matchable for the
//! retry classifier. `GatewayError` is the umbrella carried through handlers.

mod config;
mod provider;
mod translation;

pub use config::ConfigError;
pub use provider::{ProviderError, ProviderErrorKind};
pub use translation::TranslationError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for one gateway request.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "domain", content = "error")]
pub enum GatewayError {
    #[error("{0}")]
    Translation(#[from] TranslationError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed or out-of-range request body
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The endpoint exists but has no implementation
    #[error("{endpoint} is not implemented")]
    NotImplemented { endpoint: String },
}

impl GatewayError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    /// Whether another attempt (possibly on another credential) may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.kind.is_transient(),
            _ => false,
        }
    }

    /// Check if this is a client error (4xx equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Translation(_) | Self::InvalidRequest { .. })
    }

    /// Map to HTTP status code.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Translation(_) | Self::InvalidRequest { .. } => 400,
            Self::Provider(ProviderError { status: Some(status), .. })
                if (400..600).contains(status) =>
            {
                *status
            },
            Self::Provider(_) => 502,
            Self::NotImplemented { .. } => 501,
            Self::Config(_) => 500,
        }
    }

    /// OpenAI-style error `type` string.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Translation(_) | Self::InvalidRequest { .. } | Self::NotImplemented { .. } => {
                "invalid_request_error"
            },
            Self::Provider(_) => "upstream_error",
            Self::Config(_) => "internal_error",
        }
    }

    /// Short machine-readable code for the error body.
    pub fn code(&self) -> Option<String> {
        match self {
            Self::Provider(e) => Some(e.kind.as_str().to_string()),
            Self::Translation(TranslationError::UnsupportedContentType { .. }) => {
                Some("unsupported_content_type".to_string())
            },
            Self::Translation(TranslationError::ImageFetch { .. }) => {
                Some("image_fetch_failed".to_string())
            },
            Self::Translation(TranslationError::InvalidBase64 { .. }) => {
                Some("invalid_base64".to_string())
            },
            Self::NotImplemented { .. } => Some("not_implemented".to_string()),
            _ => None,
        }
    }
}
