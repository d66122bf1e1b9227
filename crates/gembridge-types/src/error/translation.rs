//! Errors raised while translating an OpenAI request into a Gemini payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request-translation failures. Never retried; surfaced as HTTP 400.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum TranslationError {
    /// A message part type the gateway cannot express on the provider side
    #[error("not support content type: {content_type}")]
    UnsupportedContentType {
        /// The `type` tag of the offending part
        content_type: String,
    },

    /// Remote image could not be downloaded
    #[error("Failed to fetch image {url}: {message}")]
    ImageFetch {
        /// Image URL as given by the client
        url: String,
        /// Transport error or HTTP status description
        message: String,
    },

    /// Inline image payload is not valid base64
    #[error("Invalid base64 image data: {message}")]
    InvalidBase64 {
        /// Decoder error description
        message: String,
    },
}

impl TranslationError {
    pub fn unsupported(content_type: impl Into<String>) -> Self {
        Self::UnsupportedContentType { content_type: content_type.into() }
    }
}
