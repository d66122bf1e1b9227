//! Errors returned by the generative-model provider boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed set of provider failure kinds.
///
/// Every failure that crosses the provider boundary is tagged with exactly one
/// of these; retry classification is a match over the tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Unclassified provider failure (e.g. broken SSE framing)
    Generic,
    /// Provider answered with a non-success HTTP status
    Fetch,
    /// Response was delivered but is unusable (blocked prompt, bad finish reason)
    Response,
    /// Request could not be serialized for sending
    RequestInput,
    /// Transport failure: connect, reset, body read
    Network,
    /// Call was cancelled
    Abort,
    /// Success status with a body that does not decode
    Decode,
}

impl ProviderErrorKind {
    /// Transient kinds worth another attempt.
    pub fn is_transient(self) -> bool {
        !matches!(self, Self::Decode)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Fetch => "fetch",
            Self::Response => "response",
            Self::RequestInput => "request_input",
            Self::Network => "network",
            Self::Abort => "abort",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged provider failure.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("[{kind}] {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    /// HTTP status for `Fetch` errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), status: None }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Generic, message)
    }

    pub fn fetch(status: u16, message: impl Into<String>) -> Self {
        Self { kind: ProviderErrorKind::Fetch, message: message.into(), status: Some(status) }
    }

    pub fn response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Response, message)
    }

    pub fn request_input(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RequestInput, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }

    pub fn abort(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Abort, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Decode, message)
    }

    pub fn is_abort(&self) -> bool {
        self.kind == ProviderErrorKind::Abort
    }
}
