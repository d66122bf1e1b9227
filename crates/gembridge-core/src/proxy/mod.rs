//! Proxy module - OpenAI-compatible front for the Gemini API
//!
//! - Credential pool with round-robin and random-excluding rotation
//! - Request/response translation between the two wire formats
//! - Retry executor for transient provider failures
//! - SSE relay with client-disconnect cancellation

pub mod common;
pub mod credential_pool;
pub mod handlers;
pub mod mappers;
pub mod middleware;
pub mod retry;
pub mod server;
pub mod upstream;

pub use credential_pool::{Credential, CredentialPool};
pub use retry::{with_retry, AttemptError, RetryPolicy};
pub use server::{build_proxy_router, AppState, AxumServer, ServerStartConfig};
pub use upstream::{GenerativeProvider, IncrementStream};

#[cfg(test)]
pub mod tests;
