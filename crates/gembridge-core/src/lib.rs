//! # gembridge Core
//!
//! OpenAI-compatible gateway in front of the Gemini generative-language API.
//!
//! ```text
//! gembridge-core/src/proxy/
//! ├── credential_pool/  # API keys bound to provider clients, rotation
//! ├── upstream/         # GenerativeProvider trait + Gemini REST client
//! ├── mappers/openai/   # OpenAI <-> Gemini request/response/chunk mapping
//! ├── retry/            # bounded exponential backoff executor
//! ├── handlers/         # axum handlers (chat, embeddings, models, ...)
//! └── server.rs         # AppState, router, listener
//! ```

#![allow(
    clippy::wildcard_enum_match_arm,
    reason = "Provider enums are matched with catch-alls for forward compatibility"
)]
#![allow(clippy::map_err_ignore, reason = "Error context is provided in the replacement message")]
#![allow(
    clippy::derive_partial_eq_without_eq,
    reason = "Some types intentionally don't implement Eq"
)]
// Test-only lints: allow panic!, println!, etc. in test code
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::float_cmp,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::assertions_on_result_states
    )
)]

pub mod error;
pub mod modules;
pub mod proxy;

pub use error::{ApiError, AppResult};
