//! # gembridge Types
//!
//! Shared type system for the gembridge workspace:
//!
//! - **`error`** - Typed error hierarchy for translation, provider calls and configuration
//! - **`models`** - Gateway configuration model
//! - **`protocol`** - OpenAI and Gemini wire types
//!
//! ## Architecture Role
//!
//! ```text
//! gembridge-types (this crate)
//!        │
//!        ▼
//! gembridge-core
//!        │
//!        ▼
//! gembridge-server
//! ```

pub mod error;
pub mod models;
pub mod protocol;

pub use error::{ConfigError, GatewayError, ProviderError, ProviderErrorKind, TranslationError};
pub use models::{
    DebugConfig, GatewayConfig, RetryConfig, ServerConfig, StreamDebugConfig, UpstreamConfig,
    UpstreamProxyConfig,
};
