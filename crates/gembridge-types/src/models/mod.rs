//! Domain models shared across the gembridge workspace.

mod config;

pub use config::{
    DebugConfig, GatewayConfig, RetryConfig, ServerConfig, StreamDebugConfig, UpstreamConfig,
    UpstreamProxyConfig, DEFAULT_PROVIDER_BASE_URL,
};
