use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tower_http::trace::TraceLayer;

use gembridge_types::protocol::openai::ModelList;
use gembridge_types::{ConfigError, GatewayConfig, StreamDebugConfig};

use crate::proxy::common::client_builder::build_http_client;
use crate::proxy::credential_pool::CredentialPool;
use crate::proxy::middleware::cors::cors_layer;
use crate::proxy::retry::RetryPolicy;

/// Axum application state, shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<CredentialPool>,
    /// Shared outbound client (remote image downloads)
    pub http_client: reqwest::Client,
    pub retry: RetryPolicy,
    pub stream_log: StreamDebugConfig,
    /// First successful model listing, kept for the life of the process
    pub models: Arc<OnceCell<ModelList>>,
}

impl AppState {
    pub fn new(
        pool: Arc<CredentialPool>,
        http_client: reqwest::Client,
        retry: RetryPolicy,
        stream_log: StreamDebugConfig,
    ) -> Self {
        Self { pool, http_client, retry, stream_log, models: Arc::new(OnceCell::new()) }
    }

    /// Wire up the pool and HTTP client described by `config`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let http_client = build_http_client(&config.upstream.proxy)?;
        let pool = CredentialPool::from_api_keys(
            &config.credentials()?,
            &http_client,
            &config.upstream.base_url,
        )?;
        Ok(Self::new(
            Arc::new(pool),
            http_client,
            RetryPolicy::from(&config.retry),
            config.debug.stream.clone(),
        ))
    }
}

pub fn build_proxy_router(state: AppState, body_limit_bytes: usize) -> Router<()> {
    use crate::proxy::handlers;

    Router::new()
        .route("/", get(handlers::common::handle_root))
        .route("/health", get(handlers::common::handle_root))
        .route("/v1/chat/completions", post(handlers::openai::handle_chat_completions))
        .route("/v1/completions", post(handlers::openai::handle_completions))
        .route("/v1/embeddings", post(handlers::openai::handle_embeddings))
        .route("/v1/models", get(handlers::openai::handle_list_models))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Configuration for starting the Axum server
pub struct ServerStartConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
    pub state: AppState,
}

pub struct AxumServer {
    config: ServerStartConfig,
}

impl AxumServer {
    pub fn new(config: ServerStartConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let app = build_proxy_router(self.config.state, self.config.body_limit_bytes);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("gembridge listening on {}", listener.local_addr()?);
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
