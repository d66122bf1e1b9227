//! Provider boundary.
//!
//! Handlers only see `GenerativeProvider`; every failure crossing this
//! boundary is a tagged `ProviderError`.

pub mod client;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use gembridge_types::protocol::gemini::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, GenerateContentRequest,
    GenerateContentResponse, ListModelsResponse,
};
use gembridge_types::ProviderError;

pub use client::GeminiClient;

/// Streamed increments of one generation call, in provider order.
pub type IncrementStream = BoxStream<'static, Result<GenerateContentResponse, ProviderError>>;

#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError>;

    /// Open a streaming call. Cancelling `cancel` ends the stream with an
    /// `Abort` error and releases the connection.
    async fn generate_content_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        cancel: CancellationToken,
    ) -> Result<IncrementStream, ProviderError>;

    async fn batch_embed_contents(
        &self,
        model: &str,
        request: &BatchEmbedContentsRequest,
    ) -> Result<BatchEmbedContentsResponse, ProviderError>;

    async fn list_models(&self) -> Result<ListModelsResponse, ProviderError>;
}
