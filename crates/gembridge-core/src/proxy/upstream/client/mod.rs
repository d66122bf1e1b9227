mod request_executor;


use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use tokio_util::sync::CancellationToken;
use url::Url;

use gembridge_types::protocol::gemini::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, ErrorEnvelope, GenerateContentRequest,
    GenerateContentResponse, ListModelsResponse,
};
use gembridge_types::{ConfigError, ProviderError};

use super::{GenerativeProvider, IncrementStream};
pub use request_executor::{build_url, describe_envelope, describe_error_body, model_resource};
use request_executor::{classify_transport_error, decode_json, execute};

/// Gemini REST client bound to one API key.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &mask_key(&self.api_key))
            .finish()
    }
}

/// `AIza…9xQ2` style mask for logs.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

impl GeminiClient {
    /// Accepts a pre-built `reqwest::Client` so all credentials share one
    /// connection pool and proxy setup.
    pub fn new(
        http_client: Client,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| ConfigError::ValidationError {
            field: "upstream.base_url".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { http_client, base_url, api_key: api_key.into() })
    }

    pub fn masked_key(&self) -> String {
        mask_key(&self.api_key)
    }

    fn url(&self, resource: &str, method: Option<&str>, sse: bool) -> Result<Url, ProviderError> {
        build_url(&self.base_url, resource, method, sse, &self.api_key)
    }
}

/// Parse one SSE `data:` payload. The provider reports mid-stream failures as
/// an error envelope instead of a response.
fn parse_increment(data: &str) -> Result<GenerateContentResponse, ProviderError> {
    let value: Value = serde_json::from_str(data)
        .map_err(|e| ProviderError::decode(format!("Invalid stream event: {}", e)))?;
    if value.get("error").is_some() {
        let envelope: ErrorEnvelope = serde_json::from_value(value)
            .map_err(|e| ProviderError::decode(format!("Invalid stream error event: {}", e)))?;
        return Err(ProviderError::generic(describe_envelope(&envelope)));
    }
    serde_json::from_value(value)
        .map_err(|e| ProviderError::decode(format!("Invalid stream event: {}", e)))
}

fn classify_stream_error(e: EventStreamError<reqwest::Error>) -> ProviderError {
    match e {
        EventStreamError::Transport(e) => classify_transport_error(e),
        other => ProviderError::generic(format!("Malformed event stream: {}", other)),
    }
}

enum Step<T> {
    Cancelled,
    Next(Option<T>),
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = self.url(&model_resource(model), Some("generateContent"), false)?;
        tracing::debug!("[Gemini] generateContent model={} key={}", model, self.masked_key());
        let response = execute(self.http_client.post(url).json(request)).await?;
        decode_json(response).await
    }

    async fn generate_content_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        cancel: CancellationToken,
    ) -> Result<IncrementStream, ProviderError> {
        let url = self.url(&model_resource(model), Some("streamGenerateContent"), true)?;
        tracing::debug!("[Gemini] streamGenerateContent model={} key={}", model, self.masked_key());

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ProviderError::abort("Request cancelled before response")),
            response = execute(self.http_client.post(url).json(request)) => response?,
        };
        let mut events = Box::pin(response.bytes_stream().eventsource());

        let stream = async_stream::stream! {
            loop {
                let step = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Step::Cancelled,
                    event = events.next() => Step::Next(event),
                };
                match step {
                    Step::Cancelled => {
                        yield Err(ProviderError::abort("Stream cancelled"));
                        break;
                    },
                    Step::Next(None) => break,
                    Step::Next(Some(Ok(event))) => {
                        if event.data.trim().is_empty() {
                            continue;
                        }
                        match parse_increment(&event.data) {
                            Ok(increment) => yield Ok(increment),
                            Err(e) => {
                                yield Err(e);
                                break;
                            },
                        }
                    },
                    Step::Next(Some(Err(e))) => {
                        yield Err(classify_stream_error(e));
                        break;
                    },
                }
            }
        };
        Ok(stream.boxed())
    }

    async fn batch_embed_contents(
        &self,
        model: &str,
        request: &BatchEmbedContentsRequest,
    ) -> Result<BatchEmbedContentsResponse, ProviderError> {
        let url = self.url(&model_resource(model), Some("batchEmbedContents"), false)?;
        tracing::debug!(
            "[Gemini] batchEmbedContents model={} inputs={}",
            model,
            request.requests.len()
        );
        let response = execute(self.http_client.post(url).json(request)).await?;
        decode_json(response).await
    }

    async fn list_models(&self) -> Result<ListModelsResponse, ProviderError> {
        let url = self.url("models", None, false)?;
        let response = execute(self.http_client.get(url)).await?;
        decode_json(response).await
    }
}
