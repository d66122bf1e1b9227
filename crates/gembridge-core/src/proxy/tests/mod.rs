//! Shared test doubles for the proxy layer.

mod handlers;

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use gembridge_types::protocol::gemini::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, Candidate, Content,
    GenerateContentRequest, GenerateContentResponse, GeminiRole, ListModelsResponse, Part,
    UsageMetadata,
};
use gembridge_types::{ProviderError, StreamDebugConfig};

use crate::proxy::credential_pool::CredentialPool;
use crate::proxy::retry::RetryPolicy;
use crate::proxy::server::AppState;
use crate::proxy::upstream::{GenerativeProvider, IncrementStream};

type Scripted<T> = Mutex<VecDeque<Result<T, ProviderError>>>;

/// Provider that replays queued results in order. An exhausted queue answers
/// with a generic error so unexpected calls fail loudly.
#[derive(Default)]
pub struct ScriptedProvider {
    generate: Scripted<GenerateContentResponse>,
    streams: Scripted<Vec<Result<GenerateContentResponse, ProviderError>>>,
    embeddings: Scripted<BatchEmbedContentsResponse>,
    models: Scripted<ListModelsResponse>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, GenerateContentRequest)>>,
    last_embed: Mutex<Option<(String, BatchEmbedContentsRequest)>>,
}

impl ScriptedProvider {
    pub fn push_generate(&self, result: Result<GenerateContentResponse, ProviderError>) -> &Self {
        self.generate.lock().unwrap().push_back(result);
        self
    }

    pub fn push_stream(
        &self,
        result: Result<Vec<Result<GenerateContentResponse, ProviderError>>, ProviderError>,
    ) -> &Self {
        self.streams.lock().unwrap().push_back(result);
        self
    }

    pub fn push_embeddings(&self, result: Result<BatchEmbedContentsResponse, ProviderError>) -> &Self {
        self.embeddings.lock().unwrap().push_back(result);
        self
    }

    pub fn push_models(&self, result: Result<ListModelsResponse, ProviderError>) -> &Self {
        self.models.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, GenerateContentRequest)> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn last_embed(&self) -> Option<(String, BatchEmbedContentsRequest)> {
        self.last_embed.lock().unwrap().clone()
    }

    fn pop<T>(&self, queue: &Scripted<T>) -> Result<T, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::generic("no scripted response left")))
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        *self.last_request.lock().unwrap() = Some((model.to_string(), request.clone()));
        self.pop(&self.generate)
    }

    async fn generate_content_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        _cancel: CancellationToken,
    ) -> Result<IncrementStream, ProviderError> {
        *self.last_request.lock().unwrap() = Some((model.to_string(), request.clone()));
        let increments = self.pop(&self.streams)?;
        Ok(futures::stream::iter(increments).boxed())
    }

    async fn batch_embed_contents(
        &self,
        model: &str,
        request: &BatchEmbedContentsRequest,
    ) -> Result<BatchEmbedContentsResponse, ProviderError> {
        *self.last_embed.lock().unwrap() = Some((model.to_string(), request.clone()));
        self.pop(&self.embeddings)
    }

    async fn list_models(&self) -> Result<ListModelsResponse, ProviderError> {
        self.pop(&self.models)
    }
}

/// Model response carrying `text`, finish reason STOP and small usage counters.
pub fn text_response(text: &str) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content::new(GeminiRole::Model, vec![Part::text(text)])),
            finish_reason: Some("STOP".to_string()),
            index: Some(0),
            ..Default::default()
        }],
        usage_metadata: Some(UsageMetadata {
            prompt_token_count: Some(5),
            candidates_token_count: Some(2),
            total_token_count: Some(7),
        }),
        ..Default::default()
    }
}

/// Streamed increment without a finish reason.
pub fn text_increment(text: &str) -> GenerateContentResponse {
    let mut increment = text_response(text);
    increment.candidates[0].finish_reason = None;
    increment
}

pub fn fast_retry(retries: u32) -> RetryPolicy {
    RetryPolicy {
        enabled: true,
        retries,
        factor: 2.0,
        min_timeout: Duration::from_millis(1),
        max_timeout: Duration::from_millis(5),
    }
}

pub fn no_retry() -> RetryPolicy {
    RetryPolicy { enabled: false, ..fast_retry(0) }
}

pub fn state_with(providers: &[Arc<ScriptedProvider>], retry: RetryPolicy) -> AppState {
    let entries = providers
        .iter()
        .enumerate()
        .map(|(i, p)| (format!("test-key-{}", i), Arc::clone(p) as Arc<dyn GenerativeProvider>))
        .collect();
    let pool = CredentialPool::new(entries).unwrap();
    AppState::new(Arc::new(pool), reqwest::Client::new(), retry, StreamDebugConfig::default())
}
