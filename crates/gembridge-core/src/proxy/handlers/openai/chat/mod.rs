// OpenAI chat completions handler
pub(crate) mod single_response;
pub(crate) mod stream_handler;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

use gembridge_types::protocol::openai::ChatCompletionRequest;

use crate::error::{ApiError, AppResult};
use crate::proxy::handlers::common::parse_request;
use crate::proxy::mappers::openai::{transform_openai_request, ResponseContext};
use crate::proxy::server::AppState;

/// `POST /v1/chat/completions`.
///
/// Translation happens once, outside the retry loop: a request that cannot be
/// translated never reaches the provider.
pub async fn handle_chat_completions(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Response> {
    let request: ChatCompletionRequest = parse_request(body)?;
    let ctx = ResponseContext::for_request(&request);
    debug!(
        "[{}] Chat request: model={}, messages={}, stream={}",
        ctx.id,
        request.model,
        request.messages.len(),
        request.stream
    );

    let payload = transform_openai_request(&request, &state.http_client).await.map_err(|e| {
        warn!("[{}] Request translation failed: {}", ctx.id, e);
        ApiError::from(e)
    })?;

    if request.stream {
        stream_handler::handle_stream(&state, ctx, payload).await
    } else {
        Ok(single_response::handle_single(&state, ctx, payload).await?.into_response())
    }
}
