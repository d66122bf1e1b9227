// Non-streaming chat completion
use axum::Json;
use std::sync::Arc;
use tracing::{debug, error};

use gembridge_types::protocol::gemini::GenerateContentRequest;
use gembridge_types::protocol::openai::ChatCompletionResponse;
use gembridge_types::GatewayError;

use crate::error::ApiError;
use crate::proxy::credential_pool::Credential;
use crate::proxy::mappers::openai::response::transform_response;
use crate::proxy::mappers::openai::ResponseContext;
use crate::proxy::retry::{with_retry, AttemptError};
use crate::proxy::server::AppState;

/// One `generateContent` call per attempt. Text extraction is part of the
/// attempt, so a blocked candidate is retried like any other response error.
pub(crate) async fn handle_single(
    state: &AppState,
    ctx: ResponseContext,
    payload: GenerateContentRequest,
) -> Result<Json<ChatCompletionResponse>, ApiError> {
    let model = ctx.model.as_str();
    let request_id = ctx.id.as_str();
    let payload = &payload;
    let mut previous: Option<Arc<Credential>> = None;

    let (content, response) = with_retry(&state.retry, |attempt| {
        let credential = state.pool.rotate(previous.as_ref());
        previous = Some(Arc::clone(&credential));
        async move {
            debug!("[{}] Attempt {} via {}", request_id, attempt, credential.label());
            let response = credential.client().generate_content(model, payload).await?;
            let content = response.text()?;
            Ok::<_, AttemptError<GatewayError>>((content, response))
        }
    })
    .await
    .map_err(|e| {
        error!("[{}] Chat completion failed: {}", request_id, e);
        ApiError(e)
    })?;

    debug!("[{}] Completion assembled ({} chars)", request_id, content.len());
    Ok(Json(transform_response(&ctx, content, &response)))
}
