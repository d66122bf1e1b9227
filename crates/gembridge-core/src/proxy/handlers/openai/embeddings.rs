use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::{debug, error};

use gembridge_types::protocol::openai::{EmbeddingsRequest, EmbeddingsResponse};
use gembridge_types::GatewayError;

use crate::error::{ApiError, AppResult};
use crate::proxy::handlers::common::parse_request;
use crate::proxy::mappers::openai::embeddings::{
    transform_embeddings_request, transform_embeddings_response,
};
use crate::proxy::server::AppState;

/// Single provider call on the next pooled credential; not retried.
pub async fn handle_embeddings(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<EmbeddingsResponse>> {
    let request: EmbeddingsRequest = parse_request(body)?;
    let batch = transform_embeddings_request(&request);
    if batch.requests.is_empty() {
        return Err(GatewayError::invalid_request("input must not be empty").into());
    }

    let credential = state.pool.next();
    debug!(
        "Embedding {} input(s) with {} via {}",
        batch.requests.len(),
        request.model,
        credential.label()
    );

    let response =
        credential.client().batch_embed_contents(&request.model, &batch).await.map_err(|e| {
            error!("Embeddings request failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(transform_embeddings_response(&request, response)))
}
