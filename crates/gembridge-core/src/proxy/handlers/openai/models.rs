use axum::{extract::State, Json};
use tracing::info;

use gembridge_types::protocol::openai::ModelList;
use gembridge_types::ProviderError;

use crate::error::AppResult;
use crate::proxy::mappers::openai::models::transform_model_list;
use crate::proxy::server::AppState;

/// Provider model list via the first credential. The first successful result
/// is cached; failures are returned and retried on the next call.
pub async fn handle_list_models(State(state): State<AppState>) -> AppResult<Json<ModelList>> {
    let list = state
        .models
        .get_or_try_init(|| async {
            let response = state.pool.first().client().list_models().await?;
            info!("Cached {} provider model(s)", response.models.len());
            Ok::<_, ProviderError>(transform_model_list(&response))
        })
        .await?;

    Ok(Json(list.clone()))
}
