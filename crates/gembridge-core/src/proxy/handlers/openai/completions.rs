use gembridge_types::GatewayError;

use crate::error::ApiError;

/// Legacy text completions are not offered; chat completions cover them.
pub async fn handle_completions() -> ApiError {
    ApiError(GatewayError::NotImplemented { endpoint: "/v1/completions".to_string() })
}
