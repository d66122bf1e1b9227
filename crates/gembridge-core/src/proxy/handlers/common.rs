// Common handler helpers
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use validator::Validate;

use gembridge_types::GatewayError;

use crate::error::ApiError;

/// `GET /` and `GET /health` liveness probe.
pub async fn handle_root() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Deserialize and range-check a JSON body; any failure is a 400.
pub fn parse_request<T>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let Json(body) = body?;
    let request: T = serde_json::from_value(body)
        .map_err(|e| GatewayError::invalid_request(e.to_string()))?;
    request.validate()?;
    Ok(request)
}
