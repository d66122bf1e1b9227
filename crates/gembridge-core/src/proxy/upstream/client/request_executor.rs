use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use gembridge_types::protocol::gemini::{ErrorDetail, ErrorEnvelope};
use gembridge_types::ProviderError;

const API_VERSION: &str = "v1beta";

/// `models/<id>`; names that already carry the prefix are kept as is.
pub fn model_resource(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Build `<base>/v1beta/<resource>[:<method>]?[alt=sse&]key=<key>`.
pub fn build_url(
    base_url: &Url,
    resource: &str,
    method: Option<&str>,
    sse: bool,
    api_key: &str,
) -> Result<Url, ProviderError> {
    let path = match method {
        Some(m) => format!("{}/{}:{}", API_VERSION, resource, m),
        None => format!("{}/{}", API_VERSION, resource),
    };
    let mut url = base_url
        .join(&path)
        .map_err(|e| ProviderError::request_input(format!("Invalid provider URL: {}", e)))?;
    {
        let mut query = url.query_pairs_mut();
        if sse {
            query.append_pair("alt", "sse");
        }
        query.append_pair("key", api_key);
    }
    Ok(url)
}

/// Send a request, turning transport failures into `Network` and non-2xx
/// statuses into `Fetch` errors carrying the provider's message.
pub async fn execute(request: RequestBuilder) -> Result<Response, ProviderError> {
    let response = request.send().await.map_err(classify_transport_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::fetch(status.as_u16(), describe_error_body(status.as_u16(), &body)))
}

/// Read and decode a success body.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let bytes = response.bytes().await.map_err(classify_transport_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProviderError::decode(format!("Failed to decode provider response: {}", e)))
}

pub fn classify_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_builder() {
        ProviderError::request_input(e.to_string())
    } else if e.is_decode() {
        ProviderError::decode(e.to_string())
    } else {
        ProviderError::network(e.to_string())
    }
}

/// `[<status> <STATUS_NAME>] <message>` from the provider error envelope, or
/// the raw body when it is not one.
pub fn describe_error_body(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            let code = if envelope.error.code == 0 { status } else { envelope.error.code };
            describe_envelope(&ErrorEnvelope {
                error: ErrorDetail { code, ..envelope.error },
            })
        },
        _ if body.trim().is_empty() => format!("[{}] empty response body", status),
        _ => format!("[{}] {}", status, body.trim()),
    }
}

/// `[<code> <STATUS>] <message>`
pub fn describe_envelope(envelope: &ErrorEnvelope) -> String {
    let error = &envelope.error;
    if error.status.is_empty() {
        format!("[{}] {}", error.code, error.message)
    } else {
        format!("[{} {}] {}", error.code, error.status, error.message)
    }
}
