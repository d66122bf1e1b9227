//! Router-level tests driven through axum-test with scripted providers.

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gembridge_types::protocol::gemini::{
    BatchEmbedContentsResponse, ContentEmbedding, ListModelsResponse,
};
use gembridge_types::{ProviderError, StreamDebugConfig};

use super::{fast_retry, no_retry, state_with, text_increment, text_response, ScriptedProvider};
use crate::proxy::server::{build_proxy_router, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

fn server(state: AppState) -> TestServer {
    TestServer::new(build_proxy_router(state, BODY_LIMIT)).unwrap()
}

fn single_provider() -> (Arc<ScriptedProvider>, TestServer) {
    let provider = Arc::new(ScriptedProvider::default());
    let server = server(state_with(&[Arc::clone(&provider)], no_retry()));
    (provider, server)
}

fn chat_body(stream: bool) -> Value {
    json!({
        "model": "gemini-2.0-flash",
        "messages": [
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": "Hi"}
        ],
        "stream": stream
    })
}

/// `data:` payloads of an SSE body, in order.
fn sse_payloads(body: &str) -> Vec<String> {
    body.split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .map(str::to_string)
        .collect()
}

/// Provider with stream capture written under `dir`.
fn capturing_provider(dir: &Path) -> (Arc<ScriptedProvider>, TestServer) {
    let provider = Arc::new(ScriptedProvider::default());
    let mut state = state_with(&[Arc::clone(&provider)], no_retry());
    state.stream_log = StreamDebugConfig { log: true, dir: dir.to_path_buf() };
    (provider, server(state))
}

/// Capture files under `dir`. The relay task persists after the body closes,
/// so this waits until every file parses.
async fn captured_streams(dir: &Path) -> Vec<Value> {
    for _ in 0..200 {
        let captures: Option<Vec<Value>> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| {
                let bytes = std::fs::read(entry.unwrap().path()).ok()?;
                serde_json::from_slice(&bytes).ok()
            })
            .collect();
        if let Some(captures) = captures.filter(|c| !c.is_empty()) {
            return captures;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Vec::new()
}

#[tokio::test]
async fn test_root_and_health() {
    let (_, server) = single_provider();
    for path in ["/", "/health"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        response.assert_json(&json!({"ok": true}));
    }
}

#[tokio::test]
async fn test_chat_completion_success() {
    let (provider, server) = single_provider();
    provider.push_generate(Ok(text_response("Hello there")));

    let response = server.post("/v1/chat/completions").json(&chat_body(false)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "gemini-2.0-flash");
    assert!(body["id"].as_str().unwrap().starts_with("chatcmpl-"));
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(body["choices"][0]["message"]["content"], "Hello there");
    assert_eq!(body["choices"][0]["finish_reason"], "STOP");
    assert_eq!(body["usage"], json!({"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}));

    let (model, request) = provider.last_request().unwrap();
    assert_eq!(model, "gemini-2.0-flash");
    assert_eq!(request.contents.len(), 1);
    assert_eq!(request.system_instruction.unwrap().text(), "Be brief.");
}

#[tokio::test]
async fn test_chat_rejects_malformed_request() {
    let (provider, server) = single_provider();

    let response =
        server.post("/v1/chat/completions").json(&json!({"model": "gemini-2.0-flash"})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_chat_rejects_non_json_body() {
    let (_, server) = single_provider();

    let response = server.post("/v1/chat/completions").text("{not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_chat_rejects_out_of_range_temperature() {
    let (provider, server) = single_provider();
    let mut request = chat_body(false);
    request["temperature"] = json!(3.5);

    let response = server.post("/v1/chat/completions").json(&request).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_chat_unsupported_part_never_reaches_provider() {
    let (provider, server) = single_provider();
    let request = json!({
        "model": "gemini-2.0-flash",
        "messages": [{"role": "user", "content": [{"type": "file", "file": {"file_id": "f"}}]}]
    });

    let response = server.post("/v1/chat/completions").json(&request).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"]["message"].as_str().unwrap().contains("not support content type: file"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_chat_retries_on_another_credential() {
    let first = Arc::new(ScriptedProvider::default());
    let second = Arc::new(ScriptedProvider::default());
    // Round-robin starts at index 1; the retry must move to index 0.
    second.push_generate(Err(ProviderError::fetch(503, "[503 UNAVAILABLE] overloaded")));
    first.push_generate(Ok(text_response("recovered")));
    let server = server(state_with(&[Arc::clone(&first), Arc::clone(&second)], fast_retry(3)));

    let response = server.post("/v1/chat/completions").json(&chat_body(false)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["choices"][0]["message"]["content"], "recovered");
    assert_eq!(second.calls(), 1);
    assert_eq!(first.calls(), 1);
}

#[tokio::test]
async fn test_chat_retry_exhaustion_returns_provider_status() {
    let provider = Arc::new(ScriptedProvider::default());
    for _ in 0..3 {
        provider.push_generate(Err(ProviderError::fetch(429, "[429 RESOURCE_EXHAUSTED] quota")));
    }
    let server = server(state_with(&[Arc::clone(&provider)], fast_retry(2)));

    let response = server.post("/v1/chat/completions").json(&chat_body(false)).await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "upstream_error");
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_chat_decode_error_is_not_retried() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.push_generate(Err(ProviderError::decode("expected value at line 1")));
    provider.push_generate(Ok(text_response("unreachable")));
    let server = server(state_with(&[Arc::clone(&provider)], fast_retry(3)));

    let response = server.post("/v1/chat/completions").json(&chat_body(false)).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_chat_blocked_candidate_is_an_upstream_error() {
    let (provider, server) = single_provider();
    let mut blocked = text_response("");
    blocked.candidates[0].content = None;
    blocked.candidates[0].finish_reason = Some("SAFETY".to_string());
    provider.push_generate(Ok(blocked));

    let response = server.post("/v1/chat/completions").json(&chat_body(false)).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(body["error"]["message"].as_str().unwrap().contains("SAFETY"));
}

#[tokio::test]
async fn test_chat_stream_relays_increments() {
    let (provider, server) = single_provider();
    provider.push_stream(Ok(vec![Ok(text_increment("Hel")), Ok(text_increment("lo"))]));

    let response = server.post("/v1/chat/completions").json(&chat_body(true)).await;

    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "text/event-stream");
    assert_eq!(response.header(header::CACHE_CONTROL), "no-cache");

    let payloads = sse_payloads(&response.text());
    assert_eq!(payloads.len(), 3);
    assert_eq!(payloads[2], "[DONE]");

    let chunks: Vec<Value> =
        payloads[..2].iter().map(|p| serde_json::from_str(p).unwrap()).collect();
    assert_eq!(chunks[0]["choices"][0]["delta"]["content"], "Hel");
    assert_eq!(chunks[1]["choices"][0]["delta"]["content"], "lo");
    assert_eq!(chunks[0]["id"], chunks[1]["id"]);
    assert_eq!(chunks[0]["created"], chunks[1]["created"]);
    assert!(chunks[0]["choices"][0]["finish_reason"].is_null());
}

#[tokio::test]
async fn test_chat_stream_usage_on_request() {
    let (provider, server) = single_provider();
    provider.push_stream(Ok(vec![Ok(text_increment("x"))]));
    let mut request = chat_body(true);
    request["stream_options"] = json!({"include_usage": true});

    let response = server.post("/v1/chat/completions").json(&request).await;

    let payloads = sse_payloads(&response.text());
    let chunk: Value = serde_json::from_str(&payloads[0]).unwrap();
    assert_eq!(chunk["usage"]["total_tokens"], 7);
}

#[tokio::test]
async fn test_chat_stream_empty_provider_stream() {
    let (provider, server) = single_provider();
    provider.push_stream(Ok(Vec::new()));

    let response = server.post("/v1/chat/completions").json(&chat_body(true)).await;

    response.assert_status_ok();
    let payloads = sse_payloads(&response.text());
    assert_eq!(payloads.len(), 2);
    let chunk: Value = serde_json::from_str(&payloads[0]).unwrap();
    assert_eq!(chunk["choices"][0]["finish_reason"], "empty_stop");
    assert_eq!(chunk["choices"][0]["delta"]["content"], "");
    assert_eq!(payloads[1], "[DONE]");
}

#[tokio::test]
async fn test_chat_stream_open_failure_is_plain_json() {
    let (provider, server) = single_provider();
    provider.push_stream(Err(ProviderError::fetch(400, "[400 INVALID_ARGUMENT] bad model")));

    let response = server.post("/v1/chat/completions").json(&chat_body(true)).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "upstream_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("bad model"));
}

#[tokio::test]
async fn test_chat_stream_first_increment_failure_is_retried() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.push_stream(Ok(vec![Err(ProviderError::network("connection reset"))]));
    provider.push_stream(Ok(vec![Ok(text_increment("second try"))]));
    let server = server(state_with(&[Arc::clone(&provider)], fast_retry(2)));

    let response = server.post("/v1/chat/completions").json(&chat_body(true)).await;

    response.assert_status_ok();
    let payloads = sse_payloads(&response.text());
    let chunk: Value = serde_json::from_str(&payloads[0]).unwrap();
    assert_eq!(chunk["choices"][0]["delta"]["content"], "second try");
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_chat_stream_mid_stream_error_ends_with_done() {
    let (provider, server) = single_provider();
    provider.push_stream(Ok(vec![
        Ok(text_increment("partial")),
        Err(ProviderError::generic("[500 INTERNAL] stream broke")),
    ]));

    let response = server.post("/v1/chat/completions").json(&chat_body(true)).await;

    response.assert_status_ok();
    let payloads = sse_payloads(&response.text());
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[1], "[DONE]");
}

#[tokio::test]
async fn test_chat_null_stream_flag_is_non_streaming() {
    let (provider, server) = single_provider();
    provider.push_generate(Ok(text_response("plain")));
    let mut request = chat_body(false);
    request["stream"] = Value::Null;

    let response = server.post("/v1/chat/completions").json(&request).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["choices"][0]["message"]["content"], "plain");
}

#[tokio::test]
async fn test_chat_stream_null_include_usage_omits_usage() {
    let (provider, server) = single_provider();
    provider.push_stream(Ok(vec![Ok(text_increment("x"))]));
    let mut request = chat_body(true);
    request["stream_options"] = json!({"include_usage": null});

    let response = server.post("/v1/chat/completions").json(&request).await;

    response.assert_status_ok();
    let payloads = sse_payloads(&response.text());
    let chunk: Value = serde_json::from_str(&payloads[0]).unwrap();
    assert_eq!(chunk["choices"][0]["delta"]["content"], "x");
    assert!(chunk["usage"].is_null());
}

#[tokio::test]
async fn test_stream_capture_keeps_chunks_before_mid_stream_error() {
    let dir = tempfile::tempdir().unwrap();
    let (provider, server) = capturing_provider(dir.path());
    provider.push_stream(Ok(vec![
        Ok(text_increment("a")),
        Err(ProviderError::generic("[500 INTERNAL] stream broke")),
    ]));

    let response = server.post("/v1/chat/completions").json(&chat_body(true)).await;
    response.assert_status_ok();

    let captures = captured_streams(dir.path()).await;
    assert_eq!(captures.len(), 1);
    let chunks = captures[0]["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0]["candidates"][0]["content"]["parts"][0]["text"], "a");
}

#[tokio::test]
async fn test_stream_capture_of_empty_stream() {
    let dir = tempfile::tempdir().unwrap();
    let (provider, server) = capturing_provider(dir.path());
    provider.push_stream(Ok(Vec::new()));

    let response = server.post("/v1/chat/completions").json(&chat_body(true)).await;
    response.assert_status_ok();

    let captures = captured_streams(dir.path()).await;
    assert_eq!(captures, vec![json!({"chunks": []})]);
}

#[tokio::test]
async fn test_stream_capture_written_when_open_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (provider, server) = capturing_provider(dir.path());
    provider.push_stream(Err(ProviderError::fetch(400, "[400 INVALID_ARGUMENT] bad model")));

    let response = server.post("/v1/chat/completions").json(&chat_body(true)).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let captures = captured_streams(dir.path()).await;
    assert_eq!(captures, vec![json!({"chunks": []})]);
}

#[tokio::test]
async fn test_completions_not_implemented() {
    let (_, server) = single_provider();

    let response =
        server.post("/v1/completions").json(&json!({"model": "x", "prompt": "hi"})).await;

    response.assert_status(StatusCode::NOT_IMPLEMENTED);
    let body: Value = response.json();
    assert!(body["error"]["message"].as_str().unwrap().contains("/v1/completions"));
}

#[tokio::test]
async fn test_embeddings_success() {
    let (provider, server) = single_provider();
    provider.push_embeddings(Ok(BatchEmbedContentsResponse {
        embeddings: vec![
            ContentEmbedding { values: vec![0.1, 0.2] },
            ContentEmbedding { values: vec![0.3, 0.4] },
        ],
    }));

    let response = server
        .post("/v1/embeddings")
        .json(&json!({"model": "text-embedding-004", "input": ["a", "b"]}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["object"], "list");
    assert_eq!(body["model"], "text-embedding-004");
    assert_eq!(body["data"][1]["index"], 1);
    assert_eq!(body["data"][1]["object"], "embedding");
    assert_eq!(body["data"][0]["embedding"].as_array().unwrap().len(), 2);

    let (model, batch) = provider.last_embed().unwrap();
    assert_eq!(model, "text-embedding-004");
    assert_eq!(batch.requests.len(), 2);
    assert_eq!(batch.requests[0].model, "models/text-embedding-004");
}

#[tokio::test]
async fn test_embeddings_provider_error_is_not_retried() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.push_embeddings(Err(ProviderError::fetch(503, "[503 UNAVAILABLE] busy")));
    let server = server(state_with(&[Arc::clone(&provider)], fast_retry(3)));

    let response = server
        .post("/v1/embeddings")
        .json(&json!({"model": "text-embedding-004", "input": "a"}))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_models_listing_is_cached() {
    let (provider, server) = single_provider();
    let listing: ListModelsResponse = serde_json::from_value(json!({
        "models": [{"name": "models/gemini-2.0-flash", "displayName": "Gemini 2.0 Flash"}]
    }))
    .unwrap();
    provider.push_models(Ok(listing));

    let first = server.get("/v1/models").await;
    let second = server.get("/v1/models").await;

    first.assert_status_ok();
    second.assert_status_ok();
    let body: Value = first.json();
    assert_eq!(body["object"], "list");
    assert_eq!(body["data"][0]["id"], "gemini-2.0-flash");
    assert_eq!(body["data"][0]["owned_by"], "google");
    assert_eq!(body["data"][0]["_extra"]["displayName"], "Gemini 2.0 Flash");
    assert_eq!(second.json::<Value>(), body);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_models_failure_is_not_cached() {
    let (provider, server) = single_provider();
    provider.push_models(Err(ProviderError::fetch(401, "[401 UNAUTHENTICATED] bad key")));
    provider.push_models(Ok(ListModelsResponse::default()));

    server.get("/v1/models").await.assert_status(StatusCode::UNAUTHORIZED);
    server.get("/v1/models").await.assert_status_ok();
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (_, server) = single_provider();

    let response = server
        .method(Method::OPTIONS, "/v1/chat/completions")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"))
        .add_header(header::ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("POST"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "http://localhost:3000");
}
