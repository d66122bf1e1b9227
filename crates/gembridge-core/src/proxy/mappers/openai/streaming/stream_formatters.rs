// OpenAI SSE stream formatting helpers
use bytes::Bytes;
use serde::Serialize;

use gembridge_types::protocol::gemini::GenerateContentResponse;
use gembridge_types::protocol::openai::{ChatCompletionChunk, ChunkChoice, ChunkDelta, OpenAIUsage};

use super::super::response::{usage_from_metadata, ResponseContext};

/// Stream terminator.
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Finish reason of the synthetic chunk sent when the provider produced nothing.
pub const EMPTY_STOP_REASON: &str = "empty_stop";

/// Format one SSE data frame
pub fn sse_frame<T: Serialize>(data: &T) -> Bytes {
    Bytes::from(format!("data: {}\n\n", serde_json::to_string(data).unwrap_or_default()))
}

pub fn stream_chunk(
    ctx: &ResponseContext,
    text: &str,
    finish_reason: Option<&str>,
    usage: Option<OpenAIUsage>,
) -> ChatCompletionChunk {
    ChatCompletionChunk {
        id: ctx.id.clone(),
        object: "chat.completion.chunk".to_string(),
        created: ctx.created,
        model: ctx.model.clone(),
        choices: vec![ChunkChoice {
            index: 0,
            delta: ChunkDelta { role: "assistant".to_string(), content: text.to_string() },
            finish_reason: finish_reason.map(str::to_string),
        }],
        usage,
    }
}

/// One provider increment → one chunk. Usage only when the client asked.
pub fn increment_chunk(
    ctx: &ResponseContext,
    increment: &GenerateContentResponse,
    text: &str,
) -> ChatCompletionChunk {
    let usage = ctx.include_usage.then(|| usage_from_metadata(increment.usage_metadata.as_ref()));
    stream_chunk(ctx, text, increment.finish_reason(), usage)
}

pub fn empty_stop_chunk(ctx: &ResponseContext) -> ChatCompletionChunk {
    let usage = ctx.include_usage.then(OpenAIUsage::default);
    stream_chunk(ctx, "", Some(EMPTY_STOP_REASON), usage)
}
