// Gemini → OpenAI non-streaming response mapping
use gembridge_types::protocol::gemini::{GenerateContentResponse, UsageMetadata};
use gembridge_types::protocol::openai::{
    AssistantMessage, ChatCompletionRequest, ChatCompletionResponse, CompletionChoice, OpenAIUsage,
};

use crate::proxy::common::random_id::chat_completion_id;

/// Finish reason reported when the provider gives none.
pub const DEFAULT_FINISH_REASON: &str = "stop";

/// Per-request identity shared by the completion object or every chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContext {
    pub id: String,
    pub model: String,
    pub created: i64,
    pub include_usage: bool,
}

impl ResponseContext {
    pub fn new(model: impl Into<String>, include_usage: bool) -> Self {
        Self {
            id: chat_completion_id(),
            model: model.into(),
            created: chrono::Utc::now().timestamp(),
            include_usage,
        }
    }

    pub fn for_request(request: &ChatCompletionRequest) -> Self {
        Self::new(request.model.clone(), request.include_usage())
    }
}

/// Missing counters become 0.
pub fn usage_from_metadata(metadata: Option<&UsageMetadata>) -> OpenAIUsage {
    let metadata = metadata.copied().unwrap_or_default();
    OpenAIUsage {
        prompt_tokens: metadata.prompt_token_count.unwrap_or(0),
        completion_tokens: metadata.candidates_token_count.unwrap_or(0),
        total_tokens: metadata.total_token_count.unwrap_or(0),
    }
}

pub fn completion_response(
    ctx: &ResponseContext,
    content: String,
    finish_reason: Option<&str>,
    usage: OpenAIUsage,
) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: ctx.id.clone(),
        object: "chat.completion".to_string(),
        created: ctx.created,
        model: ctx.model.clone(),
        choices: vec![CompletionChoice {
            index: 0,
            message: AssistantMessage { role: "assistant".to_string(), content },
            finish_reason: finish_reason.unwrap_or(DEFAULT_FINISH_REASON).to_string(),
        }],
        usage,
    }
}

/// Full provider response → `chat.completion`, given its already-extracted text.
pub fn transform_response(
    ctx: &ResponseContext,
    content: String,
    response: &GenerateContentResponse,
) -> ChatCompletionResponse {
    completion_response(
        ctx,
        content,
        response.finish_reason(),
        usage_from_metadata(response.usage_metadata.as_ref()),
    )
}
