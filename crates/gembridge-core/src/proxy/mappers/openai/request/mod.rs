mod content_parts;
mod generation_config;
mod tool_declarations;


use futures::future::try_join_all;
use reqwest::Client;

use gembridge_types::protocol::gemini::{
    Content, GenerateContentRequest, GeminiRole, HarmBlockThreshold, HarmCategory, Part,
    SafetySetting,
};
use gembridge_types::protocol::openai::{
    ChatCompletionRequest, ChatMessage, ContentPart, MessageContent, OpenAIRole, TypedContentPart,
};
use gembridge_types::TranslationError;

pub use content_parts::transform_content_part;
pub use generation_config::{build_generation_config, is_experimental_model};
pub use tool_declarations::transform_tool_declarations;

/// Safety categories sent on every request, all with `BLOCK_NONE`.
const SAFETY_CATEGORIES: [HarmCategory; 5] = [
    HarmCategory::Harassment,
    HarmCategory::HateSpeech,
    HarmCategory::SexuallyExplicit,
    HarmCategory::DangerousContent,
    HarmCategory::CivicIntegrity,
];

pub fn default_safety_settings() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|&category| SafetySetting { category, threshold: HarmBlockThreshold::BlockNone })
        .collect()
}

/// Translate an OpenAI chat request into a Gemini payload.
///
/// `http_client` is used to download remote `image_url` parts.
pub async fn transform_openai_request(
    request: &ChatCompletionRequest,
    http_client: &Client,
) -> Result<GenerateContentRequest, TranslationError> {
    let system_instruction = extract_system_instruction(&request.messages).map(Content::system);

    let contents = try_join_all(
        request
            .messages
            .iter()
            .filter(|m| m.role != OpenAIRole::System)
            .map(|m| transform_message(m, http_client)),
    )
    .await?;

    let tools = request
        .tools
        .as_deref()
        .map(transform_tool_declarations)
        .filter(|declarations| !declarations.is_empty());

    let payload = GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: build_generation_config(request),
        safety_settings: default_safety_settings(),
        tools,
    };

    tracing::debug!(
        "[OpenAI-Request] model={} contents={} system={} tools={}",
        request.model,
        payload.contents.len(),
        payload.system_instruction.is_some(),
        payload.tools.as_ref().map_or(0, Vec::len)
    );
    Ok(payload)
}

/// Text of the first system message: the string itself, or its first `text`
/// part. A system message with no text part yields no instruction.
fn extract_system_instruction(messages: &[ChatMessage]) -> Option<String> {
    let system = messages.iter().find(|m| m.role == OpenAIRole::System)?;
    match &system.content {
        MessageContent::Text(text) => Some(text.clone()),
        MessageContent::Parts(parts) => parts.iter().find_map(|part| match part {
            ContentPart::Typed(TypedContentPart::Text { text }) => Some(text.clone()),
            _ => None,
        }),
    }
}

async fn transform_message(
    message: &ChatMessage,
    http_client: &Client,
) -> Result<Content, TranslationError> {
    let role = match message.role {
        OpenAIRole::Assistant => GeminiRole::Model,
        OpenAIRole::User | OpenAIRole::System => GeminiRole::User,
    };

    let parts = match &message.content {
        MessageContent::Text(text) => vec![Part::text(text.clone())],
        MessageContent::Parts(parts) => {
            try_join_all(parts.iter().map(|p| transform_content_part(p, http_client))).await?
        },
    };

    Ok(Content::new(role, parts))
}
