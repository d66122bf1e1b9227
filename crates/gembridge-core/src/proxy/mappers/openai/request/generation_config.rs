use gembridge_types::protocol::gemini::GenerationConfig;
use gembridge_types::protocol::openai::{ChatCompletionRequest, StopSequences};

/// Model ids containing this marker reject penalty parameters.
const EXPERIMENTAL_MARKER: &str = "-exp";

pub fn is_experimental_model(model: &str) -> bool {
    model.contains(EXPERIMENTAL_MARKER)
}

pub fn build_generation_config(request: &ChatCompletionRequest) -> GenerationConfig {
    let mut config = GenerationConfig {
        temperature: request.temperature,
        max_output_tokens: request.max_tokens.or(request.max_completion_tokens),
        top_p: request.top_p,
        stop_sequences: normalize_stop(request.stop.as_ref()),
        frequency_penalty: request.frequency_penalty,
        presence_penalty: request.presence_penalty,
    };

    if is_experimental_model(&request.model) {
        if config.frequency_penalty.is_some() || config.presence_penalty.is_some() {
            tracing::debug!(
                "[OpenAI-Request] Dropping penalties for experimental model {}",
                request.model
            );
        }
        config.frequency_penalty = None;
        config.presence_penalty = None;
    }

    config
}

/// An empty single stop string means "no stop sequences".
fn normalize_stop(stop: Option<&StopSequences>) -> Option<Vec<String>> {
    match stop? {
        StopSequences::Single(s) if s.is_empty() => None,
        StopSequences::Single(s) => Some(vec![s.clone()]),
        StopSequences::Many(list) => Some(list.clone()),
    }
}
