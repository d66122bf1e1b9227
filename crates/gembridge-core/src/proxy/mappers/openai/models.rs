// Gemini model list → OpenAI model list
use gembridge_types::protocol::gemini::ListModelsResponse;
use gembridge_types::protocol::openai::{ModelCard, ModelList};

/// Fixed `created` stamp; the provider does not report one.
pub const MODEL_CREATED_AT: i64 = 1_666_666_666;

pub fn transform_model_list(response: &ListModelsResponse) -> ModelList {
    let data = response
        .models
        .iter()
        .map(|model| ModelCard {
            id: model.name.strip_prefix("models/").unwrap_or(&model.name).to_string(),
            object: "model".to_string(),
            owned_by: "google".to_string(),
            created: MODEL_CREATED_AT,
            extra: serde_json::to_value(model).unwrap_or_default(),
        })
        .collect();

    ModelList { object: "list".to_string(), data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_list_mapping() {
        let response: ListModelsResponse = serde_json::from_value(json!({
            "models": [{"name": "models/gemini-1.5-flash", "inputTokenLimit": 1048576}]
        }))
        .unwrap();

        let list = transform_model_list(&response);
        let wire = serde_json::to_value(&list).unwrap();
        assert_eq!(
            wire,
            json!({
                "object": "list",
                "data": [{
                    "id": "gemini-1.5-flash",
                    "object": "model",
                    "owned_by": "google",
                    "created": 1666666666,
                    "_extra": {"name": "models/gemini-1.5-flash", "inputTokenLimit": 1048576}
                }]
            })
        );
    }
}
