use serde_json::{json, Value};

/// JSON-schema keywords the provider's function schema rejects.
const UNSUPPORTED_SCHEMA_KEYS: [&str; 2] = ["$schema", "additionalProperties"];

/// OpenAI `tools` → one Gemini tool holding `functionDeclarations`.
///
/// Only the declaration envelope is rewritten; names, descriptions and
/// parameter schemas pass through.
pub fn transform_tool_declarations(tools: &[Value]) -> Vec<Value> {
    let declarations: Vec<Value> = tools
        .iter()
        .filter_map(|tool| {
            let mut func = tool.get("function").cloned().unwrap_or_else(|| tool.clone());
            let obj = func.as_object_mut()?;
            if !obj.get("name").is_some_and(Value::is_string) {
                tracing::warn!("[OpenAI-Request] Skipping tool without name: {}", tool);
                return None;
            }
            obj.remove("type");
            obj.remove("strict");
            if let Some(params) = obj.get_mut("parameters") {
                strip_unsupported_keys(params);
            }
            Some(func)
        })
        .collect();

    if declarations.is_empty() {
        return Vec::new();
    }
    vec![json!({ "functionDeclarations": declarations })]
}

fn strip_unsupported_keys(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            for key in UNSUPPORTED_SCHEMA_KEYS {
                map.remove(key);
            }
            for (key, value) in map.iter_mut() {
                match (key.as_str(), value) {
                    // property names are user data, only their schemas are cleaned
                    ("properties", Value::Object(props)) => {
                        props.values_mut().for_each(strip_unsupported_keys);
                    },
                    (_, value) => strip_unsupported_keys(value),
                }
            }
        },
        Value::Array(items) => items.iter_mut().for_each(strip_unsupported_keys),
        _ => {},
    }
}
