use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{ANSWER_KEY, FINAL_ANSWER, RESPONSE_KEY};
use crate::model::ModelResponse;

/// What the model emitted for one turn, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCall {
    /// A JSON payload that may describe a tool call.
    Structured(Value),
    /// Prose with no recognizable call shape.
    Text(String),
}

impl RawCall {
    /// Prefers a provider-native tool call, then JSON found in the content.
    pub fn from_response(response: &ModelResponse) -> Self {
        match &response.tool_call {
            Some(call) => RawCall::Structured(call.clone()),
            None => RawCall::from_completion(&response.message.content),
        }
    }

    pub fn from_completion(content: &str) -> Self {
        let cleaned = strip_reasoning(content);
        match extract_json(&cleaned) {
            Some(value @ Value::Object(_)) => RawCall::Structured(value),
            Some(Value::String(inner)) if inner.trim() != cleaned.trim() => {
                RawCall::from_completion(&inner)
            }
            _ => RawCall::Text(cleaned),
        }
    }
}

/// The normalized `{name, arguments}` form passed downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalCall {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl CanonicalCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn final_answer(text: impl Into<String>) -> Self {
        let mut arguments = Map::new();
        arguments.insert(RESPONSE_KEY.to_string(), Value::String(text.into()));
        Self::new(FINAL_ANSWER, arguments)
    }

    pub fn is_final_answer(&self) -> bool {
        self.name == FINAL_ANSWER
    }

    /// Text carried by a final answer, whichever slot the model used.
    pub fn answer_text(&self) -> String {
        if let Some(value) = self
            .arguments
            .get(RESPONSE_KEY)
            .or_else(|| self.arguments.get(ANSWER_KEY))
        {
            return render_value(value);
        }
        let mut values = self.arguments.values();
        match (values.next(), values.next()) {
            (Some(only), None) => render_value(only),
            (None, _) => String::new(),
            _ => Value::Object(self.arguments.clone()).to_string(),
        }
    }
}

/// Strings are rendered bare, everything else as compact JSON.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Removes `<think>...</think>` blocks some local models prepend.
pub(crate) fn strip_reasoning(text: &str) -> String {
    let mut cleaned = text.to_string();
    while let (Some(start), Some(end)) = (cleaned.find("<think>"), cleaned.find("</think>")) {
        if end < start {
            break;
        }
        cleaned.replace_range(start..end + "</think>".len(), "");
    }
    cleaned.trim().to_string()
}

fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced.trim()) {
            return Some(value);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            let candidate = &trimmed[start..=end];
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return Some(value);
            }
        }
    }

    None
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    let body_start = after.find('\n').unwrap_or(0);
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}
