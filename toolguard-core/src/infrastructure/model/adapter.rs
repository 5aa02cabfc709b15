//! Message format adapters

use serde_json::{Value, json};

use crate::tooling::ToolDescriptor;
use crate::types::{ChatMessage, MessageRole};

pub struct MessageAdapter;

impl MessageAdapter {
    pub fn to_ollama_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|message| {
                let mut entry = json!({
                    "role": message.role.as_str(),
                    "content": message.content,
                });
                if let (MessageRole::Tool, Some(name)) = (message.role, &message.name) {
                    entry["tool_name"] = Value::String(name.clone());
                }
                entry
            })
            .collect()
    }

    /// Function definitions for providers with native tool calling.
    /// Parameters are untyped: the registry declares names only.
    pub fn to_function_tools(tools: &[ToolDescriptor]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                let properties: serde_json::Map<String, Value> = tool
                    .parameters
                    .iter()
                    .map(|param| {
                        let mut property = json!({});
                        if let Some(description) = &param.description {
                            property["description"] = Value::String(description.clone());
                        }
                        (param.name.clone(), property)
                    })
                    .collect();
                let required: Vec<&str> = tool
                    .parameters
                    .iter()
                    .filter(|param| param.required)
                    .map(|param| param.name.as_str())
                    .collect();
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description.clone().unwrap_or_default(),
                        "parameters": {
                            "type": "object",
                            "properties": properties,
                            "required": required,
                        }
                    }
                })
            })
            .collect()
    }
}
