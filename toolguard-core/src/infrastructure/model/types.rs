//! Model types - Request, Response, and Error types

use crate::tooling::ToolDescriptor;
use crate::types::{ChatMessage, MessageRole};
use serde_json::Value;
use thiserror::Error;

/// Model request for one completion
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Tools advertised through the provider's native tool-calling API.
    /// Empty when calls are negotiated through the prompt only.
    pub tools: Vec<ToolDescriptor>,
}

/// Model response from LLM
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
    /// Provider-native tool call as a `{name, arguments}` payload.
    pub tool_call: Option<Value>,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message: ChatMessage::new(MessageRole::Assistant, content),
            tool_call: None,
        }
    }

    pub fn with_tool_call(mut self, call: Value) -> Self {
        self.tool_call = Some(call);
        self
    }

    /// What the assistant said, for the conversation history. Native calls
    /// with empty content are recorded as their JSON payload.
    pub fn transcript(&self) -> String {
        match &self.tool_call {
            Some(call) if self.message.content.trim().is_empty() => call.to_string(),
            _ => self.message.content.clone(),
        }
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build HTTP client for provider '{provider}': {source}")]
    Client {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ModelError {
    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Cannot connect to model provider '{provider}'.")
                } else if source.is_timeout() {
                    format!("Request to '{provider}' timed out.")
                } else if let Some(status) = source.status() {
                    format!("Request to '{provider}' failed: {}", status.as_u16())
                } else {
                    format!("Network error talking to '{provider}'.")
                }
            }
            ModelError::Client { provider, .. } => {
                format!("HTTP client for '{provider}' could not be configured.")
            }
            ModelError::InvalidResponse { provider, .. } => {
                format!("Response from '{provider}' was not understood.")
            }
        }
    }
}
