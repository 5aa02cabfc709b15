use serde::Serialize;
use serde_json::{Map, Value};

use super::guard::TerminationReason;
use crate::config::{AppConfig, GuardConfig};

/// One tool invocation made during a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub arguments: Map<String, Value>,
    pub success: bool,
    pub output: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub conversation_id: String,
    pub response: String,
    pub reason: TerminationReason,
    pub step_count: usize,
    pub steps: Vec<AgentStep>,
}

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: String,
    pub system_prompt: Option<String>,
    pub guard: GuardConfig,
    /// Advertise tools through the backend's native tool-calling API too.
    pub native_tools: bool,
}

impl AgentOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            guard: GuardConfig::default(),
            native_tools: false,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            guard: config.guard.clone(),
            native_tools: false,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_guard(mut self, guard: GuardConfig) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_native_tools(mut self, enabled: bool) -> Self {
        self.native_tools = enabled;
        self
    }
}
