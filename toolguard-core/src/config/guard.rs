use serde::{Deserialize, Serialize};

use super::defaults::{
    DEFAULT_ERROR_MARKERS, DEFAULT_ERROR_THRESHOLD, DEFAULT_FALLBACK_ANSWER,
    DEFAULT_MAX_STEPS, DEFAULT_MAX_TOOL_CALLS, DEFAULT_VETO_MARKERS,
};
use super::error::ConfigError;

/// Reply used when the model names a tool that is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownToolReply {
    /// `Unknown tool call format.`
    #[default]
    Generic,
    /// `Tool '<name>' does not exist.`
    Named,
}

impl UnknownToolReply {
    pub fn render(self, name: Option<&str>) -> String {
        match (self, name) {
            (UnknownToolReply::Named, Some(name)) => format!("Tool '{name}' does not exist."),
            _ => "Unknown tool call format.".to_string(),
        }
    }
}

/// Bounds and replies applied by the guard policy to one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub max_steps: usize,
    pub max_tool_calls: usize,
    pub error_threshold: usize,
    pub suppress_duplicates: bool,
    pub fallback_answer: String,
    /// Replace the fixed fallback with a reason-specific message.
    pub explain_termination: bool,
    pub unknown_tool_reply: UnknownToolReply,
    /// Substrings (case-insensitive) that make a tool result error-shaped.
    pub error_markers: Vec<String>,
    /// Substrings (case-insensitive) that veto a final answer.
    pub veto_markers: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_tool_calls: DEFAULT_MAX_TOOL_CALLS,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            suppress_duplicates: true,
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
            explain_termination: false,
            unknown_tool_reply: UnknownToolReply::default(),
            error_markers: DEFAULT_ERROR_MARKERS.iter().map(|m| m.to_string()).collect(),
            veto_markers: DEFAULT_VETO_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl GuardConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls;
        self
    }

    pub fn with_error_threshold(mut self, threshold: usize) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn with_duplicate_suppression(mut self, enabled: bool) -> Self {
        self.suppress_duplicates = enabled;
        self
    }

    pub fn with_fallback_answer(mut self, answer: impl Into<String>) -> Self {
        self.fallback_answer = answer.into();
        self
    }

    pub fn with_explained_termination(mut self, enabled: bool) -> Self {
        self.explain_termination = enabled;
        self
    }

    pub fn with_unknown_tool_reply(mut self, reply: UnknownToolReply) -> Self {
        self.unknown_tool_reply = reply;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("guard.max_steps must be at least 1".into()));
        }
        if self.max_tool_calls == 0 {
            return Err(ConfigError::Invalid(
                "guard.max_tool_calls must be at least 1".into(),
            ));
        }
        if self.fallback_answer.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "guard.fallback_answer must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn is_error_shaped(&self, text: &str) -> bool {
        contains_marker(text, &self.error_markers)
    }

    pub fn is_vetoed(&self, text: &str) -> bool {
        contains_marker(text, &self.veto_markers)
    }
}

fn contains_marker(text: &str, markers: &[String]) -> bool {
    let lowered = text.to_lowercase();
    markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .any(|marker| lowered.contains(&marker.to_lowercase()))
}
