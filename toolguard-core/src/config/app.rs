use std::path::Path;

use super::defaults::{
    DEFAULT_MODEL, DEFAULT_OLLAMA_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS, ENV_ENDPOINT, ENV_MODEL,
};
use super::error::ConfigError;
use super::guard::GuardConfig;
use super::loader;
use super::tool::ToolConfig;
use crate::tooling::builtin::BUILTIN_TOOLS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model: String,
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub system_prompt: Option<String>,
    pub tools: Vec<ToolConfig>,
    pub guard: GuardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            system_prompt: None,
            tools: BUILTIN_TOOLS.iter().map(|name| ToolConfig::named(*name)).collect(),
            guard: GuardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location when none
    /// is given. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = loader::load_config(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.model = model;
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if let Some(tool) = self
            .tools
            .iter()
            .find(|tool| !BUILTIN_TOOLS.contains(&tool.name.as_str()))
        {
            return Err(ConfigError::UnknownTool {
                name: tool.name.clone(),
            });
        }
        self.guard.validate()
    }
}
