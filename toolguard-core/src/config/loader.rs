use super::CONFIG_PATH;
use super::app::AppConfig;
use super::defaults::{DEFAULT_MODEL, DEFAULT_OLLAMA_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS};
use super::error::ConfigError;
use super::guard::GuardConfig;
use super::tool::{RawTool, ToolConfig};
use crate::constants::ENV_PATH;
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
    system_prompt: Option<String>,
    tools: Option<Vec<RawTool>>,
    #[serde(default)]
    guard: GuardConfig,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(&expand_path(path)),
        None => match read_config(Path::new(CONFIG_PATH)) {
            Err(ConfigError::NotFound { .. }) => {
                info!("Configuration file not found; using defaults");
                Ok(AppConfig::default())
            }
            other => other,
        },
    }
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        None => path.to_path_buf(),
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(build(parsed))
}

fn build(parsed: RawConfig) -> AppConfig {
    let defaults = AppConfig::default();
    AppConfig {
        model: parsed.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        endpoint: parsed
            .endpoint
            .unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string()),
        request_timeout_secs: parsed
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        system_prompt: parsed.system_prompt,
        tools: parsed
            .tools
            .map(|tools| tools.into_iter().map(ToolConfig::from).collect())
            .unwrap_or(defaults.tools),
        guard: parsed.guard,
    }
}
