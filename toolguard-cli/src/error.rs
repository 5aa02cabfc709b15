use thiserror::Error;
use toolguard_core::ConfigError;
use toolguard_core::agent::AgentError;
use toolguard_core::model::ModelError;
use toolguard_core::tooling::RegistryError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build tool registry: {0}")]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("failed to encode outcome: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
