use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
    #[error("tool name '{0}' is reserved")]
    ReservedName(String),
    #[error("tool '{0}' is not registered")]
    NotFound(String),
}

/// Failure raised inside a tool. The loop driver never propagates it; it is
/// rendered into an error-shaped result string instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToolInvokeError {
    #[error("missing required argument '{0}'")]
    MissingArgument(String),
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },
    #[error("{0}")]
    Failed(String),
}

impl ToolInvokeError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
