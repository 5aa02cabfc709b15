use serde::{Deserialize, Serialize};

/// A built-in tool enabled for the agent, optionally with its own description.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ToolConfig {
    pub name: String,
    pub description: Option<String>,
}

impl ToolConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTool {
    Name(String),
    Detailed {
        name: String,
        description: Option<String>,
    },
}

impl From<RawTool> for ToolConfig {
    fn from(value: RawTool) -> Self {
        match value {
            RawTool::Name(name) => Self::named(name),
            RawTool::Detailed { name, description } => Self { name, description },
        }
    }
}
