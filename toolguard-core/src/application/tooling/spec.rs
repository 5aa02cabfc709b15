use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ToolInvokeError;

/// The callable half of a tool.
///
/// Implemented for any `Fn(&Map<String, Value>) -> Result<Value, ToolInvokeError>`
/// so simple tools can be registered as closures.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(&self, arguments: &Map<String, Value>) -> Result<Value, ToolInvokeError>;
}

#[async_trait]
impl<F> ToolHandler for F
where
    F: Fn(&Map<String, Value>) -> Result<Value, ToolInvokeError> + Send + Sync,
{
    async fn invoke(&self, arguments: &Map<String, Value>) -> Result<Value, ToolInvokeError> {
        self(arguments)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A registered tool: name, ordered parameter schema and handler.
///
/// Built with the consuming `with_*` methods and immutable afterwards.
#[derive(Clone)]
pub struct ToolSpec {
    name: String,
    description: Option<String>,
    parameters: Vec<ParamSpec>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, handler: impl ToolHandler + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a parameter. A name already declared is ignored.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        if !self.declares(&param.name) {
            self.parameters.push(param);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[ParamSpec] {
        &self.parameters
    }

    pub fn takes_no_parameters(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn declares(&self, key: &str) -> bool {
        self.parameters.iter().any(|param| param.name == key)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.parameters.iter().filter(|param| param.required)
    }

    pub async fn invoke(&self, arguments: &Map<String, Value>) -> Result<Value, ToolInvokeError> {
        self.handler.invoke(arguments).await
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Serializable view of a tool, shown to the model in the system prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Vec<ParamSpec>,
}
