use std::collections::HashMap;

use tracing::debug;

use super::error::RegistryError;
use super::spec::{ToolDescriptor, ToolSpec};
use crate::constants::FINAL_ANSWER;

/// Tools indexed by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    index: HashMap<String, usize>,
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. Fails if the name is taken or is the reserved
    /// `final_answer` sentinel.
    pub fn register(&mut self, spec: ToolSpec) -> Result<&mut Self, RegistryError> {
        let name = spec.name().to_string();
        if name == FINAL_ANSWER {
            return Err(RegistryError::ReservedName(name));
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        debug!(tool = %name, params = spec.parameters().len(), "Registering tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(spec);
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Result<&ToolSpec, RegistryError> {
        self.index
            .get(name)
            .and_then(|position| self.tools.get(*position))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(ToolSpec::name)
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(ToolSpec::descriptor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tooling::{ParamSpec, ToolInvokeError};
    use serde_json::{Map, Value, json};

    fn echo(arguments: &Map<String, Value>) -> Result<Value, ToolInvokeError> {
        Ok(Value::Object(arguments.clone()))
    }

    #[test]
    fn registers_and_looks_up_in_order() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolSpec::new("search", echo).with_param(ParamSpec::required("query")))
            .expect("register search")
            .register(ToolSpec::new("clock", echo))
            .expect("register clock");

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["search", "clock"]);
        let search = registry.lookup("search").expect("lookup");
        assert!(search.declares("query"));
        assert!(registry.lookup("clock").expect("lookup").takes_no_parameters());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolSpec::new("search", echo)).expect("first");
        let err = registry
            .register(ToolSpec::new("search", echo))
            .expect_err("duplicate");
        assert_eq!(err, RegistryError::DuplicateTool("search".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn final_answer_is_reserved() {
        let mut registry = ToolRegistry::new();
        let err = registry
            .register(ToolSpec::new(FINAL_ANSWER, echo))
            .expect_err("reserved");
        assert_eq!(err, RegistryError::ReservedName(FINAL_ANSWER.into()));
        assert!(registry.is_empty());
    }

    #[test]
    fn lookup_of_missing_tool_is_not_found() {
        let registry = ToolRegistry::new();
        assert_eq!(
            registry.lookup("frobnicate").expect_err("missing"),
            RegistryError::NotFound("frobnicate".into())
        );
    }

    #[tokio::test]
    async fn closure_handlers_are_invoked_through_the_spec() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolSpec::new("echo", echo).with_param(ParamSpec::optional("text")))
            .expect("register");
        let mut arguments = Map::new();
        arguments.insert("text".into(), json!("hi"));

        let output = registry
            .lookup("echo")
            .expect("lookup")
            .invoke(&arguments)
            .await
            .expect("invoke");
        assert_eq!(output, json!({"text": "hi"}));
    }
}
