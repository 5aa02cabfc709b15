//! Side-effect-free tools shipped with the agent.

mod calculator;
mod multiply;
mod reasoning;

use serde_json::{Map, Value};
use tracing::debug;

use super::{RegistryError, ToolInvokeError, ToolRegistry, ToolSpec};
use crate::config::ToolConfig;

pub use calculator::evaluate_expression;

pub const BUILTIN_TOOLS: &[&str] = &[calculator::NAME, multiply::NAME, reasoning::NAME];

pub fn builtin_spec(name: &str) -> Option<ToolSpec> {
    match name {
        calculator::NAME => Some(calculator::spec()),
        multiply::NAME => Some(multiply::spec()),
        reasoning::NAME => Some(reasoning::spec()),
        _ => None,
    }
}

/// Builds a registry holding the configured built-ins, applying description
/// overrides.
pub fn registry_from_config(tools: &[ToolConfig]) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        let mut spec =
            builtin_spec(&tool.name).ok_or_else(|| RegistryError::NotFound(tool.name.clone()))?;
        if let Some(description) = &tool.description {
            spec = spec.with_description(description.clone());
        }
        registry.register(spec)?;
    }
    debug!(tools = registry.len(), "Built-in tool registry ready");
    Ok(registry)
}

fn required_arg<'a>(
    arguments: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a Value, ToolInvokeError> {
    arguments
        .get(name)
        .filter(|value| !value.is_null())
        .ok_or_else(|| ToolInvokeError::MissingArgument(name.to_string()))
}

/// Integral results are reported as JSON integers.
fn number_value(value: f64) -> Result<Value, ToolInvokeError> {
    if !value.is_finite() {
        return Err(ToolInvokeError::failed("result is not a finite number"));
    }
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Ok(Value::from(value as i64))
    } else {
        Ok(Value::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_has_a_spec() {
        for name in BUILTIN_TOOLS {
            let spec = builtin_spec(name).expect("builtin spec");
            assert_eq!(spec.name(), *name);
            assert!(spec.description().is_some());
        }
        assert!(builtin_spec("send_email").is_none());
    }

    #[test]
    fn registry_from_config_applies_description_override() {
        let tools = vec![ToolConfig {
            name: "multiply".into(),
            description: Some("Product of a and b".into()),
        }];
        let registry = registry_from_config(&tools).expect("registry");
        assert_eq!(
            registry.lookup("multiply").expect("lookup").description(),
            Some("Product of a and b")
        );
    }

    #[test]
    fn registry_from_config_rejects_duplicates() {
        let tools = vec![ToolConfig::named("calculator"), ToolConfig::named("calculator")];
        assert_eq!(
            registry_from_config(&tools).expect_err("duplicate"),
            RegistryError::DuplicateTool("calculator".into())
        );
    }
}
