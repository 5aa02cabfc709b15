use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::call::{CanonicalCall, RawCall, render_value};
use crate::config::UnknownToolReply;
use crate::constants::{ANSWER_KEY, FINAL_ANSWER, RESPONSE_KEY};
use crate::tooling::ToolRegistry;

const NAME_KEY: &str = "name";
const FUNCTION_NAME_KEY: &str = "function_name";
const ARGUMENTS_KEY: &str = "arguments";
const PARAMETERS_KEY: &str = "parameters";

/// Turns whatever the model emitted into a [`CanonicalCall`] whose name is
/// either a registered tool or `final_answer`. Never fails: unparseable
/// calls become a soft final answer.
pub struct Normalizer<'a> {
    registry: &'a ToolRegistry,
    unknown_reply: UnknownToolReply,
}

impl<'a> Normalizer<'a> {
    pub fn new(registry: &'a ToolRegistry, unknown_reply: UnknownToolReply) -> Self {
        Self {
            registry,
            unknown_reply,
        }
    }

    pub fn normalize(&self, raw: RawCall) -> CanonicalCall {
        let call = match raw {
            RawCall::Text(text) => CanonicalCall::final_answer(text),
            RawCall::Structured(Value::Object(map)) => self.normalize_map(map),
            RawCall::Structured(other) => {
                warn!(payload = %other, "Model emitted a non-object call payload");
                CanonicalCall::final_answer(self.unknown_reply.render(None))
            }
        };
        debug!(tool = %call.name, args = call.arguments.len(), "Normalized model call");
        call
    }

    fn normalize_map(&self, mut map: Map<String, Value>) -> CanonicalCall {
        if let Some(call) = self.bare_answer(&map) {
            return call;
        }
        if let Some(call) = self.shorthand(&map) {
            return call;
        }

        if !map.contains_key(NAME_KEY) {
            if let Some(name) = map.remove(FUNCTION_NAME_KEY) {
                map.insert(NAME_KEY.to_string(), name);
            }
        }

        let name = map
            .get(NAME_KEY)
            .and_then(Value::as_str)
            .map(|name| name.trim().to_string());
        let arguments = match map.remove(ARGUMENTS_KEY) {
            Some(arguments) => coerce_arguments(arguments),
            None => map
                .remove(PARAMETERS_KEY)
                .map(coerce_arguments)
                .unwrap_or_default(),
        };

        match name {
            Some(name) if name == FINAL_ANSWER || self.registry.contains(&name) => {
                CanonicalCall::new(name, arguments)
            }
            other => {
                warn!(requested_tool = ?other, "Unknown tool requested by model");
                CanonicalCall::final_answer(self.unknown_reply.render(other.as_deref()))
            }
        }
    }

    /// `{"response": v}` or `{"answer": v}` with nothing else.
    fn bare_answer(&self, map: &Map<String, Value>) -> Option<CanonicalCall> {
        if map.len() != 1 || map.contains_key(NAME_KEY) {
            return None;
        }
        let value = map.get(RESPONSE_KEY).or_else(|| map.get(ANSWER_KEY))?;
        let mut arguments = Map::new();
        arguments.insert(RESPONSE_KEY.to_string(), value.clone());
        Some(CanonicalCall::new(FINAL_ANSWER, arguments))
    }

    /// `{"toolName": v}` where `toolName` is registered (or the
    /// `final_answer` sentinel).
    fn shorthand(&self, map: &Map<String, Value>) -> Option<CanonicalCall> {
        if map.len() != 1 {
            return None;
        }
        let (key, value) = map.iter().next()?;
        let takes_no_parameters = if key == FINAL_ANSWER {
            false
        } else {
            self.registry.lookup(key).ok()?.takes_no_parameters()
        };

        let arguments = if takes_no_parameters {
            Map::new()
        } else {
            match value {
                Value::Object(inner) => inner.clone(),
                other => {
                    let mut arguments = Map::new();
                    arguments.insert(RESPONSE_KEY.to_string(), Value::String(render_value(other)));
                    arguments
                }
            }
        };
        Some(CanonicalCall::new(key.clone(), arguments))
    }
}

fn coerce_arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        Value::String(text) if text.trim().is_empty() => Map::new(),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            _ => single_response(text),
        },
        other => single_response(other.to_string()),
    }
}

fn single_response(text: String) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(RESPONSE_KEY.to_string(), Value::String(text));
    map
}
