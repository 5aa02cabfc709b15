use serde_json::Map;
use tracing::debug;

use super::call::CanonicalCall;
use crate::constants::RESPONSE_KEY;
use crate::tooling::ToolSpec;

/// A call whose arguments were filtered against the tool's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedCall {
    pub call: CanonicalCall,
    /// Keys the model supplied that the tool does not declare.
    pub dropped: Vec<String>,
    /// Required parameters the model did not supply.
    pub missing: Vec<String>,
}

impl SanitizedCall {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Keeps only declared argument keys. Lossy on purpose: model output is
/// untrusted and unknown keys are dropped rather than rejected.
pub fn sanitize(call: CanonicalCall, spec: &ToolSpec) -> SanitizedCall {
    if call.is_final_answer() {
        return SanitizedCall {
            call,
            dropped: Vec::new(),
            missing: Vec::new(),
        };
    }

    let CanonicalCall {
        name,
        mut arguments,
    } = call;

    if spec.takes_no_parameters() {
        let dropped: Vec<String> = arguments.keys().cloned().collect();
        if !dropped.is_empty() {
            debug!(tool = %name, ?dropped, "Discarding arguments for parameterless tool");
        }
        return SanitizedCall {
            call: CanonicalCall::new(name, Map::new()),
            dropped,
            missing: Vec::new(),
        };
    }

    // Shorthand `{tool: "text"}` lands in the response slot; bind it to the
    // tool's only parameter.
    if let [only] = spec.parameters() {
        if arguments.len() == 1 && !spec.declares(RESPONSE_KEY) {
            if let Some(value) = arguments.remove(RESPONSE_KEY) {
                arguments.insert(only.name.clone(), value);
            }
        }
    }

    let mut kept = Map::new();
    let mut dropped = Vec::new();
    for (key, value) in arguments {
        if spec.declares(&key) {
            kept.insert(key, value);
        } else {
            dropped.push(key);
        }
    }
    if !dropped.is_empty() {
        debug!(tool = %name, ?dropped, "Dropped undeclared arguments");
    }

    let missing = spec
        .required_params()
        .filter(|param| kept.get(&param.name).is_none_or(|value| value.is_null()))
        .map(|param| param.name.clone())
        .collect();

    SanitizedCall {
        call: CanonicalCall::new(name, kept),
        dropped,
        missing,
    }
}
