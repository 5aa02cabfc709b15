use serde_json::{Map, Value};

use super::required_arg;
use crate::tooling::{ParamSpec, ToolInvokeError, ToolSpec};

pub(super) const NAME: &str = "print_reasoning";

const PARAM: &str = "Thought";

pub(super) fn spec() -> ToolSpec {
    ToolSpec::new(NAME, invoke)
        .with_description("Records the thought process before the next step.")
        .with_param(ParamSpec::required(PARAM).describe("The reasoning behind the next step."))
}

fn invoke(arguments: &Map<String, Value>) -> Result<Value, ToolInvokeError> {
    required_arg(arguments, PARAM).cloned()
}
