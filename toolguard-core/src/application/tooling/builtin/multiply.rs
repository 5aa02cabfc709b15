use serde_json::{Map, Value};

use super::{number_value, required_arg};
use crate::tooling::{ParamSpec, ToolInvokeError, ToolSpec};

pub(super) const NAME: &str = "multiply";

pub(super) fn spec() -> ToolSpec {
    ToolSpec::new(NAME, invoke)
        .with_description("Multiplies two numbers and returns the product.")
        .with_param(ParamSpec::required("a").describe("The first number."))
        .with_param(ParamSpec::required("b").describe("The second number."))
}

enum Operand {
    Int(i64),
    Float(f64),
}

fn operand(arguments: &Map<String, Value>, name: &str) -> Result<Operand, ToolInvokeError> {
    match required_arg(arguments, name)? {
        Value::Number(number) => number
            .as_i64()
            .map(Operand::Int)
            .or_else(|| number.as_f64().map(Operand::Float))
            .ok_or_else(|| ToolInvokeError::invalid(name, "number out of range")),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .map(Operand::Int)
                .or_else(|_| text.parse::<f64>().map(Operand::Float))
                .map_err(|_| ToolInvokeError::invalid(name, format!("'{text}' is not a number")))
        }
        other => Err(ToolInvokeError::invalid(
            name,
            format!("expected a number, got {other}"),
        )),
    }
}

fn invoke(arguments: &Map<String, Value>) -> Result<Value, ToolInvokeError> {
    let a = operand(arguments, "a")?;
    let b = operand(arguments, "b")?;
    match (a, b) {
        (Operand::Int(a), Operand::Int(b)) => a
            .checked_mul(b)
            .map(Value::from)
            .ok_or_else(|| ToolInvokeError::failed("integer overflow")),
        (a, b) => number_value(a.as_f64() * b.as_f64()),
    }
}

impl Operand {
    fn as_f64(&self) -> f64 {
        match self {
            Operand::Int(value) => *value as f64,
            Operand::Float(value) => *value,
        }
    }
}
