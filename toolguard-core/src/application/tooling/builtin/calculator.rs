use serde_json::{Map, Value};

use super::{number_value, required_arg};
use crate::tooling::{ParamSpec, ToolInvokeError, ToolSpec};

pub(super) const NAME: &str = "calculator";

const PARAM: &str = "expression";

/// Two-word phrases are matched before single words.
const PHRASES: &[(&str, char)] = &[
    ("multiplied by", '*'),
    ("divided by", '/'),
    ("divide by", '/'),
];

const WORDS: &[(&str, char)] = &[
    ("into", '*'),
    ("times", '*'),
    ("multiplied", '*'),
    ("x", '*'),
    ("plus", '+'),
    ("minus", '-'),
    ("divide", '/'),
];

pub(super) fn spec() -> ToolSpec {
    ToolSpec::new(NAME, invoke)
        .with_description(
            "Evaluates a mathematical expression, possibly written in words \
             (\"3 times 4 plus 2\"), and returns the result.",
        )
        .with_param(
            ParamSpec::required(PARAM).describe("The expression to evaluate, digits or words."),
        )
}

fn invoke(arguments: &Map<String, Value>) -> Result<Value, ToolInvokeError> {
    let expression = match required_arg(arguments, PARAM)? {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => return Err(ToolInvokeError::invalid(PARAM, "expected a string")),
    };
    number_value(evaluate_expression(&expression)?)
}

/// Evaluates arithmetic over `+ - * / ( )` after mapping operator words to
/// symbols and discarding every other character.
pub fn evaluate_expression(input: &str) -> Result<f64, ToolInvokeError> {
    let symbolic = to_symbols(input);
    let mut parser = Parser {
        chars: symbolic.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
    };
    if parser.chars.is_empty() {
        return Err(ToolInvokeError::invalid(PARAM, "no arithmetic found"));
    }
    let value = parser.expression()?;
    if parser.pos != parser.chars.len() {
        return Err(ToolInvokeError::invalid(
            PARAM,
            format!("unexpected '{}'", parser.chars[parser.pos]),
        ));
    }
    Ok(value)
}

fn to_symbols(input: &str) -> String {
    let lowered = input.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let mut out = String::with_capacity(lowered.len());
    let mut i = 0;
    while i < words.len() {
        if let Some(next) = words.get(i + 1) {
            let pair = format!("{} {}", words[i], next);
            if let Some((_, op)) = PHRASES.iter().find(|(phrase, _)| *phrase == pair) {
                out.push(*op);
                out.push(' ');
                i += 2;
                continue;
            }
        }
        match WORDS.iter().find(|(word, _)| *word == words[i]) {
            Some((_, op)) => out.push(*op),
            None => out.push_str(words[i]),
        }
        out.push(' ');
        i += 1;
    }
    out.chars()
        .filter(|c| c.is_ascii_digit() || ".+-*/() ".contains(*c))
        .collect()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64, ToolInvokeError> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ToolInvokeError> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == '*' {
                value *= rhs;
            } else if rhs == 0.0 {
                return Err(ToolInvokeError::failed("division by zero"));
            } else {
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ToolInvokeError> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.pos += 1;
                self.factor()
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expression()?;
                if self.peek() != Some(')') {
                    return Err(ToolInvokeError::invalid(PARAM, "unbalanced parentheses"));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(ToolInvokeError::invalid(PARAM, format!("unexpected '{c}'"))),
            None => Err(ToolInvokeError::invalid(PARAM, "expression ends early")),
        }
    }

    fn number(&mut self) -> Result<f64, ToolInvokeError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| ToolInvokeError::invalid(PARAM, format!("bad number '{literal}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluates_symbolic_arithmetic_with_precedence() {
        assert_eq!(evaluate_expression("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate_expression("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate_expression("-3 + 10 / 4").unwrap(), -0.5);
    }

    #[test]
    fn maps_operator_words() {
        assert_eq!(evaluate_expression("3 times 4 plus 2").unwrap(), 14.0);
        assert_eq!(evaluate_expression("10 divided by 4").unwrap(), 2.5);
        assert_eq!(evaluate_expression("7 multiplied by 6").unwrap(), 42.0);
        assert_eq!(evaluate_expression("What is 9 minus 12?").unwrap(), -3.0);
        assert_eq!(evaluate_expression("5 x 5").unwrap(), 25.0);
    }

    #[test]
    fn division_by_zero_is_a_tool_error() {
        assert_eq!(
            evaluate_expression("1 / 0").unwrap_err(),
            ToolInvokeError::failed("division by zero")
        );
    }

    #[test]
    fn rejects_text_without_arithmetic() {
        assert!(evaluate_expression("hello there").is_err());
        assert!(evaluate_expression("(1 + 2").is_err());
        assert!(evaluate_expression("3 +").is_err());
    }

    #[test]
    fn invoke_reports_integers_as_integers() {
        let mut arguments = Map::new();
        arguments.insert(PARAM.into(), json!("6 into 7"));
        assert_eq!(invoke(&arguments).unwrap(), json!(42));

        arguments.insert(PARAM.into(), json!("1 / 4"));
        assert_eq!(invoke(&arguments).unwrap(), json!(0.25));
    }

    #[test]
    fn invoke_without_expression_fails() {
        assert_eq!(
            invoke(&Map::new()).unwrap_err(),
            ToolInvokeError::MissingArgument(PARAM.into())
        );
    }
}
