use crate::object::CallArgs;
use serde_json::Value;

/// Text form of the absent value
pub const NONE_TEXT: &str = "None";

/// Capability to render a value as human-readable text for a log record
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Value {
    fn render(&self) -> String {
        match self {
            Value::Null => NONE_TEXT.to_string(),
            Value::String(text) => text.clone(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => number.to_string(),
            // Containers keep their compact JSON form
            Value::Array(_) | Value::Object(_) => self.to_string(),
        }
    }
}

impl<T: Render> Render for Option<T> {
    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => NONE_TEXT.to_string(),
        }
    }
}

/// Render a call's arguments: positional values first, then `name=value`
/// pairs, everything joined by `", "`.
pub fn stringify_args(args: &CallArgs) -> String {
    args.positional
        .iter()
        .map(Render::render)
        .chain(args.named.iter().map(|(name, value)| format!("{}={}", name, value.render())))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn stringify_result(result: &Value) -> String {
    result.render()
}
