//! Helpers over the JSON value model (`serde_json::Value`, ordered objects).
//!
//! The engine treats values as opaque leaf carriers; the only interpretation it
//! does itself is turning raw text into a number, which follows a fixed
//! precedence: `i32`, then `i64`, then `f32`, then `f64`.
use serde_json::{Number, Value};

/// Number parsed from text, tagged with the representation that accepted it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericLiteral {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl NumericLiteral {
    /// JSON number for this literal. Floats go through their shortest decimal
    /// rendering so `1.1f32` becomes `1.1` rather than the widened `f64`.
    pub fn to_value(self) -> Option<Value> {
        let number = match self {
            Self::Int(x) => Number::from(x),
            Self::Long(x) => Number::from(x),
            Self::Float(x) => Number::from_f64(x.to_string().parse::<f64>().ok()?)?,
            Self::Double(x) => Number::from_f64(x)?,
        };
        Some(Value::Number(number))
    }
}

/// Try every numeric representation in precedence order.
pub fn parse_number(text: &str) -> Option<NumericLiteral> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(x) = text.parse::<i32>() {
        return Some(NumericLiteral::Int(x));
    }
    if let Ok(x) = text.parse::<i64>() {
        return Some(NumericLiteral::Long(x));
    }
    // `inf`/`NaN` parse as floats in Rust but have no JSON form
    if let Ok(x) = text.parse::<f32>() {
        if x.is_finite() {
            return Some(NumericLiteral::Float(x));
        }
    }
    match text.parse::<f64>() {
        Ok(x) if x.is_finite() => Some(NumericLiteral::Double(x)),
        _ => None,
    }
}

/// Convenience: parse text straight into a JSON number value.
pub fn number_value(text: &str) -> Option<Value> {
    parse_number(text).and_then(NumericLiteral::to_value)
}

/// JSON equality where numbers compare by value, so `1e5` equals `100000`.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y)),
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len() && xs.iter().all(|(key, x)| ys.get(key).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "json array",
        Value::Object(_) => "json object",
    }
}

/// Short rendering used inside mismatch messages.
pub fn display(value: &Value) -> String {
    match value {
        Value::Object(_) | Value::Array(_) => {
            let text = value.to_string();
            if text.chars().count() > 80 {
                let head: String = text.chars().take(77).collect();
                format!("{head}...")
            } else {
                text
            }
        }
        other => other.to_string(),
    }
}

/// Remove one pair of surrounding double quotes, if present.
pub fn unquote(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        Some(&trimmed[1..trimmed.len() - 1])
    } else {
        None
    }
}
