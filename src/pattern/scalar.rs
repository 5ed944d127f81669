use serde_json::Value;

use crate::error::{ContractError, ContractResult};
use crate::pattern::Pattern;
use crate::result::MatchResult;

/// Leaf types: `(string)`, `(number)`, `(boolean)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarPattern {
    String,
    Number,
    Boolean,
}

impl ScalarPattern {
    pub fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_)) | (Self::Number, Value::Number(_)) | (Self::Boolean, Value::Bool(_))
        )
    }

    pub fn matches(self, value: &Value) -> MatchResult {
        match self.accepts(value) {
            true => MatchResult::Success,
            false => MatchResult::mismatch(self.type_name(), value),
        }
    }

    pub fn generate(self) -> Value {
        match self {
            Self::String => Value::from("sample"),
            Self::Number => Value::from(1),
            Self::Boolean => Value::Bool(true),
        }
    }

    pub fn parse(self, text: &str) -> ContractResult<Value> {
        match self {
            Self::String => Ok(Value::String(text.to_string())),
            Self::Number => crate::value::number_value(text).ok_or_else(|| ContractError::parse("number", text)),
            Self::Boolean => match text.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(ContractError::parse("boolean", text)),
            },
        }
    }

    /// Same scalar type, or a literal of that type.
    pub fn encompasses(self, other: &Pattern) -> MatchResult {
        match other {
            Pattern::Scalar(that) if *that == self => MatchResult::Success,
            Pattern::Exact(exact) if self.accepts(exact.value()) => MatchResult::Success,
            other => MatchResult::failure(format!("Expected {}, got {}", self.type_name(), other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ExactValuePattern;
    use serde_json::json;

    #[test]
    fn generated_values_match_their_own_type() {
        for scalar in [ScalarPattern::String, ScalarPattern::Number, ScalarPattern::Boolean] {
            assert!(scalar.matches(&scalar.generate()).is_success(), "{scalar:?}");
        }
    }

    #[test]
    fn number_parse_uses_numeric_precedence() {
        assert_eq!(ScalarPattern::Number.parse("12").unwrap(), json!(12));
        assert_eq!(ScalarPattern::Number.parse("2.5").unwrap(), json!(2.5));
        let error = ScalarPattern::Number.parse("twelve").unwrap_err();
        assert_eq!(error.to_string(), "Expected number, actual was \"twelve\"");
    }

    #[test]
    fn string_parse_is_verbatim() {
        assert_eq!(ScalarPattern::String.parse("\"quoted\"").unwrap(), json!("\"quoted\""));
    }

    #[test]
    fn scalars_encompass_their_literals() {
        let literal = Pattern::Exact(ExactValuePattern::new(json!(5)));
        assert!(ScalarPattern::Number.encompasses(&literal).is_success());
        assert!(!ScalarPattern::String.encompasses(&literal).is_success());
        assert!(!ScalarPattern::String.encompasses(&Pattern::Scalar(ScalarPattern::Number)).is_success());
    }
}
