use serde_json::Value;

use crate::error::{ContractError, ContractResult, ErrorKind};
use crate::pattern::Pattern;
use crate::resolver::Resolver;
use crate::result::MatchResult;

/// A literal: matches exactly one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactValuePattern {
    value: Value,
}

impl ExactValuePattern {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn type_name(&self) -> String {
        crate::value::display(&self.value)
    }

    pub fn matches(&self, value: &Value) -> MatchResult {
        match crate::value::same_value(value, &self.value) {
            true => MatchResult::Success,
            false => MatchResult::mismatch(self.type_name(), value),
        }
    }

    /// Interpret text as a value of the same kind as the literal.
    /// Strings accept both bare and double-quoted text.
    pub fn parse(&self, text: &str) -> ContractResult<Value> {
        match &self.value {
            Value::String(_) => Ok(Value::String(crate::value::unquote(text).unwrap_or(text).to_string())),
            Value::Number(_) => crate::value::number_value(text).ok_or_else(|| ContractError::parse("number", text)),
            Value::Bool(_) => match text.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(ContractError::parse("boolean", text)),
            },
            Value::Null => match text.trim() {
                "" | "null" => Ok(Value::Null),
                _ => Err(ContractError::parse("null", text)),
            },
            Value::Object(_) | Value::Array(_) => serde_json::from_str(text.trim())
                .map_err(|error| ContractError::new(ErrorKind::Json(error.to_string()))),
        }
    }

    pub fn encompasses(&self, other: &Pattern) -> MatchResult {
        match other {
            Pattern::Exact(that) if crate::value::same_value(&that.value, &self.value) => MatchResult::Success,
            Pattern::Exact(that) => MatchResult::failure(format!("Expected {}, got {}", self.type_name(), that.type_name())),
            other => MatchResult::failure(format!("Expected {}, got {}", self.type_name(), other.type_name())),
        }
    }

    /// Does this literal satisfy at least one of `others`?
    pub fn fits_within(&self, others: &[Pattern], other_resolver: &Resolver) -> MatchResult {
        let mut first_failure = None;
        for other in others {
            match other.matches(&self.value, other_resolver) {
                MatchResult::Success => return MatchResult::Success,
                failure => {
                    first_failure.get_or_insert(failure);
                }
            }
        }
        first_failure.unwrap_or_else(|| MatchResult::failure("No matching patterns"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ScalarPattern;
    use serde_json::json;

    #[test]
    fn matches_only_the_literal() {
        let active = ExactValuePattern::new(json!("active"));
        assert!(active.matches(&json!("active")).is_success());
        let result = active.matches(&json!("inactive"));
        assert_eq!(result.report(), "Expected \"active\", actual was \"inactive\" (string)");
    }

    #[test]
    fn string_literals_parse_quoted_or_bare() {
        let active = ExactValuePattern::new(json!("active"));
        assert_eq!(active.parse("\"inactive\"").unwrap(), json!("inactive"));
        assert_eq!(active.parse("inactive").unwrap(), json!("inactive"));
    }

    #[test]
    fn literal_fits_within_any_accepting_pattern() {
        let resolver = Resolver::new();
        let ten = ExactValuePattern::new(json!(10));
        let string = Pattern::Scalar(ScalarPattern::String);
        let number = Pattern::Scalar(ScalarPattern::Number);
        assert!(ten.fits_within(&[string.clone(), number], &resolver).is_success());
        assert!(!ten.fits_within(&[string], &resolver).is_success());
        assert_eq!(ten.fits_within(&[], &resolver).report(), "No matching patterns");
    }

    #[test]
    fn numeric_literals_compare_by_value() {
        let large = ExactValuePattern::new(json!(100000));
        let parsed = large.parse("1e5").unwrap();
        assert!(large.matches(&parsed).is_success());
        assert!(large.matches(&json!(100000.0)).is_success());
        assert!(!large.matches(&json!(100001)).is_success());
        let exponent = Pattern::Exact(ExactValuePattern::new(parsed));
        assert!(large.encompasses(&exponent).is_success());
    }

    #[test]
    fn literals_encompass_only_equal_literals() {
        let ten = ExactValuePattern::new(json!(10));
        assert!(ten.encompasses(&Pattern::Exact(ExactValuePattern::new(json!(10)))).is_success());
        assert!(!ten.encompasses(&Pattern::Exact(ExactValuePattern::new(json!(11)))).is_success());
        assert!(!ten.encompasses(&Pattern::Scalar(ScalarPattern::Number)).is_success());
    }
}
