use serde_json::Value;

use crate::error::{ContractError, ContractResult, ErrorKind};
use crate::pattern::{Pattern, TypeStack};
use crate::resolver::Resolver;
use crate::result::MatchResult;
use crate::row::Row;

/// A union of patterns. `(X?)` is the union of `null` and `X`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyPattern {
    arms: Vec<Pattern>,
}

impl AnyPattern {
    pub fn new(arms: Vec<Pattern>) -> Self {
        Self { arms }
    }

    pub fn nullable(pattern: Pattern) -> Self {
        Self::new(vec![Pattern::Null, pattern])
    }

    pub fn arms(&self) -> &[Pattern] {
        &self.arms
    }

    /// The non-null arm of a two-armed nullable union.
    pub fn nullable_inner(&self) -> Option<&Pattern> {
        match self.arms.as_slice() {
            [Pattern::Null, inner] | [inner, Pattern::Null] => Some(inner),
            _ => None,
        }
    }

    pub fn type_name(&self) -> String {
        if let Some(inner) = self.nullable_inner() {
            let name = inner.type_name();
            let name = name.strip_prefix('(').and_then(|n| n.strip_suffix(')')).unwrap_or(&name).to_string();
            return format!("({name}?)");
        }
        let names: Vec<String> = self.arms.iter().map(Pattern::type_name).collect();
        format!("({})", names.join(" or "))
    }

    pub fn matches(&self, value: &Value, resolver: &Resolver) -> MatchResult {
        match self.arms.iter().any(|arm| arm.matches(value, resolver).is_success()) {
            true => MatchResult::Success,
            false => MatchResult::mismatch(self.type_name(), value),
        }
    }

    /// First non-null arm, so optional data is actually exercised. A nullable
    /// self-reference that has recursed too deep ends the chain with `null`.
    pub fn generate(&self, resolver: &Resolver) -> ContractResult<Value> {
        let Some(arm) = self.arms.iter().find(|arm| !matches!(arm, Pattern::Null)).or(self.arms.first()) else {
            return Err(ContractError::new(ErrorKind::NoVariants { key: self.type_name() }));
        };
        match resolver.generate(None, arm) {
            Err(error) if error.is_recursion_limit() && self.arms.contains(&Pattern::Null) => {
                tracing::trace!(%error, "recursive union arm generated as null");
                Ok(Value::Null)
            }
            outcome => outcome,
        }
    }

    pub fn parse(&self, text: &str, resolver: &Resolver) -> ContractResult<Value> {
        for arm in &self.arms {
            if let Ok(value) = arm.parse(text, resolver) {
                if arm.matches(&value, resolver).is_success() {
                    return Ok(value);
                }
            }
        }
        Err(ContractError::parse(self.type_name(), text))
    }

    pub fn new_based_on(&self, row: &Row, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        let mut variants = Vec::new();
        for arm in &self.arms {
            variants.extend(arm.new_based_on(row, resolver)?);
        }
        Ok(variants)
    }

    pub fn compatibility_variants(&self, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        let mut variants = Vec::new();
        for arm in &self.arms {
            variants.extend(arm.compatibility_variants(resolver)?);
        }
        Ok(variants)
    }

    /// Every alternative of `other` must land in one of our arms.
    pub fn encompasses(
        &self,
        other: &Pattern,
        this_resolver: &Resolver,
        other_resolver: &Resolver,
        type_stack: &TypeStack,
    ) -> MatchResult {
        other.fits_within(&self.arms, other_resolver, this_resolver, type_stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ScalarPattern;
    use serde_json::json;

    fn nullable_string() -> AnyPattern {
        AnyPattern::nullable(Pattern::Scalar(ScalarPattern::String))
    }

    #[test]
    fn nullable_accepts_null_and_inner() {
        let resolver = Resolver::new();
        assert!(nullable_string().matches(&json!(null), &resolver).is_success());
        assert!(nullable_string().matches(&json!("x"), &resolver).is_success());
        let result = nullable_string().matches(&json!(1), &resolver);
        assert_eq!(result.report(), "Expected (string?), actual was 1 (number)");
    }

    #[test]
    fn generation_prefers_non_null() {
        let resolver = Resolver::new();
        assert_eq!(nullable_string().generate(&resolver).unwrap(), json!("sample"));
        assert_eq!(AnyPattern::new(vec![Pattern::Null]).generate(&resolver).unwrap(), json!(null));
        assert!(AnyPattern::new(vec![]).generate(&resolver).is_err());
    }

    #[test]
    fn recursive_arm_falls_back_to_null() {
        let resolver = Resolver::from_types([(
            "Node",
            crate::pattern::token::pattern_from_json(&json!({"id": "(number)", "next": "(Node?)"})).unwrap(),
        )]);
        let maybe_node = AnyPattern::nullable(Pattern::Lookup(crate::pattern::LookupPattern::new("Node")));
        let value = maybe_node.generate(&resolver).unwrap();
        assert!(maybe_node.matches(&value, &resolver).is_success());
        let mut depth = 0;
        let mut cursor = &value;
        while let Some(next) = cursor.get("next") {
            depth += 1;
            cursor = next;
        }
        assert_eq!(depth, crate::resolver::MAX_LOOKUP_DEPTH);
        assert_eq!(*cursor, json!(null));

        let required = Resolver::from_types([(
            "Node",
            crate::pattern::token::pattern_from_json(&json!({"next": "(Node)"})).unwrap(),
        )]);
        let maybe_node = AnyPattern::new(vec![Pattern::Lookup(crate::pattern::LookupPattern::new("Node"))]);
        assert!(maybe_node.generate(&required).unwrap_err().is_recursion_limit());
    }

    #[test]
    fn parse_picks_first_matching_arm() {
        let resolver = Resolver::new();
        assert_eq!(nullable_string().parse("null", &resolver).unwrap(), json!(null));
        assert_eq!(nullable_string().parse("hello", &resolver).unwrap(), json!("hello"));
        let number_or_bool = AnyPattern::new(vec![
            Pattern::Scalar(ScalarPattern::Number),
            Pattern::Scalar(ScalarPattern::Boolean),
        ]);
        assert_eq!(number_or_bool.parse("true", &resolver).unwrap(), json!(true));
        assert!(number_or_bool.parse("maybe", &resolver).is_err());
    }

    #[test]
    fn variants_list_every_arm() {
        let resolver = Resolver::new();
        let variants = nullable_string().compatibility_variants(&resolver).unwrap();
        assert_eq!(variants, vec![Pattern::Null, Pattern::Scalar(ScalarPattern::String)]);
    }

    #[test]
    fn type_names() {
        let either = AnyPattern::new(vec![
            Pattern::Scalar(ScalarPattern::Number),
            Pattern::Scalar(ScalarPattern::Boolean),
        ]);
        assert_eq!(either.type_name(), "(number or boolean)");
        assert_eq!(nullable_string().type_name(), "(string?)");
    }
}
