//! The pattern engine.
//!
//! A [`Pattern`] is one node of a contract: it can check a value (`matches`),
//! produce one (`generate`), read example text (`parse`), expand itself into
//! concrete-leaning variants (`new_based_on` for test generation,
//! `compatibility_variants` for version checks) and decide whether another
//! pattern is a narrowing of itself (`encompasses`).
//!
//! Named types are never embedded; a [`LookupPattern`] holds the name and the
//! [`Resolver`] is consulted on every traversal, so cyclic type graphs are just
//! names pointing at names.
pub mod any;
pub mod exact;
pub mod keyed;
pub mod list;
pub mod lookup;
pub mod scalar;
pub mod tabular;
pub mod token;

use std::collections::BTreeSet;
use serde_json::Value;

pub use any::AnyPattern;
pub use exact::ExactValuePattern;
pub use keyed::KeyedPattern;
pub use list::ListPattern;
pub use lookup::LookupPattern;
pub use scalar::ScalarPattern;
pub use tabular::TabularPattern;

use crate::combinator::Variant;
use crate::error::{ContractError, ContractResult};
use crate::resolver::Resolver;
use crate::result::MatchResult;
use crate::row::Row;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Tabular(TabularPattern),
    Exact(ExactValuePattern),
    List(ListPattern),
    Any(AnyPattern),
    Lookup(LookupPattern),
    Keyed(KeyedPattern),
    Scalar(ScalarPattern),
    Null,
}

/// Named-type pairs currently being compared by `encompasses`.
///
/// Passed by value down the recursion; meeting a pair twice means the two
/// definitions recurse into each other and the comparison is already underway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeStack(BTreeSet<(String, String)>);

impl TypeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, this: &str, other: &str) -> bool {
        self.0.contains(&(this.to_string(), other.to_string()))
    }

    pub fn with(&self, this: &str, other: &str) -> Self {
        let mut next = self.clone();
        next.0.insert((this.to_string(), other.to_string()));
        next
    }
}

impl Variant for Pattern {
    fn is_null_variant(&self) -> bool {
        matches!(self, Pattern::Null)
    }

    fn null_variant() -> Self {
        Pattern::Null
    }
}

impl Pattern {
    pub fn matches(&self, value: &Value, resolver: &Resolver) -> MatchResult {
        match self {
            Self::Tabular(p) => p.matches(value, resolver),
            Self::Exact(p) => p.matches(value),
            Self::List(p) => p.matches(value, resolver),
            Self::Any(p) => p.matches(value, resolver),
            Self::Lookup(p) => p.matches(value, resolver),
            Self::Keyed(p) => p.pattern().matches(value, resolver),
            Self::Scalar(p) => p.matches(value),
            Self::Null => match value {
                Value::Null => MatchResult::Success,
                other => MatchResult::mismatch("null", other),
            },
        }
    }

    pub fn generate(&self, resolver: &Resolver) -> ContractResult<Value> {
        match self {
            Self::Tabular(p) => p.generate(resolver),
            Self::Exact(p) => Ok(p.value().clone()),
            Self::List(p) => p.generate(resolver),
            Self::Any(p) => p.generate(resolver),
            Self::Lookup(p) => p.generate(resolver),
            Self::Keyed(p) => p.pattern().generate(resolver),
            Self::Scalar(p) => Ok(p.generate()),
            Self::Null => Ok(Value::Null),
        }
    }

    /// Read example text as a value of this pattern's kind. The result is not
    /// matched; callers decide whether a non-matching value is an error.
    pub fn parse(&self, text: &str, resolver: &Resolver) -> ContractResult<Value> {
        match self {
            Self::Tabular(_) => parse_json(text, "json object").and_then(|value| match value {
                Value::Object(_) => Ok(value),
                _ => Err(ContractError::parse("json object", text)),
            }),
            Self::Exact(p) => p.parse(text),
            Self::List(_) => parse_json(text, "json array").and_then(|value| match value {
                Value::Array(_) => Ok(value),
                _ => Err(ContractError::parse("json array", text)),
            }),
            Self::Any(p) => p.parse(text, resolver),
            Self::Lookup(p) => p.parse(text, resolver),
            Self::Keyed(p) => p.pattern().parse(text, resolver),
            Self::Scalar(p) => p.parse(text),
            Self::Null => match text.trim() {
                "" | "null" => Ok(Value::Null),
                _ => Err(ContractError::parse("null", text)),
            },
        }
    }

    /// Variants for test execution, honouring the row's example overrides.
    pub fn new_based_on(&self, row: &Row, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        match self {
            Self::Tabular(p) => p.new_based_on(row, resolver),
            Self::List(p) => p.new_based_on(row, resolver),
            Self::Any(p) => p.new_based_on(row, resolver),
            Self::Lookup(p) => p.new_based_on(row, resolver),
            Self::Keyed(p) => p.new_based_on(row, resolver),
            Self::Exact(_) | Self::Scalar(_) | Self::Null => Ok(vec![self.clone()]),
        }
    }

    /// The bounded variant set used for backward-compatibility checks.
    pub fn compatibility_variants(&self, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        match self {
            Self::Tabular(p) => p.compatibility_variants(resolver),
            Self::List(p) => p.compatibility_variants(resolver),
            Self::Any(p) => p.compatibility_variants(resolver),
            Self::Lookup(p) => p.compatibility_variants(resolver),
            Self::Keyed(p) => p.pattern().compatibility_variants(resolver),
            Self::Exact(_) | Self::Scalar(_) | Self::Null => Ok(vec![self.clone()]),
        }
    }

    /// Does every value accepted by `other` also satisfy `self`?
    pub fn encompasses(
        &self,
        other: &Pattern,
        this_resolver: &Resolver,
        other_resolver: &Resolver,
        type_stack: &TypeStack,
    ) -> MatchResult {
        match (self, other) {
            (Self::Lookup(this), _) => this.encompasses(other, this_resolver, other_resolver, type_stack),
            (_, Self::Lookup(that)) => match that.resolve(other_resolver) {
                Ok(resolved) => self.encompasses(&resolved, this_resolver, other_resolver, type_stack),
                Err(error) => MatchResult::failure(error.to_string()),
            },
            (Self::Keyed(this), _) => this.pattern().encompasses(other, this_resolver, other_resolver, type_stack),
            (_, Self::Keyed(that)) => self.encompasses(that.pattern(), this_resolver, other_resolver, type_stack),
            (Self::Any(this), _) => this.encompasses(other, this_resolver, other_resolver, type_stack),
            (_, Self::Any(that)) => that
                .arms()
                .iter()
                .map(|arm| self.encompasses(arm, this_resolver, other_resolver, type_stack))
                .find(|result| !result.is_success())
                .unwrap_or(MatchResult::Success),
            (Self::Tabular(this), _) => this.encompasses(other, this_resolver, other_resolver, type_stack),
            (Self::Exact(this), _) => this.encompasses(other),
            (Self::List(this), _) => this.encompasses(other, this_resolver, other_resolver, type_stack),
            (Self::Scalar(this), _) => this.encompasses(other),
            (Self::Null, Self::Null) => MatchResult::Success,
            (Self::Null, Self::Exact(exact)) if exact.value().is_null() => MatchResult::Success,
            (Self::Null, _) => MatchResult::failure(format!("Expected null, got {}", other.type_name())),
        }
    }

    /// Succeeds when every shape of `self` is encompassed by one of `others`.
    pub fn fits_within(
        &self,
        others: &[Pattern],
        this_resolver: &Resolver,
        other_resolver: &Resolver,
        type_stack: &TypeStack,
    ) -> MatchResult {
        if let Self::Exact(exact) = self {
            return exact.fits_within(others, other_resolver);
        }
        for mine in self.pattern_set(this_resolver) {
            let mut first_failure = None;
            let mut fits = false;
            for other in others {
                match other.encompasses(&mine, other_resolver, this_resolver, type_stack) {
                    MatchResult::Success => {
                        fits = true;
                        break;
                    }
                    failure => {
                        first_failure.get_or_insert(failure);
                    }
                }
            }
            if !fits {
                return first_failure.unwrap_or_else(|| MatchResult::failure("No matching patterns"));
            }
        }
        MatchResult::Success
    }

    /// The alternatives this pattern stands for (a union's arms, otherwise itself).
    ///
    /// Named types stay as references unless they name a union, so comparisons
    /// between them still go through the type stack.
    pub fn pattern_set(&self, resolver: &Resolver) -> Vec<Pattern> {
        let mut seen = Vec::new();
        self.collect_pattern_set(resolver, &mut seen)
    }

    fn collect_pattern_set(&self, resolver: &Resolver, seen: &mut Vec<String>) -> Vec<Pattern> {
        match self {
            Self::Any(p) => p.arms().iter().flat_map(|arm| arm.collect_pattern_set(resolver, seen)).collect(),
            Self::Lookup(p) if !seen.iter().any(|token| token == p.token()) => match p.resolve(resolver) {
                Ok(union @ Self::Any(_)) => {
                    seen.push(p.token().to_string());
                    union.collect_pattern_set(resolver, seen)
                }
                _ => vec![self.clone()],
            },
            Self::Keyed(p) => p.pattern().collect_pattern_set(resolver, seen),
            _ => vec![self.clone()],
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Self::Tabular(_) => "json object".to_string(),
            Self::Exact(p) => p.type_name(),
            Self::List(p) => p.type_name(),
            Self::Any(p) => p.type_name(),
            Self::Lookup(p) => p.token().to_string(),
            Self::Keyed(p) => p.pattern().type_name(),
            Self::Scalar(p) => p.type_name().to_string(),
            Self::Null => "null".to_string(),
        }
    }

    /// Display name for generated output and diagnostics.
    pub fn type_alias(&self) -> Option<&str> {
        match self {
            Self::Tabular(p) => p.type_alias(),
            Self::Keyed(p) => p.pattern().type_alias(),
            _ => None,
        }
    }

    /// Row column this pattern takes its example from, when it differs from the field name.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Keyed(p) => p.key(),
            _ => None,
        }
    }
}

fn parse_json(text: &str, expected: &str) -> ContractResult<Value> {
    serde_json::from_str(text.trim()).map_err(|_| ContractError::parse(expected, text))
}
