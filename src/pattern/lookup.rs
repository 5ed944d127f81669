use serde_json::Value;

use crate::error::ContractResult;
use crate::pattern::token::as_pattern_token;
use crate::pattern::{Pattern, TypeStack};
use crate::resolver::Resolver;
use crate::result::MatchResult;
use crate::row::Row;

/// Reference to a named type, e.g. `(Address)`, resolved on every use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPattern {
    token: String,
}

impl LookupPattern {
    /// Accepts either `Address` or `(Address)`.
    pub fn new(name: &str) -> Self {
        Self { token: as_pattern_token(name) }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn resolve(&self, resolver: &Resolver) -> ContractResult<Pattern> {
        resolver.get_pattern(&self.token)
    }

    pub fn matches(&self, value: &Value, resolver: &Resolver) -> MatchResult {
        match self.resolve(resolver) {
            Ok(pattern) => pattern.matches(value, resolver),
            Err(error) => MatchResult::failure(error.to_string()),
        }
    }

    pub fn generate(&self, resolver: &Resolver) -> ContractResult<Value> {
        let inner = resolver.enter(&self.token)?;
        self.resolve(&inner)?.generate(&inner)
    }

    pub fn parse(&self, text: &str, resolver: &Resolver) -> ContractResult<Value> {
        self.resolve(resolver)?.parse(text, resolver)
    }

    /// A type that is already being expanded further up stays a reference,
    /// so recursive types expand one level and the variant count stays finite.
    pub fn new_based_on(&self, row: &Row, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        if resolver.is_expanding(&self.token) {
            return Ok(vec![Pattern::Lookup(self.clone())]);
        }
        let inner = resolver.enter(&self.token)?;
        self.resolve(&inner)?.new_based_on(row, &inner)
    }

    pub fn compatibility_variants(&self, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        if resolver.is_expanding(&self.token) {
            return Ok(vec![Pattern::Lookup(self.clone())]);
        }
        let inner = resolver.enter(&self.token)?;
        self.resolve(&inner)?.compatibility_variants(&inner)
    }

    /// Named-vs-named comparisons are recorded on the type stack; meeting the
    /// same pair again means the definitions are mutually recursive and the
    /// comparison in progress already covers it.
    pub fn encompasses(
        &self,
        other: &Pattern,
        this_resolver: &Resolver,
        other_resolver: &Resolver,
        type_stack: &TypeStack,
    ) -> MatchResult {
        let resolved = match self.resolve(this_resolver) {
            Ok(pattern) => pattern,
            Err(error) => return MatchResult::failure(error.to_string()),
        };
        match other {
            Pattern::Lookup(that) => {
                if type_stack.contains(&self.token, &that.token) {
                    tracing::trace!(this = %self.token, other = %that.token, "recursive type comparison short-circuited");
                    return MatchResult::Success;
                }
                let type_stack = type_stack.with(&self.token, &that.token);
                resolved.encompasses(other, this_resolver, other_resolver, &type_stack)
            }
            _ => resolved.encompasses(other, this_resolver, other_resolver, type_stack),
        }
    }
}
