use serde_json::Value;

use crate::error::{attempt, ContractResult};
use crate::pattern::{Pattern, TypeStack};
use crate::resolver::Resolver;
use crate::result::MatchResult;
use crate::row::Row;

/// Homogeneous array: every element matches the same pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPattern {
    item: Box<Pattern>,
}

impl ListPattern {
    pub fn new(item: Pattern) -> Self {
        Self { item: Box::new(item) }
    }

    pub fn item(&self) -> &Pattern {
        &self.item
    }

    pub fn type_name(&self) -> String {
        format!("list of {}", self.item.type_name())
    }

    pub fn matches(&self, value: &Value, resolver: &Resolver) -> MatchResult {
        let Value::Array(items) = value else {
            return MatchResult::mismatch("json array", value);
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| resolver.matches_pattern(None, &self.item, item).breadcrumb(format!("[{index}]")))
            .find(|result| !result.is_success())
            .unwrap_or(MatchResult::Success)
    }

    pub fn generate(&self, resolver: &Resolver) -> ContractResult<Value> {
        let item = attempt("[0]", || resolver.generate(None, &self.item))?;
        Ok(Value::Array(vec![item]))
    }

    pub fn new_based_on(&self, row: &Row, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        let items = attempt("[]", || self.item.new_based_on(row, resolver))?;
        Ok(items.into_iter().map(|item| Pattern::List(Self::new(item))).collect())
    }

    pub fn compatibility_variants(&self, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        let items = attempt("[]", || self.item.compatibility_variants(resolver))?;
        Ok(items.into_iter().map(|item| Pattern::List(Self::new(item))).collect())
    }

    pub fn encompasses(
        &self,
        other: &Pattern,
        this_resolver: &Resolver,
        other_resolver: &Resolver,
        type_stack: &TypeStack,
    ) -> MatchResult {
        match other {
            Pattern::List(that) => self
                .item
                .encompasses(&that.item, this_resolver, other_resolver, type_stack)
                .breadcrumb("[]"),
            Pattern::Exact(exact) => {
                exact.fits_within(std::slice::from_ref(&Pattern::List(self.clone())), this_resolver)
            }
            other => MatchResult::failure(format!("Expected {}, got {}", self.type_name(), other.type_name())),
        }
    }
}
