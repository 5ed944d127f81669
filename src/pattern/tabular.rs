//! Object schemas: an ordered `field → pattern` map.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::combinator::{
    all_or_nothing_combination_in, for_each_key_combination_in, map_encompasses_map, pattern_list, pattern_values,
};
use crate::error::{attempt, ContractResult};
use crate::keys::UnexpectedKeyPolicy;
use crate::pattern::token::{is_optional, is_pattern_token, without_optionality, WILDCARD_KEY};
use crate::pattern::{ExactValuePattern, Pattern, TypeStack};
use crate::resolver::Resolver;
use crate::result::MatchResult;
use crate::row::Row;

#[derive(Debug, Clone, PartialEq)]
pub struct TabularPattern {
    fields: IndexMap<String, Pattern>,
    unexpected_keys: UnexpectedKeyPolicy,
    type_alias: Option<String>,
}

impl TabularPattern {
    /// A `...` key in `fields` makes the schema ignore undeclared keys; the key
    /// itself is not kept.
    pub fn new(mut fields: IndexMap<String, Pattern>) -> Self {
        let unexpected_keys = match fields.shift_remove(WILDCARD_KEY) {
            Some(_) => UnexpectedKeyPolicy::Ignore,
            None => UnexpectedKeyPolicy::Reject,
        };
        Self { fields, unexpected_keys, type_alias: None }
    }

    pub fn with_type_alias(mut self, alias: &str) -> Self {
        self.type_alias = Some(alias.to_string());
        self
    }

    pub fn fields(&self) -> &IndexMap<String, Pattern> {
        &self.fields
    }

    pub fn unexpected_keys(&self) -> UnexpectedKeyPolicy {
        self.unexpected_keys
    }

    pub fn type_alias(&self) -> Option<&str> {
        self.type_alias.as_deref()
    }

    /// Same policy and alias, different fields.
    fn with_fields(&self, fields: IndexMap<String, Pattern>) -> Self {
        Self { fields, unexpected_keys: self.unexpected_keys, type_alias: self.type_alias.clone() }
    }

    pub fn matches(&self, value: &Value, resolver: &Resolver) -> MatchResult {
        let Value::Object(actual) = value else {
            return MatchResult::mismatch("json object", value);
        };
        let resolver = resolver.with_null_pattern();
        if let Some(key_error) = resolver.find_key_error(&self.fields, actual, self.unexpected_keys) {
            return key_error.into_result();
        }
        for (key, pattern) in &self.fields {
            let name = without_optionality(key);
            let Some(sample) = actual.get(name) else { continue };
            let result = resolver.matches_pattern(Some(name), pattern, sample);
            if !result.is_success() {
                return result.breadcrumb(name);
            }
        }
        MatchResult::Success
    }

    /// Every declared field is generated, optional ones included. An optional
    /// field whose type recurses without bound is left out instead.
    pub fn generate(&self, resolver: &Resolver) -> ContractResult<Value> {
        let resolver = resolver.with_null_pattern();
        let mut object = Map::new();
        for (key, pattern) in &self.fields {
            let name = without_optionality(key);
            match attempt(name, || resolver.generate(Some(name), pattern)) {
                Ok(value) => {
                    object.insert(name.to_string(), value);
                }
                Err(error) if is_optional(key) && error.is_recursion_limit() => {
                    tracing::debug!(field = name, "recursive optional field left out of generated value");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(Value::Object(object))
    }

    /// Variants for test execution: every presence combination of the
    /// optional fields (fields with a row example are always present), then
    /// the Cartesian product of each field's own variants.
    pub fn new_based_on(&self, row: &Row, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        let resolver = resolver.with_null_pattern();
        let variants = for_each_key_combination_in(&self.fields, row, |subset| new_based_on_fields(&subset, row, &resolver))?;
        tracing::debug!(alias = ?self.type_alias, fields = self.fields.len(), variants = variants.len(), "expanded object schema for row");
        Ok(variants.into_iter().map(|fields| Pattern::Tabular(self.with_fields(fields))).collect())
    }

    /// Variants for compatibility checks: all fields, then required fields
    /// only, each combined with nullable collapsing.
    pub fn compatibility_variants(&self, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        let resolver = resolver.with_null_pattern();
        let variants = all_or_nothing_combination_in(&self.fields, |subset| compatibility_fields(&subset, &resolver))?;
        tracing::debug!(alias = ?self.type_alias, fields = self.fields.len(), variants = variants.len(), "expanded object schema for compatibility");
        Ok(variants.into_iter().map(|fields| Pattern::Tabular(self.with_fields(fields))).collect())
    }

    pub fn encompasses(
        &self,
        other: &Pattern,
        this_resolver: &Resolver,
        other_resolver: &Resolver,
        type_stack: &TypeStack,
    ) -> MatchResult {
        let this_resolver = this_resolver.with_null_pattern();
        let other_resolver = other_resolver.with_null_pattern();
        match other {
            Pattern::Exact(exact) => Pattern::Exact(exact.clone()).fits_within(
                std::slice::from_ref(&Pattern::Tabular(self.clone())),
                &other_resolver,
                &this_resolver,
                type_stack,
            ),
            Pattern::Tabular(that) => map_encompasses_map(
                &self.fields,
                &that.fields,
                &this_resolver,
                &other_resolver,
                self.unexpected_keys,
                type_stack,
            ),
            other => MatchResult::failure(format!("Expected tabular json type, got {}", other.type_name())),
        }
    }
}

fn new_based_on_fields(
    fields: &IndexMap<String, Pattern>,
    row: &Row,
    resolver: &Resolver,
) -> ContractResult<Vec<IndexMap<String, Pattern>>> {
    let collection = fields
        .iter()
        .map(|(key, pattern)| {
            attempt(without_optionality(key), || new_based_on_field(row, key, pattern, resolver))
                .map(|variants| (key.clone(), variants))
        })
        .collect::<ContractResult<IndexMap<_, _>>>()?;
    pattern_list(&collection)
}

fn compatibility_fields(fields: &IndexMap<String, Pattern>, resolver: &Resolver) -> ContractResult<Vec<IndexMap<String, Pattern>>> {
    let collection = fields
        .iter()
        .map(|(key, pattern)| {
            attempt(without_optionality(key), || pattern.compatibility_variants(resolver))
                .map(|variants| (key.clone(), variants))
        })
        .collect::<ContractResult<IndexMap<_, _>>>()?;
    pattern_values(&collection)
}

/// Variants of one field given the row.
///
/// - a token example (`(Name)`) must be encompassed by the field's pattern
///   and is expanded in its place;
/// - a literal example is parsed and matched by the field's pattern and
///   becomes the only variant;
/// - without an example the field's pattern expands itself.
pub(crate) fn new_based_on_field(row: &Row, key: &str, pattern: &Pattern, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
    let column = without_optionality(pattern.key().unwrap_or(key));
    let Some(example) = row.get_field(column) else {
        return pattern.new_based_on(row, resolver);
    };

    if is_pattern_token(example) {
        let example_pattern = resolver.get_pattern(example)?;
        tracing::trace!(field = column, example, "row names a type for field");
        return match pattern.encompasses(&example_pattern, resolver, resolver, &TypeStack::new()) {
            MatchResult::Success => example_pattern.new_based_on(row, resolver),
            MatchResult::Failure(failure) => Err(failure.into()),
        };
    }

    let value = pattern
        .parse(example, resolver)
        .map_err(|error| error.context(format!("Format error in example of \"{column}\"")))?;
    match pattern.matches(&value, resolver) {
        MatchResult::Success => Ok(vec![Pattern::Exact(ExactValuePattern::new(value))]),
        MatchResult::Failure(failure) => Err(failure.into()),
    }
}
