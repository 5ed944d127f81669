use crate::error::ContractResult;
use crate::pattern::Pattern;
use crate::resolver::Resolver;
use crate::row::Row;

/// A pattern that takes its row example from an explicitly named column.
///
/// Everything except example lookup is delegated to the wrapped pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedPattern {
    pattern: Box<Pattern>,
    key: Option<String>,
}

impl KeyedPattern {
    pub fn new(pattern: Pattern, key: Option<&str>) -> Self {
        Self { pattern: Box::new(pattern), key: key.map(str::to_string) }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn new_based_on(&self, row: &Row, resolver: &Resolver) -> ContractResult<Vec<Pattern>> {
        match &self.key {
            Some(key) => crate::pattern::tabular::new_based_on_field(row, key, &self.pattern, resolver),
            None => self.pattern.new_based_on(row, resolver),
        }
    }
}
