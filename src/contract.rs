//! Contract documents.
//!
//! ```json
//! {
//!   "types": { "Address": { "street": "(string)", "flat?": "(number)" } },
//!   "pattern": { "id": "(number)", "address": "(Address)" },
//!   "examples": [ { "id": "10" } ]
//! }
//! ```
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{attempt, ContractResult};
use crate::pattern::token::pattern_from_json;
use crate::pattern::Pattern;
use crate::resolver::Resolver;
use crate::row::Row;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDocument {
    /// Named types, keyed by bare name.
    #[serde(default)]
    pub types: IndexMap<String, Value>,
    pub pattern: Value,
    #[serde(default)]
    pub examples: Vec<Map<String, Value>>,
}

/// A contract ready to use: root pattern, the types it refers to and its example rows.
#[derive(Debug, Clone)]
pub struct Contract {
    pub pattern: Pattern,
    pub resolver: Resolver,
    pub rows: Vec<Row>,
}

impl ContractDocument {
    pub fn parse(src: &str) -> ContractResult<Self> {
        crate::path_de::from_str_with_path(src)
    }

    pub fn pattern(&self) -> ContractResult<Pattern> {
        attempt("pattern", || pattern_from_json(&self.pattern))
    }

    /// Object types are tagged with their name.
    pub fn resolver(&self) -> ContractResult<Resolver> {
        let types = self
            .types
            .iter()
            .map(|(name, definition)| {
                let pattern = attempt(name, || pattern_from_json(definition))?;
                let pattern = match pattern {
                    Pattern::Tabular(tabular) => Pattern::Tabular(tabular.with_type_alias(name)),
                    other => other,
                };
                Ok((name.clone(), pattern))
            })
            .collect::<ContractResult<Vec<_>>>()
            .map_err(|error| error.breadcrumb("types"))?;
        Ok(Resolver::from_types(types))
    }

    pub fn rows(&self) -> Vec<Row> {
        self.examples.iter().map(Row::from_json_object).collect()
    }

    pub fn compile(&self) -> ContractResult<Contract> {
        Ok(Contract { pattern: self.pattern()?, resolver: self.resolver()?, rows: self.rows() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn document() -> ContractDocument {
        ContractDocument::parse(
            &json!({
                "types": {
                    "Address": {"street": "(string)", "flat?": "(number)"},
                    "Id": "(number)"
                },
                "pattern": {"id": "(Id)", "address": "(Address)", "tags": ["(string)"]},
                "examples": [{"id": "10"}, {"id": 11}]
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn documents_compile_into_patterns_types_and_rows() {
        let contract = document().compile().unwrap();
        let value = json!({"id": 1, "address": {"street": "Main"}, "tags": ["a", "b"]});
        assert!(contract.pattern.matches(&value, &contract.resolver).is_success());
        assert_eq!(contract.rows.len(), 2);
        assert_eq!(contract.rows[1].get_field("id"), Some("11"));
    }

    #[test]
    fn object_types_carry_their_name() {
        let resolver = document().resolver().unwrap();
        let address = resolver.get_pattern("(Address)").unwrap();
        assert_eq!(address.type_alias(), Some("Address"));
        assert_eq!(resolver.get_pattern("(Id)").unwrap().type_alias(), None);
    }

    #[test]
    fn unknown_sections_are_rejected_with_their_path() {
        let error = ContractDocument::parse(r#"{"pattern": {}, "exampels": []}"#).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Json(_)));
    }

    #[test]
    fn bad_type_definitions_name_the_type() {
        let document = ContractDocument::parse(r#"{"types": {"Bad": "(no such)"}, "pattern": "(Bad)"}"#).unwrap();
        let error = document.resolver().unwrap_err();
        assert_eq!(error.breadcrumbs(), ["types", "Bad"]);
    }
}
