//! Example rows: per-test-case overrides keyed by field name.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name (without optionality marker) → raw example text.
///
/// The text is either a literal, parsed by the field's own pattern, or a
/// pattern token such as `(Address)` naming a type to use instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.insert(name.into(), text.into());
        self
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Build from a JSON object: strings are taken verbatim, anything else
    /// keeps its JSON text (`10`, `true`, `{"a":1}`).
    pub fn from_json_object(map: &serde_json::Map<String, Value>) -> Self {
        map.iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), text)
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_rows_keep_scalars_as_text() {
        let source = json!({"id": 10, "name": "Jane", "active": true, "tag": null});
        let row = Row::from_json_object(source.as_object().unwrap());
        assert_eq!(row.get_field("id"), Some("10"));
        assert_eq!(row.get_field("name"), Some("Jane"));
        assert_eq!(row.get_field("active"), Some("true"));
        assert_eq!(row.get_field("tag"), Some("null"));
        assert_eq!(row.columns().collect::<Vec<_>>(), ["id", "name", "active", "tag"]);
    }

    #[test]
    fn missing_fields_are_absent() {
        let row = Row::new().with_field("status", "\"active\"");
        assert!(row.contains_field("status"));
        assert!(!row.contains_field("status?"));
        assert_eq!(row.get_field("other"), None);
    }
}
