//! Missing / unexpected key detection for object schemas.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::pattern::token::{is_optional, without_optionality};
use crate::result::{Failure, MatchResult};

/// What an object schema does with keys it does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnexpectedKeyPolicy {
    #[default]
    Reject,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    Missing(String),
    Unexpected(String),
}

impl UnexpectedKeyPolicy {
    /// First key of `actual` that `expected` neither declares plainly nor as optional.
    pub fn check<P>(self, expected: &IndexMap<String, P>, actual: &Map<String, Value>) -> Option<KeyError> {
        match self {
            Self::Ignore => None,
            Self::Reject => actual
                .keys()
                .find(|key| !expected.contains_key(*key) && !expected.contains_key(&format!("{key}?")))
                .map(|key| KeyError::Unexpected(key.clone())),
        }
    }
}

impl KeyError {
    pub fn name(&self) -> &str {
        match self {
            Self::Missing(name) | Self::Unexpected(name) => name,
        }
    }

    pub fn into_result(self) -> MatchResult {
        let message = match &self {
            Self::Missing(name) => format!("Expected key named \"{name}\" was missing"),
            Self::Unexpected(name) => format!("Key named \"{name}\" was unexpected"),
        };
        MatchResult::Failure(Failure::new(message).breadcrumb(self.name()))
    }
}

pub fn is_missing_key(actual: &Map<String, Value>, key: &str) -> bool {
    !is_optional(key) && !actual.contains_key(key)
}

/// First required key of `expected` (in declaration order) absent from `actual`,
/// otherwise whatever the unexpected-key policy reports.
pub fn find_key_error<P>(
    expected: &IndexMap<String, P>,
    actual: &Map<String, Value>,
    policy: UnexpectedKeyPolicy,
) -> Option<KeyError> {
    expected
        .keys()
        .find(|key| is_missing_key(actual, key))
        .map(|key| KeyError::Missing(without_optionality(key).to_string()))
        .or_else(|| policy.check(expected, actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected(keys: &[&str]) -> IndexMap<String, ()> {
        keys.iter().map(|k| (k.to_string(), ())).collect()
    }

    #[test]
    fn first_missing_required_key_wins() {
        let actual = json!({"name": "x"});
        let error = find_key_error(&expected(&["id", "name", "age"]), actual.as_object().unwrap(), UnexpectedKeyPolicy::Reject);
        assert_eq!(error, Some(KeyError::Missing("id".into())));
    }

    #[test]
    fn optional_keys_may_be_absent_but_still_count_as_declared() {
        let actual = json!({"id": 1, "nick": "y"});
        let error = find_key_error(&expected(&["id", "nick?", "age?"]), actual.as_object().unwrap(), UnexpectedKeyPolicy::Reject);
        assert_eq!(error, None);
    }

    #[test]
    fn unexpected_keys_follow_policy() {
        let actual = json!({"id": 1, "extra": true});
        let keys = expected(&["id"]);
        let map = actual.as_object().unwrap();
        assert_eq!(find_key_error(&keys, map, UnexpectedKeyPolicy::Reject), Some(KeyError::Unexpected("extra".into())));
        assert_eq!(find_key_error(&keys, map, UnexpectedKeyPolicy::Ignore), None);
    }

    #[test]
    fn key_errors_render_with_breadcrumb() {
        let result = KeyError::Missing("id".into()).into_result();
        let failure = result.as_failure().unwrap();
        assert_eq!(failure.breadcrumbs(), ["id"]);
        assert_eq!(failure.message(), "Expected key named \"id\" was missing");
    }
}
