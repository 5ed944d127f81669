//! Named-type lookup and the evaluation context patterns run under.
use std::sync::Arc;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{ContractError, ContractResult, ErrorKind};
use crate::keys::{KeyError, UnexpectedKeyPolicy};
use crate::pattern::token::{as_pattern_token, builtin_pattern, is_pattern_token, NULL_TOKEN};
use crate::pattern::Pattern;
use crate::result::MatchResult;

/// How many times one named type may be generated inside itself before it is
/// treated as unbounded.
pub const MAX_LOOKUP_DEPTH: usize = 8;

/// Read-only snapshot of named types.
///
/// Cloning is cheap: the named types are shared, only the small overlay of
/// extra bindings (such as the `(null)` type) and the lookup trail are copied.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    types: Arc<IndexMap<String, Pattern>>,
    overlay: IndexMap<String, Pattern>,
    trail: Vec<String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names may be given bare (`Address`) or as tokens (`(Address)`).
    pub fn from_types<I, K>(types: I) -> Self
    where
        I: IntoIterator<Item = (K, Pattern)>,
        K: AsRef<str>,
    {
        let types = types
            .into_iter()
            .map(|(name, pattern)| (as_pattern_token(name.as_ref()), pattern))
            .collect();
        Self { types: Arc::new(types), ..Self::default() }
    }

    /// A new resolver with one more binding layered on top.
    pub fn with_pattern(&self, name: &str, pattern: Pattern) -> Self {
        let mut next = self.clone();
        next.overlay.insert(as_pattern_token(name), pattern);
        next
    }

    /// A resolver that also knows the `(null)` type.
    pub fn with_null_pattern(&self) -> Self {
        match self.overlay.contains_key(NULL_TOKEN) {
            true => self.clone(),
            false => self.with_pattern(NULL_TOKEN, Pattern::Null),
        }
    }

    pub fn has_null_pattern(&self) -> bool {
        self.overlay.contains_key(NULL_TOKEN)
    }

    /// Resolve a token to a concrete pattern, following alias chains.
    pub fn get_pattern(&self, token: &str) -> ContractResult<Pattern> {
        if !is_pattern_token(token) {
            return Err(ContractError::new(ErrorKind::NotAType { text: token.to_string() }));
        }
        let mut seen: Vec<String> = Vec::new();
        let mut current = token.trim().to_string();
        loop {
            let found = self
                .overlay
                .get(&current)
                .or_else(|| self.types.get(&current))
                .cloned()
                .or_else(|| builtin_pattern(&current));
            match found {
                Some(Pattern::Lookup(next)) => {
                    seen.push(current);
                    if seen.iter().any(|name| name == next.token()) {
                        return Err(ContractError::new(ErrorKind::CyclicAlias { token: next.token().to_string() }));
                    }
                    current = next.token().to_string();
                }
                Some(pattern) => return Ok(pattern),
                None => return Err(ContractError::new(ErrorKind::UnknownType { token: current })),
            }
        }
    }

    /// Is `token` already being expanded further up the current path?
    pub fn is_expanding(&self, token: &str) -> bool {
        self.trail.iter().any(|name| name == token)
    }

    /// Record that `token` is being expanded; fails once the same type has
    /// been entered [`MAX_LOOKUP_DEPTH`] times on the current path.
    pub fn enter(&self, token: &str) -> ContractResult<Resolver> {
        let depth = self.trail.iter().filter(|name| *name == token).count();
        if depth >= MAX_LOOKUP_DEPTH {
            return Err(ContractError::new(ErrorKind::RecursionLimit {
                token: token.to_string(),
                limit: MAX_LOOKUP_DEPTH,
            }));
        }
        let mut next = self.clone();
        next.trail.push(token.to_string());
        Ok(next)
    }

    pub fn find_key_error<P>(
        &self,
        expected: &IndexMap<String, P>,
        actual: &Map<String, Value>,
        policy: UnexpectedKeyPolicy,
    ) -> Option<KeyError> {
        crate::keys::find_key_error(expected, actual, policy)
    }

    pub fn matches_pattern(&self, key: Option<&str>, pattern: &Pattern, value: &Value) -> MatchResult {
        let result = pattern.matches(value, self);
        if let Some(failure) = result.as_failure() {
            tracing::trace!(key = ?key, pattern = %pattern.type_name(), reason = failure.message(), "value did not match");
        }
        result
    }

    pub fn generate(&self, key: Option<&str>, pattern: &Pattern) -> ContractResult<Value> {
        tracing::trace!(key = ?key, pattern = %pattern.type_name(), "generating value");
        pattern.generate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{LookupPattern, ScalarPattern};

    #[test]
    fn augmentation_leaves_the_base_untouched() {
        let base = Resolver::from_types([("Id", Pattern::Scalar(ScalarPattern::Number))]);
        let augmented = base.with_null_pattern();
        assert!(!base.has_null_pattern());
        assert!(augmented.has_null_pattern());
        assert_eq!(augmented.get_pattern("(Id)").unwrap(), Pattern::Scalar(ScalarPattern::Number));
        assert_eq!(augmented.get_pattern(NULL_TOKEN).unwrap(), Pattern::Null);
    }

    #[test]
    fn builtins_and_named_types_resolve() {
        let resolver = Resolver::from_types([("(Name)", Pattern::Scalar(ScalarPattern::String))]);
        assert_eq!(resolver.get_pattern("(Name)").unwrap(), Pattern::Scalar(ScalarPattern::String));
        assert_eq!(resolver.get_pattern("(number)").unwrap(), Pattern::Scalar(ScalarPattern::Number));
        assert!(matches!(resolver.get_pattern("(Name?)").unwrap(), Pattern::Any(_)));
        let error = resolver.get_pattern("(Other)").unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::UnknownType { token: "(Other)".into() });
        let error = resolver.get_pattern("Name").unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::NotAType { text: "Name".into() });
    }

    #[test]
    fn alias_chains_are_followed_and_cycles_reported() {
        let resolver = Resolver::from_types([
            ("A", Pattern::Lookup(LookupPattern::new("B"))),
            ("B", Pattern::Scalar(ScalarPattern::Boolean)),
            ("X", Pattern::Lookup(LookupPattern::new("Y"))),
            ("Y", Pattern::Lookup(LookupPattern::new("X"))),
        ]);
        assert_eq!(resolver.get_pattern("(A)").unwrap(), Pattern::Scalar(ScalarPattern::Boolean));
        let error = resolver.get_pattern("(X)").unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::CyclicAlias { .. }));
    }

    #[test]
    fn entering_a_type_is_bounded() {
        let mut resolver = Resolver::new();
        for _ in 0..MAX_LOOKUP_DEPTH {
            resolver = resolver.enter("(Node)").unwrap();
        }
        assert!(resolver.enter("(Node)").unwrap_err().is_recursion_limit());
        assert!(resolver.enter("(Other)").is_ok());
        assert!(resolver.is_expanding("(Node)"));
        assert!(!resolver.is_expanding("(Other)"));
    }
}
