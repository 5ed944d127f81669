//! Outcome of a structural match or compatibility check.
use std::fmt;
use serde_json::Value;

/// Recoverable outcome: the data (or the other schema) did not fit.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Success,
    Failure(Failure),
}

/// Mismatch message plus the path (outermost first) to where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    message: String,
    breadcrumbs: Vec<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), breadcrumbs: Vec::new() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn breadcrumbs(&self) -> &[String] {
        &self.breadcrumbs
    }

    /// Prepend an outer path segment; the message is untouched.
    pub fn breadcrumb(mut self, segment: impl Into<String>) -> Self {
        self.breadcrumbs.insert(0, segment.into());
        self
    }

    /// `a.b[0].c` style rendering of the breadcrumbs.
    pub fn path(&self) -> String {
        render_path(&self.breadcrumbs)
    }

    pub fn report(&self) -> String {
        match self.breadcrumbs.is_empty() {
            true => self.message.clone(),
            false => format!(">> {}\n\n{}", self.path(), self.message),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

impl MatchResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(Failure::new(message))
    }

    /// `Expected <expected>, actual was <value>`.
    pub fn mismatch(expected: impl fmt::Display, actual: &Value) -> Self {
        Self::failure(format!(
            "Expected {expected}, actual was {} ({})",
            crate::value::display(actual),
            crate::value::type_name(actual),
        ))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn breadcrumb(self, segment: impl Into<String>) -> Self {
        match self {
            Self::Success => Self::Success,
            Self::Failure(failure) => Self::Failure(failure.breadcrumb(segment)),
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Self::Success => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Empty for success.
    pub fn report(&self) -> String {
        self.as_failure().map(Failure::report).unwrap_or_default()
    }
}

pub(crate) fn render_path(segments: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        if !out.is_empty() && !segment.starts_with('[') {
            out.push('.');
        }
        out.push_str(segment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn breadcrumbs_accumulate_outer_to_inner() {
        let result = MatchResult::failure("Expected number")
            .breadcrumb("[2]")
            .breadcrumb("items")
            .breadcrumb("order");
        let failure = result.as_failure().unwrap();
        assert_eq!(failure.breadcrumbs(), ["order", "items", "[2]"]);
        assert_eq!(failure.path(), "order.items[2]");
        assert_eq!(failure.message(), "Expected number");
        assert_eq!(failure.report(), ">> order.items[2]\n\nExpected number");
    }

    #[test]
    fn success_ignores_breadcrumbs() {
        assert_eq!(MatchResult::Success.breadcrumb("x"), MatchResult::Success);
        assert_eq!(MatchResult::Success.report(), "");
    }

    #[test]
    fn mismatch_names_both_sides() {
        let result = MatchResult::mismatch("json object", &json!("abc"));
        assert_eq!(result.report(), "Expected json object, actual was \"abc\" (string)");
    }
}
