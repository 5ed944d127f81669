//! Hard-fail channel: broken contract files or example data.
//!
//! Structural mismatches are *not* errors; they are [`MatchResult`] values.
//! A [`ContractError`] aborts whatever expansion or generation produced it.
//!
//! [`MatchResult`]: crate::result::MatchResult
use std::fmt;
use thiserror::Error;

use crate::result::{render_path, Failure};

pub type ContractResult<T> = Result<T, ContractError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("Type {token} does not exist")]
    UnknownType { token: String },
    #[error("{text} is not a type")]
    NotAType { text: String },
    #[error("Type {token} is an alias of itself")]
    CyclicAlias { token: String },
    #[error("Type {token} was expanded more than {limit} levels deep")]
    RecursionLimit { token: String, limit: usize },
    #[error("Expected {expected}, actual was \"{actual}\"")]
    Parse { expected: String, actual: String },
    #[error("Invalid JSON: {0}")]
    Json(String),
    #[error("No variants could be produced for key \"{key}\"")]
    NoVariants { key: String },
    #[error("{0}")]
    Mismatch(Failure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractError {
    kind: ErrorKind,
    context: Vec<String>,
    breadcrumbs: Vec<String>,
}

impl ContractError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, context: Vec::new(), breadcrumbs: Vec::new() }
    }

    pub fn parse(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse { expected: expected.into(), actual: actual.into() })
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn breadcrumbs(&self) -> &[String] {
        &self.breadcrumbs
    }

    /// Prepend an outer path segment.
    pub fn breadcrumb(mut self, segment: impl Into<String>) -> Self {
        self.breadcrumbs.insert(0, segment.into());
        self
    }

    /// Prepend an outer explanation line.
    pub fn context(mut self, message: impl Into<String>) -> Self {
        self.context.insert(0, message.into());
        self
    }

    pub fn is_recursion_limit(&self) -> bool {
        matches!(self.kind, ErrorKind::RecursionLimit { .. })
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.breadcrumbs.is_empty() {
            write!(f, ">> {}\n\n", render_path(&self.breadcrumbs))?;
        }
        for line in &self.context {
            writeln!(f, "{line}")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ContractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<ErrorKind> for ContractError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<Failure> for ContractError {
    fn from(failure: Failure) -> Self {
        Self::new(ErrorKind::Mismatch(failure))
    }
}

/// Run `f`, attaching `breadcrumb` to any error it raises.
pub fn attempt<T>(breadcrumb: &str, f: impl FnOnce() -> ContractResult<T>) -> ContractResult<T> {
    f().map_err(|error| error.breadcrumb(breadcrumb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_path_then_context_then_cause() {
        let error = ContractError::parse("number", "abc")
            .context("Format error in example of \"age\"")
            .breadcrumb("age")
            .breadcrumb("person");
        assert_eq!(
            error.to_string(),
            ">> person.age\n\nFormat error in example of \"age\"\nExpected number, actual was \"abc\""
        );
    }

    #[test]
    fn attempt_only_touches_errors() {
        let ok: ContractResult<u8> = attempt("field", || Ok(1));
        assert_eq!(ok, Ok(1));
        let err: ContractResult<u8> = attempt("field", || Err(ErrorKind::Json("eof".into()).into()));
        assert_eq!(err.unwrap_err().breadcrumbs(), ["field"]);
    }
}
