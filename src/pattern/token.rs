//! Lexical conventions shared by contract authors, rows and the engine.
//!
//! - `(name)` is a pattern token; anything else is literal text.
//! - `?` after a token name means nullable, `*` means list; they compose left to right.
//! - `?` after a *field* name marks the field optional.
//! - `...` as a field name switches an object to ignore undeclared keys.
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{ContractError, ContractResult, ErrorKind};
use crate::pattern::{AnyPattern, ExactValuePattern, ListPattern, LookupPattern, Pattern, ScalarPattern, TabularPattern};

pub const OPTIONALITY_MARKER: char = '?';
pub const WILDCARD_KEY: &str = "...";
pub const NULL_TOKEN: &str = "(null)";

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(\s*(?P<name>[A-Za-z_][A-Za-z0-9_.\-]*)\s*(?P<suffix>[?*]*)\s*\)$")
        .expect("token regex is valid")
});

pub fn is_optional(key: &str) -> bool {
    key.ends_with(OPTIONALITY_MARKER)
}

pub fn without_optionality(key: &str) -> &str {
    key.strip_suffix(OPTIONALITY_MARKER).unwrap_or(key)
}

pub fn is_pattern_token(text: &str) -> bool {
    let text = text.trim();
    text.len() >= 2 && text.starts_with('(') && text.ends_with(')')
}

/// `Address` → `(Address)`; tokens are returned unchanged.
pub fn as_pattern_token(name: &str) -> String {
    match is_pattern_token(name) {
        true => name.trim().to_string(),
        false => format!("({})", name.trim()),
    }
}

fn builtin(name: &str) -> Option<Pattern> {
    match name {
        "string" => Some(Pattern::Scalar(ScalarPattern::String)),
        "number" => Some(Pattern::Scalar(ScalarPattern::Number)),
        "boolean" => Some(Pattern::Scalar(ScalarPattern::Boolean)),
        "null" => Some(Pattern::Null),
        _ => None,
    }
}

/// Built-in patterns for a token, `None` when the base name is user-defined
/// and carries no suffix (plain named types resolve through the resolver).
pub fn builtin_pattern(token: &str) -> Option<Pattern> {
    let caps = TOKEN.captures(token.trim())?;
    let name = &caps["name"];
    let suffix = &caps["suffix"];
    if suffix.is_empty() {
        return builtin(name);
    }
    let base = builtin(name).unwrap_or_else(|| Pattern::Lookup(LookupPattern::new(name)));
    Some(apply_suffixes(base, suffix))
}

fn apply_suffixes(base: Pattern, suffix: &str) -> Pattern {
    suffix.chars().fold(base, |pattern, marker| match marker {
        '*' => Pattern::List(ListPattern::new(pattern)),
        _ => Pattern::Any(AnyPattern::nullable(pattern)),
    })
}

/// Parse a pattern token into its pattern; unknown names become lookups.
pub fn parsed_pattern(token: &str) -> ContractResult<Pattern> {
    let caps = TOKEN
        .captures(token.trim())
        .ok_or_else(|| ContractError::new(ErrorKind::NotAType { text: token.to_string() }))?;
    let name = &caps["name"];
    let base = builtin(name).unwrap_or_else(|| Pattern::Lookup(LookupPattern::new(name)));
    Ok(apply_suffixes(base, &caps["suffix"]))
}

/// Infer a pattern from a single cell of text (table-style contracts).
pub fn json_pattern_from_text(text: &str) -> ContractResult<Pattern> {
    let trimmed = text.trim();
    if let Some(number) = crate::value::number_value(trimmed) {
        return Ok(Pattern::Exact(ExactValuePattern::new(number)));
    }
    if let Some(inner) = crate::value::unquote(trimmed) {
        return Ok(Pattern::Exact(ExactValuePattern::new(Value::String(inner.to_string()))));
    }
    match trimmed {
        "null" => Ok(Pattern::Exact(ExactValuePattern::new(Value::Null))),
        "true" => Ok(Pattern::Exact(ExactValuePattern::new(Value::Bool(true)))),
        "false" => Ok(Pattern::Exact(ExactValuePattern::new(Value::Bool(false)))),
        _ if trimmed.starts_with('{') || trimmed.starts_with('[') => {
            let value: Value = serde_json::from_str(trimmed)
                .map_err(|error| ContractError::new(ErrorKind::Json(error.to_string())))?;
            pattern_from_json(&value)
        }
        _ if is_pattern_token(trimmed) => parsed_pattern(trimmed),
        _ => Ok(Pattern::Exact(ExactValuePattern::new(Value::String(trimmed.to_string())))),
    }
}

/// Pattern described by a JSON document.
///
/// Objects become object schemas, a one-element array is a list of that
/// element, token strings are types, and everything else is a literal.
pub fn pattern_from_json(value: &Value) -> ContractResult<Pattern> {
    match value {
        Value::Object(map) => {
            let fields = map
                .iter()
                .map(|(key, value)| {
                    crate::error::attempt(key, || pattern_from_json(value)).map(|pattern| (key.clone(), pattern))
                })
                .collect::<ContractResult<IndexMap<_, _>>>()?;
            Ok(Pattern::Tabular(TabularPattern::new(fields)))
        }
        Value::Array(items) if items.len() == 1 => {
            let item = crate::error::attempt("[0]", || pattern_from_json(&items[0]))?;
            Ok(Pattern::List(ListPattern::new(item)))
        }
        Value::String(text) if is_pattern_token(text) => parsed_pattern(text),
        other => Ok(Pattern::Exact(ExactValuePattern::new(other.clone()))),
    }
}

/// Object schema from `(field name, cell text)` rows.
pub fn tabular_from_rows<'a, I>(rows: I, type_alias: Option<&str>) -> ContractResult<TabularPattern>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let fields = rows
        .into_iter()
        .map(|(name, cell)| {
            crate::error::attempt(name, || json_pattern_from_text(cell)).map(|pattern| (name.to_string(), pattern))
        })
        .collect::<ContractResult<IndexMap<_, _>>>()?;
    let pattern = TabularPattern::new(fields);
    Ok(match type_alias {
        Some(alias) => pattern.with_type_alias(alias),
        None => pattern,
    })
}
