//! Backward-compatibility checks between contract versions.
//!
//! A newer version is compatible with an older one when every compatibility
//! variant of the older root pattern is encompassed by the newer one.
use rayon::prelude::*;

use crate::error::ContractResult;
use crate::pattern::{Pattern, TypeStack};
use crate::resolver::Resolver;
use crate::result::{Failure, MatchResult};

#[derive(Debug, Clone)]
pub struct ContractVersion {
    pub label: String,
    pub pattern: Pattern,
    pub resolver: Resolver,
}

impl ContractVersion {
    pub fn new(label: impl Into<String>, pattern: Pattern, resolver: Resolver) -> Self {
        Self { label: label.into(), pattern, resolver }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub older: String,
    pub newer: String,
    pub variants_checked: usize,
    pub failures: Vec<Failure>,
}

impl PairReport {
    pub fn is_compatible(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn check_pair(older: &ContractVersion, newer: &ContractVersion) -> ContractResult<PairReport> {
    let variants = older.pattern.compatibility_variants(&older.resolver)?;
    let failures: Vec<Failure> = variants
        .iter()
        .filter_map(|variant| {
            match newer.pattern.encompasses(variant, &newer.resolver, &older.resolver, &TypeStack::new()) {
                MatchResult::Success => None,
                MatchResult::Failure(failure) => Some(failure),
            }
        })
        .collect();
    tracing::debug!(
        older = %older.label,
        newer = %newer.label,
        variants = variants.len(),
        failures = failures.len(),
        "checked contract pair"
    );
    Ok(PairReport {
        older: older.label.clone(),
        newer: newer.label.clone(),
        variants_checked: variants.len(),
        failures,
    })
}

/// Check each consecutive pair, oldest first. Reports come back in chain order.
pub fn check_version_chain(versions: &[ContractVersion]) -> ContractResult<Vec<PairReport>> {
    versions
        .par_windows(2)
        .map(|pair| check_pair(&pair[0], &pair[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::token::pattern_from_json;
    use serde_json::json;

    fn version(label: &str, schema: serde_json::Value) -> ContractVersion {
        ContractVersion::new(label, pattern_from_json(&schema).unwrap(), Resolver::new())
    }

    #[test]
    fn adding_an_optional_field_is_compatible() {
        let v1 = version("v1", json!({"id": "(number)"}));
        let v2 = version("v2", json!({"id": "(number)", "nick?": "(string)"}));
        let report = check_pair(&v1, &v2).unwrap();
        assert!(report.is_compatible());
        assert_eq!(report.variants_checked, 1);
    }

    #[test]
    fn adding_a_required_field_is_not() {
        let v1 = version("v1", json!({"id": "(number)"}));
        let v2 = version("v2", json!({"id": "(number)", "nick": "(string)"}));
        let report = check_pair(&v1, &v2).unwrap();
        assert!(!report.is_compatible());
        assert_eq!(report.failures[0].breadcrumbs(), ["nick"]);
    }

    #[test]
    fn narrowing_a_nullable_field_is_caught() {
        let v1 = version("v1", json!({"name": "(string?)"}));
        let v2 = version("v2", json!({"name": "(string)"}));
        let report = check_pair(&v1, &v2).unwrap();
        assert_eq!(report.variants_checked, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(check_pair(&v2, &v1).unwrap().is_compatible());
    }

    #[test]
    fn chains_report_each_step_in_order() {
        let versions = vec![
            version("v1", json!({"id": "(number)"})),
            version("v2", json!({"id": "(number)", "tag?": "(string)"})),
            version("v3", json!({"id": "(string)", "tag?": "(string)"})),
        ];
        let reports = check_version_chain(&versions).unwrap();
        let steps: Vec<_> = reports.iter().map(|r| (r.older.as_str(), r.newer.as_str(), r.is_compatible())).collect();
        assert_eq!(steps, [("v1", "v2", true), ("v2", "v3", false)]);
        assert!(check_version_chain(&versions[..1]).unwrap().is_empty());
    }

    fn linked_list(label: &str, next: &str) -> ContractVersion {
        ContractVersion::new(
            label,
            pattern_from_json(&json!("(Node)")).unwrap(),
            Resolver::from_types([("Node", pattern_from_json(&json!({"id": "(number)", "next": next})).unwrap())]),
        )
    }

    #[test]
    fn nullable_self_references_compare_finitely() {
        let nullable = linked_list("v1", "(Node?)");
        let required = linked_list("v2", "(Node)");
        let report = check_pair(&nullable, &nullable).unwrap();
        assert!(report.is_compatible());
        assert_eq!(report.variants_checked, 2);

        let report = check_pair(&nullable, &required).unwrap();
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].breadcrumbs(), ["next"]);
        assert_eq!(report.failures[1].breadcrumbs(), ["next", "next"]);
    }

    #[test]
    fn named_types_are_resolved_on_their_own_side() {
        let older = ContractVersion::new(
            "v1",
            pattern_from_json(&json!({"home": "(Address)"})).unwrap(),
            Resolver::from_types([("Address", pattern_from_json(&json!({"street": "(string)"})).unwrap())]),
        );
        let newer = ContractVersion::new(
            "v2",
            pattern_from_json(&json!({"home": "(Address)"})).unwrap(),
            Resolver::from_types([("Address", pattern_from_json(&json!({"street": "(string)", "zip?": "(string)"})).unwrap())]),
        );
        assert!(check_pair(&older, &newer).unwrap().is_compatible());
        assert!(check_pair(&newer, &older).unwrap().is_compatible());
    }
}
