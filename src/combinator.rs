//! Expansion combinators over `field → pattern` maps.
//!
//! These are not tied to object schemas; any container-like pattern can use
//! them. Field order is the map's order everywhere, and the first field varies
//! slowest in every product.
use std::collections::HashSet;
use indexmap::IndexMap;

use crate::error::{ContractError, ContractResult, ErrorKind};
use crate::keys::UnexpectedKeyPolicy;
use crate::pattern::token::{is_optional, without_optionality};
use crate::pattern::{Pattern, TypeStack};
use crate::resolver::Resolver;
use crate::result::{Failure, MatchResult};
use crate::row::Row;

/// A variant that may stand for "null".
pub trait Variant: Clone {
    fn is_null_variant(&self) -> bool;
    fn null_variant() -> Self;
}

/// Every presence combination of `keys`.
///
/// Required keys are always present. Optional keys are present or absent,
/// unless the row has an example for them, in which case they are present.
pub fn key_sets(keys: &[String], row: &Row) -> Vec<Vec<String>> {
    keys.iter().fold(vec![Vec::new()], |sets, key| {
        let always = !is_optional(key) || row.contains_field(without_optionality(key));
        sets.into_iter()
            .flat_map(|set| {
                let mut with_key = set.clone();
                with_key.push(key.clone());
                match always {
                    true => vec![with_key],
                    false => vec![set, with_key],
                }
            })
            .collect()
    })
}

fn select<T: Clone>(map: &IndexMap<String, T>, keys: &[String]) -> IndexMap<String, T> {
    let keys: HashSet<&str> = keys.iter().map(String::as_str).collect();
    map.iter()
        .filter(|(key, _)| keys.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Run `creator` on every presence combination of `map` and flatten.
pub fn for_each_key_combination_in<T, U, F>(map: &IndexMap<String, T>, row: &Row, mut creator: F) -> ContractResult<Vec<U>>
where
    T: Clone,
    F: FnMut(IndexMap<String, T>) -> ContractResult<Vec<U>>,
{
    let keys: Vec<String> = map.keys().cloned().collect();
    let mut out = Vec::new();
    for key_set in key_sets(&keys, row) {
        out.extend(creator(select(map, &key_set))?);
    }
    Ok(out)
}

/// Like [`for_each_key_combination_in`] but with only two combinations:
/// every field, and only the required fields (just one if nothing is optional).
pub fn all_or_nothing_combination_in<T, U, F>(map: &IndexMap<String, T>, mut creator: F) -> ContractResult<Vec<U>>
where
    T: Clone,
    F: FnMut(IndexMap<String, T>) -> ContractResult<Vec<U>>,
{
    let mut out = creator(map.clone())?;
    if map.keys().any(|key| is_optional(key)) {
        let required: IndexMap<String, T> = map
            .iter()
            .filter(|(key, _)| !is_optional(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        out.extend(creator(required)?);
    }
    Ok(out)
}

fn no_variants(key: &str) -> ContractError {
    ContractError::new(ErrorKind::NoVariants { key: key.to_string() })
}

/// Cartesian product: one map per choice of one option for every key.
pub fn pattern_list<T: Clone>(collection: &IndexMap<String, Vec<T>>) -> ContractResult<Vec<IndexMap<String, T>>> {
    let mut product = vec![IndexMap::new()];
    for (key, options) in collection {
        if options.is_empty() {
            return Err(no_variants(key));
        }
        product = product
            .iter()
            .flat_map(|partial| {
                options.iter().map(move |option| {
                    let mut next = partial.clone();
                    next.insert(key.clone(), option.clone());
                    next
                })
            })
            .collect();
    }
    Ok(product)
}

fn is_nullable<T: Variant>(options: &[T]) -> bool {
    options.len() > 1 && options.iter().any(Variant::is_null_variant)
}

/// Bounded combination for compatibility checks.
///
/// Nullable keys (more than one option, one of them null) collapse together:
/// one map with all of them null and one with all of them at their first
/// non-null option. Every other key takes its first option. At most two maps
/// come out no matter how many keys are nullable.
pub fn pattern_values<T: Variant>(collection: &IndexMap<String, Vec<T>>) -> ContractResult<Vec<IndexMap<String, T>>> {
    if collection.is_empty() {
        return Ok(vec![IndexMap::new()]);
    }
    let pick = |nulls: bool| -> ContractResult<IndexMap<String, T>> {
        collection
            .iter()
            .map(|(key, options)| {
                let chosen = match is_nullable(options) {
                    true if nulls => Some(T::null_variant()),
                    true => options.iter().find(|option| !option.is_null_variant()).cloned(),
                    false => options.first().cloned(),
                };
                chosen.map(|chosen| (key.clone(), chosen)).ok_or_else(|| no_variants(key))
            })
            .collect()
    };
    match collection.values().any(|options| is_nullable(options)) {
        true => Ok(vec![pick(true)?, pick(false)?]),
        false => Ok(vec![pick(false)?]),
    }
}

/// Field-by-field `encompasses` for two `field → pattern` maps.
///
/// - a key required here must be required in `other`;
/// - a key required in `other` must be declared here, unless this side ignores
///   undeclared keys;
/// - every key present on both sides must be encompassed.
pub fn map_encompasses_map(
    this: &IndexMap<String, Pattern>,
    other: &IndexMap<String, Pattern>,
    this_resolver: &Resolver,
    other_resolver: &Resolver,
    unexpected_keys: UnexpectedKeyPolicy,
    type_stack: &TypeStack,
) -> MatchResult {
    if let Some(key) = this.keys().find(|key| !is_optional(key) && !other.contains_key(*key)) {
        let message = format!("Key \"{key}\" is required but the other schema allows it to be missing");
        return MatchResult::Failure(Failure::new(message).breadcrumb(key.as_str()));
    }

    if unexpected_keys == UnexpectedKeyPolicy::Reject {
        let undeclared = other
            .keys()
            .filter(|key| !is_optional(key))
            .find(|key| !this.contains_key(*key) && !this.contains_key(&format!("{key}?")));
        if let Some(key) = undeclared {
            let message = format!("Key \"{key}\" is required by the other schema but not declared here");
            return MatchResult::Failure(Failure::new(message).breadcrumb(key.as_str()));
        }
    }

    for (key, bigger) in this {
        let name = without_optionality(key);
        let smaller = other
            .get(key)
            .or_else(|| other.get(name))
            .or_else(|| other.get(&format!("{name}?")));
        if let Some(smaller) = smaller {
            let result = bigger.encompasses(smaller, this_resolver, other_resolver, type_stack).breadcrumb(name);
            if !result.is_success() {
                return result;
            }
        }
    }
    MatchResult::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum V {
        Null,
        Val(&'static str),
    }

    impl Variant for V {
        fn is_null_variant(&self) -> bool {
            matches!(self, V::Null)
        }
        fn null_variant() -> Self {
            V::Null
        }
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn collection(entries: Vec<(&str, Vec<V>)>) -> IndexMap<String, Vec<V>> {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn key_sets_enumerate_optional_presence() {
        let sets = key_sets(&keys(&["id", "a?", "b?"]), &Row::new());
        assert_eq!(
            sets,
            vec![keys(&["id"]), keys(&["id", "b?"]), keys(&["id", "a?"]), keys(&["id", "a?", "b?"])]
        );
    }

    #[test]
    fn row_examples_pin_optional_keys() {
        let row = Row::new().with_field("a", "1");
        let sets = key_sets(&keys(&["a?", "b?"]), &row);
        assert_eq!(sets, vec![keys(&["a?"]), keys(&["a?", "b?"])]);
        assert!(sets.iter().all(|set| set.contains(&"a?".to_string())));
    }

    #[test]
    fn empty_key_list_has_one_empty_set() {
        assert_eq!(key_sets(&[], &Row::new()), vec![Vec::<String>::new()]);
    }

    #[test]
    fn pattern_list_is_a_cartesian_product() {
        let product = pattern_list(&collection(vec![
            ("a", vec![V::Val("a1"), V::Val("a2")]),
            ("b", vec![V::Val("b1"), V::Val("b2"), V::Val("b3")]),
        ]))
        .unwrap();
        assert_eq!(product.len(), 6);
        assert_eq!(product[0]["a"], V::Val("a1"));
        assert_eq!(product[0]["b"], V::Val("b1"));
        assert_eq!(product[1]["b"], V::Val("b2"));
        assert_eq!(product[3]["a"], V::Val("a2"));
        assert!(product.iter().all(|m| m.keys().collect::<Vec<_>>() == ["a", "b"]));
    }

    #[test]
    fn pattern_list_rejects_empty_options() {
        let error = pattern_list(&collection(vec![("a", vec![])])).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::NoVariants { key: "a".into() });
        assert_eq!(pattern_list::<V>(&IndexMap::new()).unwrap(), vec![IndexMap::new()]);
    }

    #[test]
    fn nullable_keys_collapse_to_two_maps() {
        let values = pattern_values(&collection(vec![
            ("a", vec![V::Null, V::Val("a")]),
            ("b", vec![V::Val("b"), V::Null]),
            ("c", vec![V::Null, V::Val("c")]),
            ("d", vec![V::Val("d1"), V::Val("d2")]),
            ("e", vec![V::Val("e")]),
        ]))
        .unwrap();
        assert_eq!(values.len(), 2);
        let all_null = &values[0];
        let all_set = &values[1];
        assert_eq!((&all_null["a"], &all_null["b"], &all_null["c"]), (&V::Null, &V::Null, &V::Null));
        assert_eq!((&all_set["a"], &all_set["b"], &all_set["c"]), (&V::Val("a"), &V::Val("b"), &V::Val("c")));
        // multi-option non-nullable keys are not exploded
        assert_eq!(all_null["d"], V::Val("d1"));
        assert_eq!(all_set["d"], V::Val("d1"));
        assert_eq!(all_set["e"], V::Val("e"));
    }

    #[test]
    fn without_nullables_there_is_one_map() {
        let values = pattern_values(&collection(vec![("a", vec![V::Val("a1"), V::Val("a2")]), ("b", vec![V::Null])])).unwrap();
        let expected: IndexMap<String, V> = [("a".to_string(), V::Val("a1")), ("b".to_string(), V::Null)].into_iter().collect();
        assert_eq!(values, vec![expected]);
    }

    #[test]
    fn all_or_nothing_has_at_most_two_combinations() {
        let map: IndexMap<String, u8> = [("a".to_string(), 1), ("b?".to_string(), 2)].into_iter().collect();
        let seen = all_or_nothing_combination_in(&map, |subset| Ok(vec![subset.keys().cloned().collect::<Vec<_>>()])).unwrap();
        assert_eq!(seen, vec![keys(&["a", "b?"]), keys(&["a"])]);

        let required: IndexMap<String, u8> = [("a".to_string(), 1)].into_iter().collect();
        let seen = all_or_nothing_combination_in(&required, |subset| Ok(vec![subset.len()])).unwrap();
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn key_combinations_feed_the_creator() {
        let map: IndexMap<String, u8> = [("a?".to_string(), 1), ("b".to_string(), 2)].into_iter().collect();
        let sizes = for_each_key_combination_in(&map, &Row::new(), |subset| Ok(vec![subset.len()])).unwrap();
        assert_eq!(sizes, vec![1, 2]);
    }
}
