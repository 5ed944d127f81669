//! Turning a contract and its example rows into concrete test payloads.
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ContractError, ContractResult};
use crate::pattern::Pattern;
use crate::resolver::Resolver;
use crate::result::MatchResult;
use crate::row::Row;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    /// Index of the row the case came from.
    pub row: usize,
    /// Index of the variant within that row.
    pub variant: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_alias: Option<String>,
    pub payload: Value,
}

/// One test case per variant per row, in row order then variant order.
///
/// Every generated payload is matched against the pattern it came from; a
/// payload that does not match its own variant is a hard error.
pub fn plan(pattern: &Pattern, rows: &[Row], resolver: &Resolver) -> ContractResult<Vec<TestCase>> {
    let empty = [Row::new()];
    let rows = match rows.is_empty() {
        true => &empty[..],
        false => rows,
    };
    let planned = rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| plan_row(index, pattern, row, resolver))
        .collect::<ContractResult<Vec<_>>>()?;
    Ok(planned.into_iter().flatten().collect())
}

fn plan_row(index: usize, pattern: &Pattern, row: &Row, resolver: &Resolver) -> ContractResult<Vec<TestCase>> {
    let variants = pattern
        .new_based_on(row, resolver)
        .map_err(|error| error.context(format!("In example row {index}")))?;
    tracing::debug!(row = index, columns = ?row.columns().collect::<Vec<_>>(), variants = variants.len(), "planned example row");
    variants
        .iter()
        .enumerate()
        .map(|(position, variant)| {
            let payload = variant.generate(resolver)?;
            if let MatchResult::Failure(failure) = variant.matches(&payload, resolver) {
                return Err(ContractError::from(failure).context(format!("Generated payload for example row {index} does not match its own schema")));
            }
            Ok(TestCase {
                row: index,
                variant: position,
                type_alias: variant.type_alias().map(str::to_string),
                payload,
            })
        })
        .collect()
}
