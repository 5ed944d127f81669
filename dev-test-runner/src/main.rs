//! Runs the JSON fixture cases under `fixtures/` against the engine.
//!
//! Usage: `dev-test-runner [NAME_REGEX]`
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use json_contract::compatibility::{check_pair, ContractVersion};
use json_contract::contract::{Contract, ContractDocument};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Fixture {
    contract: ContractDocument,
    #[serde(default)]
    valid: Vec<Value>,
    #[serde(default)]
    invalid: Vec<InvalidCase>,
    /// Expected number of generated payloads across all rows.
    #[serde(default)]
    generated_cases: Option<usize>,
    #[serde(default)]
    next_version: Option<NextVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InvalidCase {
    value: Value,
    /// Rendered breadcrumb path of the first failure.
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NextVersion {
    contract: ContractDocument,
    compatible: bool,
}

fn load_fixture(path: &Path) -> Result<Fixture, String> {
    let source = std::fs::read_to_string(path).map_err(|error| error.to_string())?;
    json_contract::path_de::from_str_with_path(&source).map_err(|error| error.to_string())
}

fn compile(document: &ContractDocument) -> Result<Contract, String> {
    document.compile().map_err(|error| error.to_string())
}

fn run_fixture(fixture: &Fixture) -> Result<(), String> {
    let contract = compile(&fixture.contract)?;

    for (index, value) in fixture.valid.iter().enumerate() {
        let result = contract.pattern.matches(value, &contract.resolver);
        if let Some(failure) = result.as_failure() {
            return Err(format!("valid[{index}] was rejected:\n{}", failure.report()));
        }
    }

    for (index, case) in fixture.invalid.iter().enumerate() {
        let result = contract.pattern.matches(&case.value, &contract.resolver);
        match result.as_failure() {
            None => return Err(format!("invalid[{index}] was accepted")),
            Some(failure) if failure.path() != case.path => {
                return Err(format!("invalid[{index}] failed at {:?}, expected {:?}", failure.path(), case.path));
            }
            Some(_) => {}
        }
    }

    let cases = json_contract::execution::plan(&contract.pattern, &contract.rows, &contract.resolver)
        .map_err(|error| error.to_string())?;
    if let Some(expected) = fixture.generated_cases {
        if cases.len() != expected {
            return Err(format!("generated {} payloads, expected {expected}", cases.len()));
        }
    }

    if let Some(next) = fixture.next_version.as_ref() {
        let newer = compile(&next.contract)?;
        let report = check_pair(
            &ContractVersion::new("current", contract.pattern.clone(), contract.resolver.clone()),
            &ContractVersion::new("next", newer.pattern, newer.resolver),
        )
        .map_err(|error| error.to_string())?;
        if report.is_compatible() != next.compatible {
            let reasons: Vec<String> = report.failures.iter().map(|failure| failure.report()).collect();
            return Err(format!(
                "next version compatible = {}, expected {}\n{}",
                report.is_compatible(),
                next.compatible,
                reasons.join("\n\n")
            ));
        }
    }

    Ok(())
}

fn fixture_paths() -> Vec<PathBuf> {
    let pattern = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/*.json");
    match glob::glob(pattern) {
        Ok(entries) => entries.filter_map(Result::ok).collect(),
        Err(error) => {
            eprintln!("bad fixture pattern {pattern}: {error}");
            Vec::new()
        }
    }
}

fn main() -> ExitCode {
    let filter = match std::env::args().nth(1).map(|raw| Regex::new(&raw)).transpose() {
        Ok(filter) => filter,
        Err(error) => {
            eprintln!("invalid filter: {error}");
            return ExitCode::from(2);
        }
    };

    let mut failed = 0usize;
    let mut ran = 0usize;
    for path in fixture_paths() {
        let name = path.file_stem().map(|stem| stem.to_string_lossy().to_string()).unwrap_or_default();
        if filter.as_ref().is_some_and(|filter| !filter.is_match(&name)) {
            continue;
        }
        ran += 1;
        match load_fixture(&path).and_then(|fixture| run_fixture(&fixture)) {
            Ok(()) => eprintln!("✅ {name}"),
            Err(error) => {
                failed += 1;
                eprintln!("❌ {name}: {error}");
            }
        }
    }

    eprintln!("{} of {ran} fixtures passed", ran - failed);
    match failed {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
