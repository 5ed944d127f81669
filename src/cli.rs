//! CLI: validate payloads, generate test payloads, check compatibility.
use std::path::{Path, PathBuf};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand, Args};
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::compatibility::{check_version_chain, ContractVersion, PairReport};
use crate::config::{ProjectConfig, Settings};
use crate::contract::{Contract, ContractDocument};
use crate::execution::TestCase;
use crate::row::Row;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check JSON payloads against contracts, generate test payloads from examples and verify backward compatibility
#[derive(Parser, Debug)]
#[command(name = "json-contract", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// match JSON documents against a contract
    Validate(ValidateCmd),
    /// expand each contract's examples into concrete test payloads
    Generate(GenerateCmd),
    /// check that each contract version is backward compatible with the one before it
    Compat(CompatCmd),
}

#[derive(Args, Debug, Clone)]
struct ContractSettings {
    /// Contract files, oldest first. May be literal paths or quoted glob patterns.
    /// When omitted, `contractPaths` from ./json-contract.json is used.
    #[arg(num_args = 0..)]
    contracts: Vec<String>,

    /// verify backward compatibility across the given versions first
    #[arg(long = "check-backward-compatibility", short = 'c', alias = "check", default_value_t = false)]
    check_backward_compatibility: bool,

    /// JSON array of example rows used instead of each contract's own examples
    #[arg(long)]
    examples: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ValidateCmd {
    /// contract to validate against
    #[arg(long)]
    contract: String,

    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct GenerateCmd {
    #[command(flatten)]
    contract_settings: ContractSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct CompatCmd {
    #[command(flatten)]
    contract_settings: ContractSettings,
}

#[derive(Debug, Serialize)]
struct GeneratedContract {
    contract: String,
    cases: Vec<TestCase>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ContractSettings {
    fn settings(&self) -> anyhow::Result<Settings> {
        let given = Settings {
            contract_paths: self.contracts.clone(),
            check_backward_compatibility: self.check_backward_compatibility,
            examples_path: self.examples.clone(),
        };
        if !given.contract_paths.is_empty() {
            return Ok(given);
        }
        let project = ProjectConfig::discover(Path::new("."))?
            .map(|(path, config)| config.into_settings(path.parent().unwrap_or(Path::new("."))));
        let settings = given.merge(project);
        if settings.contract_paths.is_empty() {
            bail!("no contracts given and no {} with contractPaths found", crate::config::CONFIG_FILE_NAME);
        }
        Ok(settings)
    }
}

impl InputSettings {
    fn load_process(&self, mut apply: impl FnMut(String, Value)) -> anyhow::Result<()> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("Failed to read source file: {source_path_str}"))?;
            let documents: Vec<(String, &str)> = match self.ndjson {
                true => source
                    .lines()
                    .enumerate()
                    .filter(|(_, line)| !line.trim().is_empty())
                    .map(|(index, line)| (format!("{source_path_str}:{}", index + 1), line))
                    .collect(),
                false => vec![(source_path_str.clone(), source.as_str())],
            };
            for (label, text) in documents {
                let json_value = serde_json::from_str::<Value>(text)
                    .with_context(|| format!("Failed to parse JSON source file ({label})"))?;
                let json_value = match self.json_pointer.as_deref() {
                    None => json_value,
                    Some(pointer) => json_value
                        .pointer(pointer)
                        .cloned()
                        .with_context(|| format!("JSON pointer {pointer} selects nothing in {label}"))?,
                };
                apply(label, json_value);
            }
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `Ok(false)` when the run completed but found mismatches or incompatibilities.
    pub fn run(&self) -> anyhow::Result<bool> {
        match &self.cmd {
            Command::Validate(target) => {
                let contract = load_contract(&target.contract)?;
                let mut failures = 0usize;
                let mut total = 0usize;
                target.input_settings.load_process(|label, value| {
                    total += 1;
                    let result = contract.pattern.matches(&value, &contract.resolver);
                    match result.as_failure() {
                        None => println!("{} {label}", "✔".green()),
                        Some(failure) => {
                            failures += 1;
                            println!("{} {label}\n{}\n", "✘".red(), indent(&failure.report()));
                        }
                    }
                })?;
                eprintln!("{} of {total} documents matched", total - failures);
                Ok(failures == 0)
            }
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(true)
                }

                let settings = target.contract_settings.settings()?;
                let contracts = load_contracts(&settings)?;
                if settings.check_backward_compatibility && !print_compatibility(&contracts)? {
                    return Ok(false);
                }
                let override_rows = match settings.examples_path.as_deref() {
                    Some(path) => Some(load_rows(path)?),
                    None => None,
                };
                let mut generated = Vec::new();
                for (path, contract) in &contracts {
                    let rows = override_rows.as_deref().unwrap_or(&contract.rows[..]);
                    let cases = crate::execution::plan(&contract.pattern, rows, &contract.resolver)
                        .with_context(|| format!("Failed to generate test payloads for {path}"))?;
                    eprintln!("{} {path}: {} payloads", "✔".green(), cases.len());
                    generated.push(GeneratedContract { contract: path.clone(), cases });
                }
                let output = serde_json::to_string_pretty(&generated)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &output)?;
                } else {
                    println!("{output}");
                }
                Ok(true)
            }
            Command::Compat(target) => {
                let settings = target.contract_settings.settings()?;
                let contracts = load_contracts(&settings)?;
                if contracts.len() < 2 {
                    bail!("compatibility needs at least two contract versions, got {}", contracts.len());
                }
                print_compatibility(&contracts)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_contract(path: &str) -> anyhow::Result<Contract> {
    let source = std::fs::read_to_string(path).with_context(|| format!("Failed to read contract: {path}"))?;
    let contract = ContractDocument::parse(&source)
        .and_then(|document| document.compile())
        .with_context(|| format!("Invalid contract: {path}"))?;
    Ok(contract)
}

fn load_contracts(settings: &Settings) -> anyhow::Result<Vec<(String, Contract)>> {
    resolve_file_path_patterns(&settings.contract_paths)
        .context("failed to resolve contract paths")?
        .into_iter()
        .map(|path| {
            let path = path.to_string_lossy().to_string();
            load_contract(&path).map(|contract| (path, contract))
        })
        .collect()
}

fn load_rows(path: &Path) -> anyhow::Result<Vec<Row>> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read examples: {}", path.display()))?;
    let rows: Vec<Map<String, Value>> = crate::path_de::from_slice_with_path(&bytes)
        .with_context(|| format!("Invalid examples: {}", path.display()))?;
    Ok(rows.iter().map(Row::from_json_object).collect())
}

fn print_compatibility(contracts: &[(String, Contract)]) -> anyhow::Result<bool> {
    let versions: Vec<ContractVersion> = contracts
        .iter()
        .map(|(path, contract)| ContractVersion::new(path.clone(), contract.pattern.clone(), contract.resolver.clone()))
        .collect();
    let reports = check_version_chain(&versions)?;
    for report in &reports {
        print_pair_report(report);
    }
    Ok(reports.iter().all(PairReport::is_compatible))
}

fn print_pair_report(report: &PairReport) {
    let heading = format!("{} → {} ({} variants)", report.older, report.newer, report.variants_checked);
    if report.is_compatible() {
        println!("{} {heading}", "✔".green());
        return;
    }
    println!("{} {heading}", "✘".red());
    for failure in &report.failures {
        println!("{}\n", indent(&failure.report()));
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n")
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
