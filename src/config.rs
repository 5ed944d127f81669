//! Project file and run settings.
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ContractResult;

pub const CONFIG_FILE_NAME: &str = "json-contract.json";

/// `json-contract.json`, read when no contract paths are given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Literal paths or glob patterns, relative to the project file.
    pub contract_paths: Vec<String>,
    pub check_backward_compatibility: bool,
    /// Rows that replace every contract's own examples.
    pub examples_path: Option<String>,
}

impl ProjectConfig {
    pub fn parse(src: &str) -> ContractResult<Self> {
        crate::path_de::from_str_with_path(src)
    }

    /// `None` when `dir` has no project file.
    pub fn discover(dir: &Path) -> anyhow::Result<Option<(PathBuf, Self)>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        let src = std::fs::read_to_string(&path)?;
        let config = Self::parse(&src).map_err(|error| anyhow::anyhow!("{}: {error}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded project file");
        Ok(Some((path, config)))
    }

    /// Paths in the project file are relative to the directory holding it.
    pub fn into_settings(self, base: &Path) -> Settings {
        let relative = |raw: String| match Path::new(&raw).is_absolute() {
            true => raw,
            false => base.join(raw).to_string_lossy().into_owned(),
        };
        Settings {
            contract_paths: self.contract_paths.into_iter().map(relative).collect(),
            check_backward_compatibility: self.check_backward_compatibility,
            examples_path: self.examples_path.map(|raw| PathBuf::from(relative(raw))),
        }
    }
}

/// Everything a run needs, passed explicitly to each command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub contract_paths: Vec<String>,
    pub check_backward_compatibility: bool,
    pub examples_path: Option<PathBuf>,
}

impl Settings {
    /// Command-line values win; the project file fills in what is missing.
    pub fn merge(self, project: Option<Settings>) -> Settings {
        let Some(project) = project else { return self };
        Settings {
            contract_paths: match self.contract_paths.is_empty() {
                true => project.contract_paths,
                false => self.contract_paths,
            },
            check_backward_compatibility: self.check_backward_compatibility || project.check_backward_compatibility,
            examples_path: self.examples_path.or(project.examples_path),
        }
    }
}
