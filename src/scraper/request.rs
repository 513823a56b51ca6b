use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs for scraping one header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeRequest {
    pub header: PathBuf,
    /// Declarations to traverse
    pub included_names: Vec<String>,
    /// Declarations to drop even if reachable
    pub excluded_names: Vec<String>,
    pub include_directories: Vec<PathBuf>,
    /// `NAME` or `NAME=VALUE`; platform macros belong here, never in the invoker
    pub defined_macros: Vec<String>,
}

impl ScrapeRequest {
    pub fn new(header: impl Into<PathBuf>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    pub fn include_name(mut self, name: impl Into<String>) -> Self {
        self.included_names.push(name.into());
        self
    }

    pub fn exclude_name(mut self, name: impl Into<String>) -> Self {
        self.excluded_names.push(name.into());
        self
    }

    pub fn include_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_directories.push(dir.into());
        self
    }

    pub fn define_macro(mut self, definition: impl Into<String>) -> Self {
        self.defined_macros.push(definition.into());
        self
    }

    /// Load a request kept alongside a native library's headers
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .context(format!("Failed to read scrape request: {}", path.display()))?;
        serde_json::from_str(&data)
            .context(format!("Failed to parse scrape request: {}", path.display()))
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_names.iter().any(|n| n == name)
    }
}
