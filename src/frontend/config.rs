use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::TranslationFlags;

/// Library-independent frontend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Compiler driver used for the parse step
    pub clang_path: PathBuf,
    /// Bindings generator used for the generation step
    pub generator_path: PathBuf,
    pub language: String,
    pub standard: String,
    /// Fixed flags appended after language and standard
    pub extra_arguments: Vec<String>,
    pub translation_flags: TranslationFlags,
    /// Parent of per-scrape scratch directories (system temp dir if unset)
    pub scratch_root: Option<PathBuf>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            clang_path: PathBuf::from("clang"),
            generator_path: PathBuf::from("ClangSharpPInvokeGenerator"),
            language: "c++".to_string(),
            standard: "c++17".to_string(),
            extra_arguments: vec!["-Wno-pragma-once-outside-header".to_string()],
            translation_flags: TranslationFlags::default(),
            scratch_root: None,
        }
    }
}

impl FrontendConfig {
    /// Load settings from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .context(format!("Failed to read frontend config: {}", path.display()))?;
        serde_json::from_str(&data)
            .context(format!("Failed to parse frontend config: {}", path.display()))
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}
