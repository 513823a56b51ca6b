use std::path::PathBuf;

use super::FrontendConfig;

/// A preprocessor definition given as `NAME` or `NAME=VALUE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    pub value: Option<String>,
}

impl MacroDefinition {
    pub fn parse(text: &str) -> Self {
        match text.split_once('=') {
            Some((name, value)) => Self {
                name: name.trim().to_string(),
                value: Some(value.to_string()),
            },
            None => Self {
                name: text.trim().to_string(),
                value: None,
            },
        }
    }

    /// Collapse repeated names; the last value wins but keeps the first slot
    pub fn dedupe<'a>(definitions: impl IntoIterator<Item = &'a str>) -> Vec<Self> {
        let mut merged: Vec<Self> = Vec::new();
        for definition in definitions.into_iter().map(Self::parse) {
            match merged.iter_mut().find(|m| m.name == definition.name) {
                Some(existing) => existing.value = definition.value,
                None => merged.push(definition),
            }
        }
        merged
    }

    pub fn to_argument(&self) -> String {
        match &self.value {
            Some(value) => format!("--define-macro={}={}", self.name, value),
            None => format!("--define-macro={}", self.name),
        }
    }
}

/// Build the frontend command line.
///
/// Platform macros are never injected here; callers pass them explicitly.
pub fn build_command_line(
    config: &FrontendConfig,
    macros: &[MacroDefinition],
    include_directories: &[PathBuf],
) -> Vec<String> {
    let mut args = vec![
        format!("--language={}", config.language),
        format!("--std={}", config.standard),
    ];
    args.extend(config.extra_arguments.iter().cloned());

    args.extend(macros.iter().map(MacroDefinition::to_argument));

    args.extend(
        include_directories
            .iter()
            .map(|dir| format!("--include-directory={}", dir.display())),
    );

    args
}
