use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::model::Location;

lazy_static! {
    /// `file:line:col: severity: message [tags]`, location optional
    static ref CLANG_DIAGNOSTIC_RE: Regex = Regex::new(
        r"^(?:(?P<file>(?:[A-Za-z]:)?[^:\n]+):(?P<line>\d+):(?P<col>\d+): )?(?P<severity>fatal error|error|warning|note|remark): (?P<message>.*?)(?: \[(?P<tags>[^\[\]]*)\])?$"
    )
    .unwrap();

    /// `Level: message (file:line:col)` as printed by the bindings generator
    static ref GENERATOR_DIAGNOSTIC_RE: Regex = Regex::new(
        r"^\s*(?P<level>Info|Warning|Error): (?P<message>.*?)(?: \((?P<location>[^()]+:\d+:\d+)\))?\s*$"
    )
    .unwrap();
}

/// Parse-time diagnostic severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// Anything above warning aborts the scrape
    pub fn is_fatal(self) -> bool {
        self > Severity::Warning
    }

    fn from_clang(text: &str) -> Self {
        match text {
            "fatal error" => Severity::Fatal,
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            "note" | "remark" => Severity::Note,
            _ => Severity::Ignored,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Severity::Ignored => "ignored",
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        };
        f.write_str(text)
    }
}

/// A diagnostic attached to a translation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub location: Option<(Location, u32)>,
}

impl Diagnostic {
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location, column: u32) -> Self {
        self.location = Some((location, column));
        self
    }

    /// Render as `file:line:col: severity: message`
    pub fn format(&self) -> String {
        match &self.location {
            Some((location, column)) => {
                format!("{}:{}: {}: {}", location, column, self.severity, self.message)
            }
            None => format!("{}: {}", self.severity, self.message),
        }
    }
}

/// Severity of a diagnostic raised by the bindings generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationLevel {
    Info,
    Warning,
    Error,
    Other,
}

impl fmt::Display for GenerationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GenerationLevel::Info => "Info",
            GenerationLevel::Warning => "Warning",
            GenerationLevel::Error => "Error",
            GenerationLevel::Other => "Other",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationDiagnostic {
    pub level: GenerationLevel,
    pub message: String,
    pub location: Option<String>,
}

impl GenerationDiagnostic {
    pub fn new(level: GenerationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            location: None,
        }
    }
}

/// Extract diagnostics from clang's stderr.
///
/// Expects `-fdiagnostics-show-category=name`, which appends
/// `[-Wflag,Category]` or `[Category]`; context lines are skipped.
pub fn parse_clang_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    stderr
        .lines()
        .filter_map(|line| CLANG_DIAGNOSTIC_RE.captures(line.trim_end()))
        .map(|caps| {
            let category = caps
                .name("tags")
                .and_then(|tags| {
                    tags.as_str()
                        .split(',')
                        .map(str::trim)
                        .find(|tag| !tag.starts_with("-W"))
                })
                .unwrap_or_default();

            let mut diagnostic = Diagnostic::new(
                Severity::from_clang(&caps["severity"]),
                category,
                &caps["message"],
            );

            if let (Some(file), Some(line), Some(col)) =
                (caps.name("file"), caps.name("line"), caps.name("col"))
            {
                let line = line.as_str().parse().unwrap_or(0);
                let column = col.as_str().parse().unwrap_or(0);
                diagnostic = diagnostic.at(Location::new(file.as_str(), line), column);
            }

            diagnostic
        })
        .collect()
}

/// Extract diagnostics from the bindings generator's console output
pub fn parse_generator_diagnostics(output: &str) -> Vec<GenerationDiagnostic> {
    output
        .lines()
        .filter_map(|line| GENERATOR_DIAGNOSTIC_RE.captures(line))
        .map(|caps| {
            let level = match &caps["level"] {
                "Info" => GenerationLevel::Info,
                "Warning" => GenerationLevel::Warning,
                "Error" => GenerationLevel::Error,
                _ => GenerationLevel::Other,
            };
            GenerationDiagnostic {
                level,
                message: caps["message"].to_string(),
                location: caps.name("location").map(|m| m.as_str().to_string()),
            }
        })
        .collect()
}
