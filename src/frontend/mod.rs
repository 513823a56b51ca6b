mod command;
mod config;
mod diagnostic;
mod process;

#[cfg(test)]
mod tests;

pub use command::{build_command_line, MacroDefinition};
pub use config::FrontendConfig;
pub use diagnostic::{
    parse_clang_diagnostics, parse_generator_diagnostics, Diagnostic, GenerationDiagnostic,
    GenerationLevel, Severity,
};
pub use process::{ProcessFrontend, ProcessUnit};

use crate::capture::OutputCapture;
use crate::scraper::ScrapeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::path::PathBuf;

/// Stands in for the native library path in generated bindings
pub const LIBRARY_PATH_PLACEHOLDER: &str = "LIBRARY_PATH";

/// Stands in for the target namespace in generated bindings
pub const LIBRARY_NAMESPACE_PLACEHOLDER: &str = "LIBRARY_NAMESPACE";

/// Core trait for a C/C++ parsing front end
///
/// The unit type owns whatever native resources back a parsed translation
/// unit and must release them when dropped.
pub trait Frontend {
    type Unit;

    /// Parse the invocation's header into a translation unit
    fn parse(&self, invocation: &Invocation) -> Result<ParseOutcome<Self::Unit>, ScrapeError>;

    /// Emit one structured document per logical output file into `outputs`
    ///
    /// # Returns
    /// Diagnostics raised while generating; these are never fatal
    fn generate(
        &self,
        unit: &Self::Unit,
        invocation: &Invocation,
        outputs: &mut OutputCapture,
    ) -> Result<Vec<GenerationDiagnostic>, ScrapeError>;
}

/// Everything a frontend needs to scrape one header
#[derive(Debug, Clone)]
pub struct Invocation {
    pub header: PathBuf,
    pub command_line: Vec<String>,
    pub flags: TranslationFlags,
    pub included_names: Vec<String>,
    pub excluded_names: Vec<String>,
    /// Target for every record a frontend logs for this invocation
    pub log_target: String,
}

/// Raw result of a parse attempt
#[derive(Debug)]
pub struct ParseOutcome<U> {
    pub code: ResultCode,
    pub unit: Option<U>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Frontend parse result codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    Failure,
    Crashed,
    InvalidArguments,
    AstReadError,
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultCode::Success => "Success",
            ResultCode::Failure => "Failure",
            ResultCode::Crashed => "Crashed",
            ResultCode::InvalidArguments => "InvalidArguments",
            ResultCode::AstReadError => "ASTReadError",
        };
        f.write_str(name)
    }
}

/// Translation unit parse options, bit-compatible with libclang's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationFlags(u32);

impl TranslationFlags {
    pub const NONE: Self = Self(0);
    pub const DETAILED_PREPROCESSING_RECORD: Self = Self(0x01);
    pub const KEEP_GOING: Self = Self(0x200);
    pub const INCLUDE_ATTRIBUTED_TYPES: Self = Self(0x1000);
    pub const VISIT_IMPLICIT_ATTRIBUTES: Self = Self(0x2000);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for TranslationFlags {
    fn default() -> Self {
        Self::INCLUDE_ATTRIBUTED_TYPES
            | Self::VISIT_IMPLICIT_ATTRIBUTES
            | Self::DETAILED_PREPROCESSING_RECORD
            | Self::KEEP_GOING
    }
}

impl BitOr for TranslationFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
