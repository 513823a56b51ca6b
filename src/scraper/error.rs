use std::path::PathBuf;
use thiserror::Error;

use crate::frontend::ResultCode;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Diagnostic raised while parsing c: {category} \"{message}\"")]
    Parse { category: String, message: String },

    #[error("Could not parse translation unit: {code}")]
    TranslationUnit { code: ResultCode },

    #[error("Output file requested twice: {0}")]
    DuplicateOutput(String),

    #[error("Unresolved type reference `{name}` in {referenced_by} ({candidates} candidates)")]
    UnresolvedReference {
        name: String,
        referenced_by: String,
        candidates: usize,
    },

    #[error("Malformed bindings document: {0}")]
    MalformedDocument(String),

    #[error("Failed to launch frontend {program}: {source}")]
    FrontendUnavailable {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
