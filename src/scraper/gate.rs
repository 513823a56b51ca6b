use log::{log, Level};

use super::ScrapeError;
use crate::frontend::{GenerationDiagnostic, GenerationLevel, ParseOutcome, ResultCode};

/// Accept a parse outcome only if it is a clean success.
///
/// Any diagnostic above warning fails with its category and message, even
/// when the frontend itself reported `Success`; this is stricter than the
/// result code alone. A non-success result without such a diagnostic still
/// fails, naming the code.
pub fn check_parse<U>(outcome: ParseOutcome<U>) -> Result<U, ScrapeError> {
    let ParseOutcome {
        code,
        unit,
        diagnostics,
    } = outcome;

    if let Some(diagnostic) = diagnostics.iter().find(|d| d.severity.is_fatal()) {
        return Err(ScrapeError::Parse {
            category: diagnostic.category.clone(),
            message: diagnostic.format(),
        });
    }

    match (code, unit) {
        (ResultCode::Success, Some(unit)) => Ok(unit),
        (code, _) => Err(ScrapeError::TranslationUnit { code }),
    }
}

/// Generation-time diagnostics are reported one level lower and never abort
pub fn generation_log_level(level: GenerationLevel) -> Level {
    match level {
        GenerationLevel::Info => Level::Debug,
        GenerationLevel::Warning => Level::Info,
        GenerationLevel::Error => Level::Warn,
        GenerationLevel::Other => Level::Debug,
    }
}

pub fn log_generation_diagnostics(log_target: &str, diagnostics: &[GenerationDiagnostic]) {
    for diagnostic in diagnostics {
        log!(
            target: log_target,
            generation_log_level(diagnostic.level),
            "Clang Diagnostic: {} at: {} \"{}\"",
            diagnostic.level,
            diagnostic.location.as_deref().unwrap_or("<unknown>"),
            diagnostic.message
        );
    }
}
