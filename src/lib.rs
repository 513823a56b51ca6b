// Public API exports
pub mod capture;
pub mod frontend;
pub mod model;
pub mod scraper;
pub mod visitor;

// Re-export main types for convenience
pub use scraper::{ClangScraper, ScrapeError, ScrapeRequest, DEFAULT_LOG_TARGET};

pub use frontend::{
    Frontend, FrontendConfig, Invocation, ParseOutcome, ProcessFrontend, ResultCode,
    TranslationFlags,
};

pub use capture::{Document, Element, OutputCapture};

pub use model::{
    EnumSymbol, FunctionSymbol, MacroSymbol, Scope, StructSymbol, Symbol, SymbolModel,
    TypeReference, TypedefSymbol,
};

pub use visitor::SymbolVisitor;
