mod error;
mod gate;
mod request;


pub use error::ScrapeError;
pub use gate::{check_parse, generation_log_level, log_generation_diagnostics};
pub use request::ScrapeRequest;

use log::debug;

use crate::capture::{Document, OutputCapture};
use crate::frontend::{
    build_command_line, Frontend, FrontendConfig, Invocation, MacroDefinition, ProcessFrontend,
};
use crate::model::{Symbol, SymbolModel};
use crate::visitor::SymbolVisitor;

pub const DEFAULT_LOG_TARGET: &str = "header_scraper";

/// Primary entry point: drives a frontend over a header and turns its
/// bindings document into a [`SymbolModel`]
///
/// Holds no per-scrape state, so one scraper can serve any number of
/// sequential scrapes.
pub struct ClangScraper<F: Frontend> {
    frontend: F,
    config: FrontendConfig,
    log_target: String,
}

impl ClangScraper<ProcessFrontend> {
    /// Scraper over the external clang + bindings generator toolchain
    pub fn with_process_frontend(config: FrontendConfig) -> Self {
        let frontend = ProcessFrontend::new(&config);
        Self::new(frontend, config)
    }
}

impl<F: Frontend> ClangScraper<F> {
    pub fn new(frontend: F, config: FrontendConfig) -> Self {
        Self {
            frontend,
            config,
            log_target: DEFAULT_LOG_TARGET.to_string(),
        }
    }

    /// Send every log record to the given target
    pub fn log_target(mut self, target: impl Into<String>) -> Self {
        self.log_target = target.into();
        self
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// Scrape a header into a validated symbol model.
    ///
    /// No partial model is returned on failure.
    pub fn scrape(&self, request: &ScrapeRequest) -> Result<SymbolModel, ScrapeError> {
        let Some(document) = self.generate_document(request)? else {
            return Ok(SymbolModel::default());
        };

        let symbols = self
            .scrape_document(&document, request)
            .filter(|symbol| match symbol {
                Ok(symbol) => !request.is_excluded(symbol.name()),
                Err(_) => true,
            })
            .collect::<Result<Vec<Symbol>, ScrapeError>>()?;

        SymbolModel::new(symbols)
    }

    /// Walk an already generated document
    pub fn scrape_document<'a>(
        &self,
        document: &'a Document,
        request: &ScrapeRequest,
    ) -> SymbolVisitor<'a> {
        let header = request.header.display().to_string();
        match document.root() {
            Some(root) => SymbolVisitor::new(root, header, self.log_target.as_str()),
            None => SymbolVisitor::empty(header, self.log_target.as_str()),
        }
    }

    /// Run the frontend and load the first document it produced
    pub fn generate_document(&self, request: &ScrapeRequest) -> Result<Option<Document>, ScrapeError> {
        let invocation = self.invocation(request);

        let mut outputs = OutputCapture::new();
        self.generate_bindings(&invocation, &mut outputs)?;
        outputs.into_first_document(&self.log_target)
    }

    /// Assemble the frontend invocation for a request
    pub fn invocation(&self, request: &ScrapeRequest) -> Invocation {
        let macros = MacroDefinition::dedupe(request.defined_macros.iter().map(String::as_str));
        let command_line = build_command_line(&self.config, &macros, &request.include_directories);

        debug!(
            target: self.log_target.as_str(),
            "Scraping {} with {}",
            request.header.display(),
            command_line.join(" ")
        );

        Invocation {
            header: request.header.clone(),
            command_line,
            flags: self.config.translation_flags,
            included_names: request.included_names.clone(),
            excluded_names: request.excluded_names.clone(),
            log_target: self.log_target.clone(),
        }
    }

    /// The translation unit lives only inside this call and is released on
    /// every exit path.
    fn generate_bindings(
        &self,
        invocation: &Invocation,
        outputs: &mut OutputCapture,
    ) -> Result<(), ScrapeError> {
        let outcome = self.frontend.parse(invocation)?;
        let unit = check_parse(outcome)?;

        let diagnostics = self.frontend.generate(&unit, invocation, outputs)?;
        log_generation_diagnostics(&self.log_target, &diagnostics);

        Ok(())
    }
}
