mod document;


pub use document::{Document, Element};

use log::{trace, warn};
use std::io::Cursor;

use crate::scraper::ScrapeError;

/// In-memory sink for the generator's named output streams
///
/// Buffers keep the order in which they were requested and are all released
/// when the capture is dropped or consumed.
#[derive(Debug, Default)]
pub struct OutputCapture {
    buffers: Vec<CapturedOutput>,
}

#[derive(Debug)]
struct CapturedOutput {
    file_name: String,
    buffer: Cursor<Vec<u8>>,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate and register a buffer for `file_name`.
    ///
    /// Requesting the same name twice is a frontend/config mismatch and
    /// fails without touching the existing buffer.
    pub fn create(&mut self, file_name: &str) -> Result<&mut Cursor<Vec<u8>>, ScrapeError> {
        if self.buffers.iter().any(|b| b.file_name == file_name) {
            return Err(ScrapeError::DuplicateOutput(file_name.to_string()));
        }

        self.buffers.push(CapturedOutput {
            file_name: file_name.to_string(),
            buffer: Cursor::new(Vec::new()),
        });
        let last = self.buffers.len() - 1;
        Ok(&mut self.buffers[last].buffer)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.buffers.iter().map(|b| b.file_name.as_str())
    }

    /// Rewind every buffer and parse the first one requested.
    ///
    /// One scrape yields one document; later buffers are reported and
    /// dropped.
    pub fn into_first_document(self, log_target: &str) -> Result<Option<Document>, ScrapeError> {
        let mut buffers = self.buffers.into_iter();

        let Some(mut first) = buffers.next() else {
            return Ok(None);
        };

        for ignored in buffers {
            warn!(
                target: log_target,
                "Ignoring extra output file \"{}\" ({} bytes)",
                ignored.file_name,
                ignored.buffer.get_ref().len()
            );
        }

        trace!(target: log_target, "Outputting file \"{}\"", first.file_name);
        first.buffer.set_position(0);
        Document::parse(&mut first.buffer).map(Some)
    }
}
