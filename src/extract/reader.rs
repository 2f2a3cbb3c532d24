//! Plain-text access to downloaded documents.

use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Reads the leading pages of a document as plain text.
pub trait DocumentReader: Send + Sync {
    /// Text of the first `max_pages` pages, or `None` when the document
    /// cannot be read.
    fn read_text(&self, path: &Path, max_pages: usize) -> Option<String>;
}

/// [`DocumentReader`] backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfReader;

impl DocumentReader for LopdfReader {
    fn read_text(&self, path: &Path, max_pages: usize) -> Option<String> {
        if max_pages == 0 {
            return Some(String::new());
        }
        let document = match Document::load(path) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not open PDF");
                return None;
            }
        };
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().take(max_pages).collect();
        if page_numbers.is_empty() {
            debug!(path = %path.display(), "PDF has no pages");
            return Some(String::new());
        }
        match document.extract_text(&page_numbers) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not extract PDF text");
                None
            }
        }
    }
}
