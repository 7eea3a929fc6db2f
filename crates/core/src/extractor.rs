use crate::error::IndexError;
use lopdf::Document;
use std::path::Path;

/// One page of extracted text, 1-based. `text` is empty (never absent) when
/// the page has no extractable text layer.
#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IndexError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IndexError> {
        let document =
            Document::load(path).map_err(|error| IndexError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            // A page that fails text extraction is treated as having no
            // text layer; whether the whole document is usable is the
            // indexer's call, not the extractor's.
            let text = document.extract_text(&[page_no]).unwrap_or_default();
            pages.push(PageText {
                number: page_no,
                text,
            });
        }

        Ok(pages)
    }
}

pub fn extract_page_texts(path: &Path) -> Result<Vec<PageText>, IndexError> {
    LopdfExtractor.extract_pages(path)
}
