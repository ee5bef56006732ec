// src/pdf/lopdf_pages.rs
use crate::pdf::PageText;
use crate::utils::error::PdfError;
use lopdf::Document;
use std::path::Path;

/// Page text backed by lopdf's content-stream text extraction.
pub struct LopdfPages {
    doc: Document,
    // lopdf page numbers (1-based) in page order
    page_numbers: Vec<u32>,
}

impl LopdfPages {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PdfError> {
        let doc = Document::load(path.as_ref())?;
        let page_numbers = doc.get_pages().keys().copied().collect();
        Ok(Self { doc, page_numbers })
    }
}

impl PageText for LopdfPages {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        let number = self
            .page_numbers
            .get(index)
            .ok_or(PdfError::PageOutOfRange {
                index,
                count: self.page_numbers.len(),
            })?;
        Ok(self.doc.extract_text(&[*number])?)
    }
}
