// src/pdf/mod.rs
pub mod lopdf_pages;

use crate::extractors::normalizer::PageNormalizer;
use std::path::{Path, PathBuf};

pub use lopdf_pages::LopdfPages;

/// Per-page text collaborator.
pub trait PageText {
    fn page_count(&self) -> usize;
    fn page_text(&self, index: usize) -> Result<String, crate::utils::error::PdfError>;
}

/// Reads every page once; a page that fails to extract contributes empty text.
pub fn read_raw_pages<T: PageText>(source: &T) -> Vec<String> {
    (0..source.page_count())
        .map(|index| match source.page_text(index) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Could not extract text from page {}: {}", index, e);
                String::new()
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub raw_text: String,
    pub normalized_text: String,
}

/// A document's pages, normalized for one heading.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub path: PathBuf,
    pages: Vec<Page>,
}

impl Document {
    pub fn from_raw_pages(path: &Path, raw_pages: Vec<String>, normalizer: &PageNormalizer) -> Self {
        let pages = raw_pages
            .into_iter()
            .enumerate()
            .map(|(index, raw_text)| Page {
                index,
                normalized_text: normalizer.normalize(&raw_text),
                raw_text,
            })
            .collect();
        Self {
            id: document_id(path),
            path: path.to_path_buf(),
            pages,
        }
    }

    /// Same pages, normalized for a different heading.
    pub fn renormalized(&self, normalizer: &PageNormalizer) -> Self {
        let raw = self.pages.iter().map(|p| p.raw_text.clone()).collect();
        Self::from_raw_pages(&self.path, raw, normalizer)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn normalized_pages(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.normalized_text.as_str()).collect()
    }

    /// True when no page has any text left after normalization (scanned/image-only PDF).
    pub fn is_image_only(&self) -> bool {
        self.pages.iter().all(|p| p.normalized_text.trim().is_empty())
    }
}

/// Document identifier: file name without directory and extension(s).
pub fn document_id(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}
