// src/extractors/tables.rs

// --- Imports ---
use crate::extractors::section::Marker;
use crate::pdf::Document;
use crate::tabula::{Grid, LayoutMode, PageRange, TableExtractor, TableRequest};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

// --- Constants ---
/// Title and header rows skipped by the membership test.
const HEADER_ROWS: usize = 2;

/// Substrings left behind by mis-decoded trademark signs and smart quotes/dashes.
const CELL_ARTIFACTS: [&str; 2] = ["x80x9c", "x80x93"];

static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^0-9A-Za-z]+|TM").expect("Failed to compile NON_ALNUM_RE")
});

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableOrigin {
    InSection,
    CrossReferenced {
        reference: String,
        /// Document text between the reference name and the next one.
        window: String,
    },
}

/// A table that passed the membership test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCandidate {
    pub page_range: PageRange,
    pub layout: LayoutMode,
    pub rows: Grid,
    pub origin: TableOrigin,
}

/// Strips everything but ASCII letters and digits, plus known extraction artifacts.
pub fn normalize_for_match(text: &str) -> String {
    let mut normalized = NON_ALNUM_RE.replace_all(text, "").into_owned();
    for artifact in CELL_ARTIFACTS {
        normalized = normalized.replace(artifact, "");
    }
    normalized
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Drops rows whose cells are all empty.
pub fn drop_blank_rows(grid: Grid) -> Grid {
    grid.into_iter().filter(|row| !is_blank_row(row)).collect()
}

/// Membership test: some data row's normalized text occurs inside the normalized section text.
///
/// `grid` must already have blank rows removed. Rows that normalize to nothing never count.
pub fn is_member(grid: &Grid, normalized_text: &str) -> bool {
    grid.iter().skip(HEADER_ROWS).any(|row| {
        let row_text = normalize_for_match(&row.concat());
        !row_text.is_empty() && normalized_text.contains(&row_text)
    })
}

/// Keeps the grids that belong to `text`, with blank rows removed.
pub fn retain_members(grids: Vec<Grid>, text: &str) -> Vec<Grid> {
    let normalized_text = normalize_for_match(text);
    grids
        .into_iter()
        .map(drop_blank_rows)
        .filter(|grid| is_member(grid, &normalized_text))
        .collect()
}

/// Page range for a section starting on the 0-based `start_page`.
///
/// The section may run past its first page. Repeated mentions of the document identifier
/// (running headers) or "Page N of M" footers inside the span count the pages it crosses.
pub fn section_page_range(span_text: &str, document_id: &str, start_page: usize, page_count: usize) -> PageRange {
    let first = start_page + 1;

    let id_mentions = if document_id.is_empty() {
        0
    } else {
        span_text.matches(document_id).count()
    };
    // Only mentions followed by more span text count as a running header.
    let id_continues = !document_id.is_empty()
        && span_text
            .match_indices(document_id)
            .any(|(i, m)| i + m.len() < span_text.len());
    if id_continues && id_mentions > 0 {
        return PageRange::clamped(first, first + id_mentions, page_count);
    }

    let page_breaks = count_page_footers(span_text, page_count);
    if page_breaks > 0 {
        return PageRange::clamped(first, first + page_breaks, page_count);
    }

    PageRange::single(first)
}

fn count_page_footers(text: &str, page_count: usize) -> usize {
    match Regex::new(&format!(r"Page \d{{1,2}} of {}", page_count)) {
        Ok(re) => re.find_iter(text).count(),
        Err(e) => {
            tracing::warn!("Page footer pattern failed to compile: {}", e);
            0
        }
    }
}

// --- Correlator ---

/// Pulls candidate tables for a page range and keeps those that belong to a text.
pub struct TableCorrelator<'a, E> {
    extractor: &'a E,
    file: &'a Path,
    encoding: &'a str,
}

impl<'a, E: TableExtractor> TableCorrelator<'a, E> {
    pub fn new(extractor: &'a E, file: &'a Path, encoding: &'a str) -> Self {
        Self {
            extractor,
            file,
            encoding,
        }
    }

    async fn extract_or_empty(&self, pages: PageRange, mode: LayoutMode) -> Vec<Grid> {
        let request = TableRequest {
            file: self.file,
            pages,
            mode,
            encoding: self.encoding,
        };
        match self.extractor.extract_tables(request).await {
            Ok(grids) => grids,
            Err(e) => {
                tracing::warn!(
                    "Table extraction failed for {} pages {} ({:?}): {}",
                    self.file.display(),
                    pages,
                    mode,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Strict layout first; relaxed layout only when strict finds nothing.
    pub async fn extract(&self, pages: PageRange) -> (Vec<Grid>, LayoutMode) {
        let strict = self.extract_or_empty(pages, LayoutMode::Strict).await;
        if !strict.is_empty() {
            return (strict, LayoutMode::Strict);
        }
        tracing::debug!("No ruled tables on pages {}, retrying with relaxed layout", pages);
        (self.extract_or_empty(pages, LayoutMode::Relaxed).await, LayoutMode::Relaxed)
    }

    /// Extracts tables on `pages` and keeps the ones whose content appears in `text`.
    pub async fn correlate(&self, pages: PageRange, text: &str, origin: &TableOrigin) -> Vec<TableCandidate> {
        let (grids, layout) = self.extract(pages).await;
        let found = grids.len();
        let kept: Vec<TableCandidate> = retain_members(grids, text)
            .into_iter()
            .map(|rows| TableCandidate {
                page_range: pages,
                layout,
                rows,
                origin: origin.clone(),
            })
            .collect();
        tracing::debug!("Pages {}: kept {} of {} tables", pages, kept.len(), found);
        kept
    }

    /// Tables on every page where the section's start marker appears.
    pub async fn in_section_tables(&self, document: &Document, start: &Marker, span_text: &str) -> Vec<TableCandidate> {
        let literal = start.literal_text();
        let mut tables = Vec::new();
        for page in document.pages() {
            if !page.normalized_text.contains(&literal) {
                continue;
            }
            let range = section_page_range(span_text, &document.id, page.index, document.page_count());
            tracing::debug!("Start marker '{}' on page {}, requesting pages {}", literal, page.index, range);
            tables.extend(self.correlate(range, span_text, &TableOrigin::InSection).await);
        }
        tables
    }
}
