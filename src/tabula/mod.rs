// src/tabula/mod.rs
pub mod client;
pub mod models;

use crate::utils::error::TableError;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::path::Path;

pub use client::TabulaClient;

/// One extracted table: rows of cell text, in reading order.
pub type Grid = Vec<Vec<String>>;

/// Layout hint passed to the table extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Ruled/bordered cells (tabula "lattice").
    Strict,
    /// Boundaries inferred from whitespace (tabula "stream").
    Relaxed,
}

impl LayoutMode {
    pub fn tabula_flag(&self) -> &'static str {
        match self {
            LayoutMode::Strict => "--lattice",
            LayoutMode::Relaxed => "--stream",
        }
    }
}

/// Inclusive, 1-based page range as understood by the table extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageRange {
    pub first: usize,
    pub last: usize,
}

impl PageRange {
    pub fn single(page: usize) -> Self {
        Self { first: page, last: page }
    }

    /// Builds a range, clamping `last` into `first..=page_count`.
    pub fn clamped(first: usize, last: usize, page_count: usize) -> Self {
        let last = last.min(page_count).max(first);
        Self { first, last }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

/// A single table-extraction call.
#[derive(Debug, Clone, Copy)]
pub struct TableRequest<'a> {
    pub file: &'a Path,
    pub pages: PageRange,
    pub mode: LayoutMode,
    pub encoding: &'a str,
}

/// External table-extraction collaborator.
pub trait TableExtractor: Send + Sync {
    fn extract_tables(
        &self,
        request: TableRequest<'_>,
    ) -> impl Future<Output = Result<Vec<Grid>, TableError>> + Send;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_range_display() {
        assert_eq!(PageRange::single(4).to_string(), "4");
        assert_eq!(PageRange { first: 4, last: 5 }.to_string(), "4-5");
    }

    #[test]
    fn test_page_range_clamped() {
        assert_eq!(PageRange::clamped(3, 9, 5), PageRange { first: 3, last: 5 });
        assert_eq!(PageRange::clamped(5, 6, 5), PageRange::single(5));
        assert_eq!(PageRange::clamped(2, 3, 10), PageRange { first: 2, last: 3 });
    }

    #[test]
    fn test_layout_flags() {
        assert_eq!(LayoutMode::Strict.tabula_flag(), "--lattice");
        assert_eq!(LayoutMode::Relaxed.tabula_flag(), "--stream");
    }
}
