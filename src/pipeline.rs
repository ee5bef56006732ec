// src/pipeline.rs
use crate::config::ExtractionConfig;
use crate::extractors::normalizer::PageNormalizer;
use crate::extractors::section::{join_pages, SectionLocator, SectionSpan};
use crate::extractors::span::SpanExtractor;
use crate::extractors::tables::TableCorrelator;
use crate::extractors::xref::CrossReferenceResolver;
use crate::pdf::{read_raw_pages, Document, LopdfPages};
use crate::tabula::TableExtractor;
use crate::utils::error::{AppError, ExtractError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened for one heading in one document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    /// No page has extractable text.
    ImageOnly,
    /// The heading never occurs as a numbered section.
    NotFound,
    Extracted(SectionSpan),
}

impl SectionOutcome {
    pub fn message(&self, heading: &str) -> String {
        match self {
            SectionOutcome::ImageOnly => "Input file is in Image format".to_string(),
            SectionOutcome::NotFound => format!("No {} data in input file", heading),
            SectionOutcome::Extracted(span) => format!(
                "{} section: {} chars, {} tables",
                heading,
                span.text_or_empty().len(),
                span.tables.len()
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub heading: String,
    pub outcome: SectionOutcome,
}

/// All headings processed for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub document_id: String,
    pub path: PathBuf,
    pub page_count: usize,
    pub sections: Vec<SectionReport>,
}

/// Extracts one heading's section and its tables from an already-normalized document.
///
/// Stages run strictly in order: locate, extract span, correlate in-section tables,
/// resolve cross-referenced tables. Both table sets are unioned into the span.
pub async fn extract_section<E: TableExtractor>(
    document: &Document,
    heading: &str,
    extractor: &E,
    encoding: &str,
) -> Result<SectionOutcome, ExtractError> {
    if document.is_image_only() {
        tracing::warn!("{}: no extractable text on any of {} pages", document.id, document.page_count());
        return Ok(SectionOutcome::ImageOnly);
    }

    let pages = document.normalized_pages();
    let markers = SectionLocator::new(heading)?.locate(&pages);
    let (Some(start), Some(end)) = (markers.start, markers.end) else {
        tracing::info!("{}: No {} data in input file", document.id, heading);
        return Ok(SectionOutcome::NotFound);
    };

    let text = join_pages(&pages);
    let extracted = SpanExtractor::new().extract(&text, Some(&start), Some(&end));

    let correlator = TableCorrelator::new(extractor, &document.path, encoding);
    let mut tables = correlator.in_section_tables(document, &start, &extracted.text).await;
    let cross_referenced = CrossReferenceResolver::new()
        .resolve(&correlator, document, &extracted.text)
        .await;
    tracing::info!(
        "{}: '{}' span {} chars, {} in-section tables, {} cross-referenced tables",
        document.id,
        heading,
        extracted.text.len(),
        tables.len(),
        cross_referenced.len()
    );
    tables.extend(cross_referenced);

    Ok(SectionOutcome::Extracted(SectionSpan {
        heading: heading.to_string(),
        start_marker: Some(start),
        end_marker: Some(end),
        text: Some(extracted.text),
        boundary: extracted.boundary,
        tables,
    }))
}

/// Runs every configured heading over one set of raw pages.
pub async fn process_pages<E: TableExtractor>(
    path: &Path,
    raw_pages: Vec<String>,
    config: &ExtractionConfig,
    extractor: &E,
) -> Result<(DocumentReport, Vec<Document>), AppError> {
    let mut base: Option<Document> = None;
    let mut sections = Vec::new();
    let mut documents = Vec::new();

    for heading in config.headings.iter().map(|h| h.trim()).filter(|h| !h.is_empty()) {
        let normalizer = PageNormalizer::new(heading)?;
        let document = match &base {
            Some(doc) => doc.renormalized(&normalizer),
            None => Document::from_raw_pages(path, raw_pages.clone(), &normalizer),
        };
        let outcome = extract_section(&document, heading, extractor, &config.encoding).await?;
        tracing::info!("{}: {}", document.id, outcome.message(heading));

        sections.push(SectionReport {
            heading: heading.to_string(),
            outcome,
        });
        base.get_or_insert_with(|| document.clone());
        documents.push(document);
    }

    let report = DocumentReport {
        document_id: crate::pdf::document_id(path),
        path: path.to_path_buf(),
        page_count: raw_pages.len(),
        sections,
    };
    Ok((report, documents))
}

/// Loads the PDF's page text off the async runtime, then processes every heading.
pub async fn process_document<E: TableExtractor>(
    path: PathBuf,
    config: &ExtractionConfig,
    extractor: &E,
) -> Result<(DocumentReport, Vec<Document>), AppError> {
    tracing::info!("Reading {}", path.display());
    let load_path = path.clone();
    let raw_pages = tokio::task::spawn_blocking(move || LopdfPages::load(&load_path).map(|pages| read_raw_pages(&pages)))
        .await
        .map_err(|e| AppError::Processing(format!("text extraction task failed: {}", e)))??;
    tracing::debug!("{}: read {} pages", path.display(), raw_pages.len());

    process_pages(&path, raw_pages, config, extractor).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::tabula::testing::{grid, RecordingExtractor};
    use crate::tabula::{LayoutMode, PageRange};
    use crate::extractors::tables::TableOrigin;

    fn raw(pages: &[&str]) -> Vec<String> {
        pages.iter().map(|p| p.to_string()).collect()
    }

    #[tokio::test]
    async fn test_absent_heading_reports_and_skips_tables() {
        let config = test_config(Path::new("out"));
        let extractor = RecordingExtractor::new();
        let pages = raw(&["1. Scope\nThis method", "2. Apparatus", "3. Procedure"]);

        let (report, _) = process_pages(Path::new("/data/101500-TE94A.pdf"), pages, &config, &extractor)
            .await
            .unwrap();

        assert_eq!(report.document_id, "101500-TE94A");
        assert_eq!(report.page_count, 3);
        let section = &report.sections[0];
        assert!(matches!(section.outcome, SectionOutcome::NotFound));
        assert_eq!(section.outcome.message(&section.heading), "No Precision data in input file");
        assert!(extractor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_image_only_document() {
        let config = test_config(Path::new("out"));
        let extractor = RecordingExtractor::new();
        let pages = raw(&["\n", " ", ""]);

        let (report, _) = process_pages(Path::new("scan.pdf"), pages, &config, &extractor).await.unwrap();
        let outcome = &report.sections[0].outcome;
        assert!(matches!(outcome, SectionOutcome::ImageOnly));
        assert_eq!(outcome.message("Precision"), "Input file is in Image format");
        assert!(extractor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_in_section_and_cross_referenced_tables_are_unioned() {
        let pages = raw(&[
            "1. Scope\nWater samples.",
            "7. PRECISION\nSample 1 gave 2.3 mg/L, Sample 1 2.3 mg/L. See Table 2. 8. Report\nResults",
            "Appendix",
            "Table 2 Resin A 0.05",
        ]);
        let in_section = grid(&[&["Precision"], &["Sample", "Mean", "Unit"], &["Sample 1", "2.3", "mg/L"]]);
        let appendix = grid(&[&["Table 2"], &["Resin", "SD"], &["Resin A", "0.05"]]);
        let extractor = RecordingExtractor::new()
            .respond(PageRange::single(2), LayoutMode::Relaxed, vec![in_section])
            .respond(PageRange::single(4), LayoutMode::Strict, vec![appendix]);

        let normalizer = PageNormalizer::new("Precision").unwrap();
        let document = Document::from_raw_pages(Path::new("/data/102375-E18F.pdf"), pages, &normalizer);
        let outcome = extract_section(&document, "Precision", &extractor, "ISO-8859-1").await.unwrap();

        let SectionOutcome::Extracted(span) = outcome else {
            panic!("expected extracted section");
        };
        assert_eq!(span.start_marker.as_ref().unwrap().number, 7);
        assert_eq!(span.end_marker.as_ref().unwrap().number, 8);
        assert_eq!(
            span.text.as_deref(),
            Some("Sample 1 gave 2.3 mg/L, Sample 1 2.3 mg/L. See Table 2. ")
        );
        assert_eq!(span.tables.len(), 2);
        assert_eq!(span.tables[0].origin, TableOrigin::InSection);
        assert!(matches!(
            &span.tables[1].origin,
            TableOrigin::CrossReferenced { reference, .. } if reference == "Table 2"
        ));
        assert_eq!(
            extractor.calls(),
            vec![
                (PageRange::single(2), LayoutMode::Strict),
                (PageRange::single(2), LayoutMode::Relaxed),
                (PageRange::single(4), LayoutMode::Strict),
            ]
        );
    }

    #[tokio::test]
    async fn test_unbounded_section_still_correlates_against_empty_text() {
        let pages = raw(&["7. Precision runs to the end"]);
        let candidate = grid(&[&["Precision"], &["Sample", "Mean"], &["runs to the end", ""]]);
        let extractor = RecordingExtractor::new().respond(PageRange::single(1), LayoutMode::Relaxed, vec![candidate]);

        let normalizer = PageNormalizer::new("Precision").unwrap();
        let document = Document::from_raw_pages(Path::new("/data/102375-E18F.pdf"), pages, &normalizer);
        let outcome = extract_section(&document, "Precision", &extractor, "ISO-8859-1").await.unwrap();

        let SectionOutcome::Extracted(span) = outcome else {
            panic!("a located start marker is never reported as missing");
        };
        assert_eq!(span.text.as_deref(), Some(""));
        assert!(span.boundary.is_none());
        assert!(span.tables.is_empty());
        assert_eq!(
            extractor.calls(),
            vec![
                (PageRange::single(1), LayoutMode::Strict),
                (PageRange::single(1), LayoutMode::Relaxed),
            ]
        );
    }

    #[tokio::test]
    async fn test_multiple_headings_share_raw_pages() {
        let mut config = test_config(Path::new("out"));
        config.headings = vec!["Scope".to_string(), "Precision".to_string()];
        let extractor = RecordingExtractor::new();
        let pages = raw(&["1. SCOPE\nApplies to resins. 2. Apparatus\nBalance", "no precision heading"]);

        let (report, documents) = process_pages(Path::new("m.pdf"), pages, &config, &extractor).await.unwrap();
        assert_eq!(report.sections.len(), 2);
        assert_eq!(documents.len(), 2);
        let SectionOutcome::Extracted(scope) = &report.sections[0].outcome else {
            panic!("scope should be found");
        };
        assert_eq!(scope.text.as_deref(), Some("Applies to resins. "));
        assert!(matches!(report.sections[1].outcome, SectionOutcome::NotFound));
    }
}
