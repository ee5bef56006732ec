// src/storage/mod.rs
use crate::extractors::section::SectionSpan;
use crate::extractors::xref::{table_references, LANDMARK_PHRASES};
use crate::pdf::Document;
use crate::pipeline::{DocumentReport, SectionOutcome, SectionReport};
use crate::utils::error::{AppError, StorageError};
use crate::utils::html_debug;
use std::fs;
use std::path::{Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

/// File-name-safe form of a heading ("Limit of Detection" -> "Limit_of_Detection").
fn file_stem(heading: &str) -> String {
    heading
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// /base_dir/<document_id>/, created on demand
    fn document_dir(&self, document_id: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(document_id);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the section span text to `<heading>_section.txt`
    pub fn save_section(&self, document_id: &str, span: &SectionSpan) -> Result<PathBuf, StorageError> {
        let file_path = self
            .document_dir(document_id)?
            .join(format!("{}_section.txt", file_stem(&span.heading)));

        fs::write(&file_path, span.text_or_empty()).map_err(StorageError::IoError)?;

        tracing::info!("Saved section to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the section outcome, markers and tables in JSON format
    pub fn save_section_metadata(
        &self,
        report: &DocumentReport,
        section: &SectionReport,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self
            .document_dir(&report.document_id)?
            .join(format!("{}_report.json", file_stem(&section.heading)));

        let metadata = serde_json::json!({
            "document_id": report.document_id,
            "path": report.path,
            "page_count": report.page_count,
            "heading": section.heading,
            "message": section.outcome.message(&section.heading),
            "outcome": section.outcome,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves every section of a report; returns the written paths.
    pub fn save_report(&self, report: &DocumentReport) -> Result<Vec<PathBuf>, StorageError> {
        let mut written = Vec::new();
        for section in &report.sections {
            if let SectionOutcome::Extracted(span) = &section.outcome {
                written.push(self.save_section(&report.document_id, span)?);
            }
            written.push(self.save_section_metadata(report, section)?);
        }
        Ok(written)
    }

    /// Writes `<heading>_annotated.html`: the normalized document text with markers,
    /// landmark phrases and table references highlighted.
    pub fn save_debug_html(&self, document: &Document, section: &SectionReport) -> Result<PathBuf, AppError> {
        let file_path = self
            .document_dir(&document.id)?
            .join(format!("{}_annotated.html", file_stem(&section.heading)));
        let text = document.normalized_pages().join(" ");

        let mut patterns: Vec<(String, &str)> = LANDMARK_PHRASES
            .iter()
            .map(|phrase| (regex::escape(phrase), "landmark"))
            .collect();
        if let SectionOutcome::Extracted(span) = &section.outcome {
            if let Some(start) = &span.start_marker {
                patterns.push((regex::escape(&start.literal_text()), "start"));
            }
            if let Some(end) = &span.end_marker {
                patterns.push((format!(r"{}\s*[A-Za-z]", end.pattern()), "end"));
            }
            for reference in table_references(span.text_or_empty()) {
                patterns.push((format!(r"{}\b", regex::escape(&reference.name)), "reference"));
            }
        }

        html_debug::create_debug_html(&text, &file_path, &patterns)?;
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::normalizer::PageNormalizer;
    use crate::extractors::section::{Marker, Separator};

    fn span() -> SectionSpan {
        let start = Marker {
            number: 7,
            separator: Separator::Period,
            literal: Some("7. Precision".to_string()),
        };
        SectionSpan {
            heading: "Precision".to_string(),
            end_marker: Some(start.next()),
            start_marker: Some(start),
            text: Some(" RSD 2.3 %, see Table 1. ".to_string()),
            boundary: None,
            tables: Vec::new(),
        }
    }

    fn report() -> DocumentReport {
        DocumentReport {
            document_id: "101500-TE94A".to_string(),
            path: PathBuf::from("/data/101500-TE94A.pdf"),
            page_count: 3,
            sections: vec![
                SectionReport {
                    heading: "Precision".to_string(),
                    outcome: SectionOutcome::Extracted(span()),
                },
                SectionReport {
                    heading: "Limit of Detection".to_string(),
                    outcome: SectionOutcome::NotFound,
                },
            ],
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Limit of Detection"), "Limit_of_Detection");
        assert_eq!(file_stem("Precision"), "Precision");
    }

    #[test]
    fn test_save_report_writes_text_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();

        let written = storage.save_report(&report()).unwrap();
        assert_eq!(written.len(), 3);

        let doc_dir = dir.path().join("out").join("101500-TE94A");
        let text = fs::read_to_string(doc_dir.join("Precision_section.txt")).unwrap();
        assert_eq!(text, " RSD 2.3 %, see Table 1. ");

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(doc_dir.join("Precision_report.json")).unwrap()).unwrap();
        assert_eq!(meta["outcome"]["status"], "extracted");
        assert_eq!(meta["outcome"]["start_marker"]["number"], 7);
        assert_eq!(meta["outcome"]["end_marker"]["separator"], "period");

        let missing: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(doc_dir.join("Limit_of_Detection_report.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(missing["outcome"]["status"], "not_found");
        assert_eq!(missing["message"], "No Limit of Detection data in input file");
        assert!(!doc_dir.join("Limit_of_Detection_section.txt").exists());
    }

    #[test]
    fn test_save_debug_html() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let normalizer = PageNormalizer::new("Precision").unwrap();
        let document = Document::from_raw_pages(
            Path::new("101500-TE94A.pdf"),
            vec![
                "7. Precision RSD 2.3 %, see Table 1. 8. Report".to_string(),
                "Appendix Table 1 data".to_string(),
            ],
            &normalizer,
        );

        let path = storage.save_debug_html(&document, &report().sections[0]).unwrap();
        let html = fs::read_to_string(path).unwrap();
        assert!(html.contains("class=\"highlight-start\""));
        assert!(html.contains("class=\"highlight-end\""));
        assert!(html.contains("class=\"highlight-landmark\""));
        assert!(html.contains("class=\"highlight-reference\""));
    }
}
