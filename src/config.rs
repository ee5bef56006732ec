// src/config.rs
use crate::utils::error::AppError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How to reach the tabula-java table extractor.
#[derive(Debug, Clone)]
pub struct TabulaConfig {
    pub java: PathBuf,
    pub jar: PathBuf,
    /// Upper bound for a single page-range extraction.
    pub timeout: Duration,
}

/// Everything a run needs, passed explicitly into each document task.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Relative document paths are resolved against this directory.
    pub document_root: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub headings: Vec<String>,
    /// Text encoding handed to the table extractor.
    pub encoding: String,
    pub debug: bool,
    pub tabula: TabulaConfig,
}

impl ExtractionConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.document_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.headings.iter().all(|h| h.trim().is_empty()) {
            return Err(AppError::Config("at least one non-empty heading is required".to_string()));
        }
        if self.tabula.timeout.is_zero() {
            return Err(AppError::Config("table extraction timeout must be positive".to_string()));
        }
        if let Some(root) = &self.document_root {
            if !root.is_dir() {
                return Err(AppError::Config(format!(
                    "document root {} is not a directory",
                    root.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config(output_dir: &Path) -> ExtractionConfig {
    ExtractionConfig {
        document_root: None,
        output_dir: output_dir.to_path_buf(),
        headings: vec!["Precision".to_string()],
        encoding: "ISO-8859-1".to_string(),
        debug: false,
        tabula: TabulaConfig {
            java: PathBuf::from("java"),
            jar: PathBuf::from("tabula.jar"),
            timeout: Duration::from_secs(30),
        },
    }
}
