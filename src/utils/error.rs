// src/utils/error.rs
use std::time::Duration;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing error: {0}")]
    Parse(#[from] lopdf::Error), // Load or text-extraction failure inside lopdf

    #[error("Page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to launch table extractor: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Table extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("Table extractor exited with {status}: {stderr}")]
    ExitStatus { status: std::process::ExitStatus, stderr: String },

    #[error("Failed to parse table extractor output: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Invalid heading: {0}")]
    InvalidHeading(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("PDF text extraction failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
