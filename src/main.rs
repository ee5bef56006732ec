// src/main.rs
mod config;
mod extractors;
mod pdf;
mod pipeline;
mod storage;
mod tabula;
mod utils;

use clap::Parser;
use config::{ExtractionConfig, TabulaConfig};
use pdf::Document;
use pipeline::DocumentReport;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storage::StorageManager;
use tabula::TabulaClient;
use tokio::task::JoinSet;
use utils::error::StorageError;
use utils::AppError;

/// Extracts named sections and their tables from lab-method PDFs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PDF documents to process
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Directory that relative document paths are resolved against
    #[arg(long)]
    document_root: Option<PathBuf>,

    /// Section heading to extract (repeatable)
    #[arg(long = "heading", default_value = "Precision")]
    headings: Vec<String>,

    /// Output directory for extracted content
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Path to the tabula-java jar
    #[arg(long, env = "TABULA_JAR", default_value = "tabula.jar")]
    tabula_jar: PathBuf,

    /// Java executable used to run tabula
    #[arg(long, default_value = "java")]
    java: PathBuf,

    /// Text encoding passed to the table extractor
    #[arg(long, default_value = "ISO-8859-1")]
    encoding: String,

    /// Timeout for a single table extraction, in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Debug mode - save annotated HTML files for debugging
    #[arg(short, long)]
    debug: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> (Vec<PathBuf>, ExtractionConfig) {
        let config = ExtractionConfig {
            document_root: self.document_root,
            output_dir: self.output_dir,
            headings: self.headings,
            encoding: self.encoding,
            debug: self.debug,
            tabula: TabulaConfig {
                java: self.java,
                jar: self.tabula_jar,
                timeout: Duration::from_secs(self.timeout_secs),
            },
        };
        (self.paths, config)
    }
}

/// Saves a document's results; debug HTML failures are logged, not fatal.
fn persist_report(
    storage: &StorageManager,
    debug: bool,
    report: &DocumentReport,
    documents: &[Document],
) -> Result<(), StorageError> {
    storage.save_report(report)?;

    if debug {
        for (section, document) in report.sections.iter().zip(documents) {
            if let Err(e) = storage.save_debug_html(document, section) {
                tracing::warn!("Failed to create debug HTML: {}", e);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.verbose);
    tracing::info!("Starting processing for args: {:?}", args);

    let (paths, config) = args.into_config();
    config.validate()?;

    // 3. Initialize storage and the table extractor
    let storage = StorageManager::new(&config.output_dir)?;
    let extractor = Arc::new(TabulaClient::new(config.tabula.clone()));
    let config = Arc::new(config);

    // 4. One task per document; documents share nothing but the extractor
    let mut tasks = JoinSet::new();
    for path in paths {
        let path = config.resolve(&path);
        let config = Arc::clone(&config);
        let extractor = Arc::clone(&extractor);
        tasks.spawn(async move {
            let result = pipeline::process_document(path.clone(), &config, &*extractor).await;
            (path, result)
        });
    }

    // 5. Persist results as they complete
    let mut success_count = 0;
    let mut failure_count = 0;

    while let Some(joined) = tasks.join_next().await {
        let (path, result) = match joined {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Document task failed: {}", e);
                failure_count += 1;
                continue;
            }
        };

        match result {
            Ok((report, documents)) => match persist_report(&storage, config.debug, &report, &documents) {
                Ok(()) => success_count += 1,
                Err(e) => {
                    tracing::error!("Failed to save results for {}: {}", report.document_id, e);
                    failure_count += 1;
                }
            },
            Err(e) => {
                tracing::error!("Failed to process {}: {}", path.display(), e);
                failure_count += 1;
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to process any of {} documents",
            failure_count
        )));
    }

    Ok(())
}
