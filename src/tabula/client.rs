// src/tabula/client.rs
use crate::config::TabulaConfig;
use crate::tabula::models::TabulaTable;
use crate::tabula::{Grid, TableExtractor, TableRequest};
use crate::utils::error::TableError;
use std::process::Stdio;
use tokio::process::Command;

/// Runs the tabula-java command line tool once per page-range request.
#[derive(Debug, Clone)]
pub struct TabulaClient {
    config: TabulaConfig,
}

impl TabulaClient {
    pub fn new(config: TabulaConfig) -> Self {
        Self { config }
    }

    /// Builds the tabula invocation for one request.
    fn build_command(&self, request: &TableRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.config.java);
        cmd.arg(format!("-Dfile.encoding={}", request.encoding))
            .arg("-jar")
            .arg(&self.config.jar)
            .arg("--pages")
            .arg(request.pages.to_string())
            .arg(request.mode.tabula_flag())
            .arg("--format")
            .arg("JSON")
            .arg(request.file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out extraction drops the child; make sure the renderer dies with it.
            .kill_on_drop(true);
        cmd
    }
}

impl TableExtractor for TabulaClient {
    async fn extract_tables(&self, request: TableRequest<'_>) -> Result<Vec<Grid>, TableError> {
        tracing::debug!(
            "Extracting tables from {} pages {} ({:?})",
            request.file.display(),
            request.pages,
            request.mode
        );

        let output = tokio::time::timeout(self.config.timeout, self.build_command(&request).output())
            .await
            .map_err(|_| TableError::Timeout(self.config.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TableError::ExitStatus {
                status: output.status,
                stderr,
            });
        }

        let grids = parse_tabula_output(&output.stdout)?;
        tracing::debug!("tabula returned {} tables for pages {}", grids.len(), request.pages);
        Ok(grids)
    }
}

/// Decodes tabula's JSON output into grids. Blank output means no tables.
pub fn parse_tabula_output(stdout: &[u8]) -> Result<Vec<Grid>, TableError> {
    if stdout.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    let tables: Vec<TabulaTable> = serde_json::from_slice(stdout)?;
    for table in &tables {
        tracing::trace!(
            "tabula table on page {:?} ({}): {} rows",
            table.page_number,
            table.extraction_method,
            table.data.len()
        );
    }
    Ok(tables.into_iter().map(TabulaTable::into_grid).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabula::{LayoutMode, PageRange};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn config(java: &str) -> TabulaConfig {
        TabulaConfig {
            java: PathBuf::from(java),
            jar: PathBuf::from("/opt/tabula/tabula.jar"),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_command_arguments() {
        let client = TabulaClient::new(config("java"));
        let request = TableRequest {
            file: Path::new("/data/101500-TE94A.pdf"),
            pages: PageRange { first: 4, last: 5 },
            mode: LayoutMode::Relaxed,
            encoding: "ISO-8859-1",
        };
        let cmd = client.build_command(&request);
        let std_cmd = cmd.as_std();
        let args: Vec<_> = std_cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(std_cmd.get_program(), "java");
        assert_eq!(
            args,
            vec![
                "-Dfile.encoding=ISO-8859-1",
                "-jar",
                "/opt/tabula/tabula.jar",
                "--pages",
                "4-5",
                "--stream",
                "--format",
                "JSON",
                "/data/101500-TE94A.pdf",
            ]
        );
    }

    #[test]
    fn test_parse_blank_and_empty_output() {
        assert!(parse_tabula_output(b"").unwrap().is_empty());
        assert!(parse_tabula_output(b"  \n").unwrap().is_empty());
        assert!(parse_tabula_output(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_tabula_tables_into_grids() {
        let json = br#"[{"extraction_method":"stream","page_number":4,"data":[
            [{"text":"Sample"},{"text":"Mean"}],[{"text":"Sample 1"},{"text":"2.3"}]]}]"#;
        let grids = parse_tabula_output(json).unwrap();
        assert_eq!(grids, vec![vec![vec!["Sample", "Mean"], vec!["Sample 1", "2.3"]]]);
    }

    #[test]
    fn test_parse_garbage_output_is_error() {
        assert!(matches!(
            parse_tabula_output(b"Exception in thread main"),
            Err(TableError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let client = TabulaClient::new(config("/nonexistent/bin/java-for-tests"));
        let request = TableRequest {
            file: Path::new("missing.pdf"),
            pages: PageRange::single(1),
            mode: LayoutMode::Strict,
            encoding: "ISO-8859-1",
        };
        let result = client.extract_tables(request).await;
        assert!(matches!(result, Err(TableError::Spawn(_))));
    }
}
