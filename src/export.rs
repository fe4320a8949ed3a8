// src/export.rs
//! Report export: results view -> single-page PDF

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, info};

use crate::assessment::AssessmentResult;
use crate::errors::ExportError;
use crate::render::typst::render_document;
use crate::render::ResultsView;

pub const DEFAULT_REPORT_PREFIX: &str = "AI-Risk-Assessment";
pub const DEFAULT_EXPORT_TIMEOUT_SECS: u64 = 60;

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Compile document source into the bytes of the downloadable file
    async fn render(&self, source: &str) -> Result<Vec<u8>, ExportError>;
}

/// Compiles reports with the `typst` CLI in a throwaway directory.
pub struct TypstRenderer {
    binary: PathBuf,
    timeout: Duration,
}

impl TypstRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(DEFAULT_EXPORT_TIMEOUT_SECS),
        }
    }

    /// Upper bound on a single compile; the process is killed past it
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl DocumentRenderer for TypstRenderer {
    async fn render(&self, source: &str) -> Result<Vec<u8>, ExportError> {
        // dropped on every return path, so failed compiles leave nothing behind
        let workspace = tempfile::tempdir()?;
        let input = workspace.path().join("report.typ");
        let output = workspace.path().join("report.pdf");

        tokio::fs::write(&input, source).await?;

        let compile = Command::new(&self.binary)
            .arg("compile")
            .arg(&input)
            .arg(&output)
            .kill_on_drop(true)
            .output();

        let result = tokio::time::timeout(self.timeout, compile)
            .await
            .map_err(|_| {
                error!(
                    "{} did not finish within {:?}",
                    self.binary.display(),
                    self.timeout
                );
                ExportError::Toolchain(format!(
                    "{} timed out after {:?}",
                    self.binary.display(),
                    self.timeout
                ))
            })?
            .map_err(|e| {
                error!("Failed to execute {}: {}", self.binary.display(), e);
                ExportError::Toolchain(format!("{}: {}", self.binary.display(), e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            error!("Typst compilation failed: {}", stderr);
            return Err(ExportError::Render(stderr.trim().to_string()));
        }

        Ok(tokio::fs::read(&output).await?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct Exporter {
    renderer: Box<dyn DocumentRenderer>,
    report_prefix: String,
}

impl Exporter {
    pub fn new(renderer: Box<dyn DocumentRenderer>, report_prefix: impl Into<String>) -> Self {
        Self {
            renderer,
            report_prefix: report_prefix.into(),
        }
    }

    pub async fn export(&self, result: &AssessmentResult) -> Result<ExportedDocument, ExportError> {
        let view = ResultsView::build(result);
        let generated_at = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
        let source = render_document(&view, &generated_at);

        let bytes = self.renderer.render(&source).await?;
        if bytes.is_empty() {
            return Err(ExportError::Render("renderer produced an empty document".to_string()));
        }

        let filename = export_filename(&self.report_prefix, result.display_name());
        info!("Exported report {} ({} bytes)", filename, bytes.len());

        Ok(ExportedDocument { filename, bytes })
    }
}

/// `<prefix>-<name with whitespace runs as dashes>.pdf`
pub fn export_filename(prefix: &str, subject_name: &str) -> String {
    let name = subject_name.split_whitespace().collect::<Vec<_>>().join("-");
    let name = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|'))
        .collect::<String>();

    let name = if name.is_empty() {
        "Profile".to_string()
    } else {
        name
    };

    format!("{}-{}.pdf", prefix, name)
}
