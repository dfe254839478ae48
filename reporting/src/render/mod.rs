//! Multi-format report rendering
//!
//! Three independent renderers share one [`ReportContent`]:
//! - [`render_text`] writes the dated plain-text report
//! - [`render_pdf`] lays out and writes the paginated document
//! - [`render_table`] writes the metrics spreadsheet

mod document;
mod fonts;
mod pdf;
mod table;
mod text;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use report_agent::summary::{Domain, NormalizedSummary};

pub use document::{split_marked_pages, DocumentInput, Section};
pub use pdf::render_pdf;
pub use table::{build_grid, render_table, SheetGrid, SHEET_NAME};
pub use text::{format_text_report, render_text, text_report_path};

/// Title shared by every artifact
pub const REPORT_TITLE: &str = "Daily Company Performance Report";

/// Heading of the optional synthesized section
pub const EXECUTIVE_SUMMARY_HEADING: &str = "Executive Summary";

/// Everything the renderers need for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    pub date: NaiveDate,
    pub sales: String,
    pub marketing: String,
    pub executive_summary: Option<String>,
}

impl ReportContent {
    pub fn new(date: NaiveDate, sales: impl Into<String>, marketing: impl Into<String>) -> Self {
        Self {
            date,
            sales: sales.into(),
            marketing: marketing.into(),
            executive_summary: None,
        }
    }

    /// Build from the normalized domain summaries
    pub fn from_summaries(
        date: NaiveDate,
        sales: &NormalizedSummary,
        marketing: &NormalizedSummary,
    ) -> Self {
        debug_assert_eq!(sales.domain, Domain::Sales);
        debug_assert_eq!(marketing.domain, Domain::Marketing);
        Self::new(date, sales.text.clone(), marketing.text.clone())
    }

    pub fn with_executive_summary(mut self, summary: Option<impl Into<String>>) -> Self {
        self.executive_summary = summary.map(Into::into);
        self
    }

    /// `YYYY-MM-DD` stamp used in file names and headers
    pub fn date_stamp(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Errors raised inside a renderer before they are folded into an outcome
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

impl RenderError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of one renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The artifact was written to this path
    Written(PathBuf),
    /// Nothing to render; no file was created
    Skipped(String),
    /// Rendering failed; no usable artifact
    Failed(String),
}

impl RenderOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            RenderOutcome::Written(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, RenderOutcome::Written(_))
    }

    /// Fold a renderer result into an outcome, logging failures
    pub(crate) fn from_result(artifact: &str, result: Result<PathBuf, RenderError>) -> Self {
        match result {
            Ok(path) => {
                tracing::info!("Generated {} report: {}", artifact, path.display());
                RenderOutcome::Written(path)
            }
            Err(e) => {
                tracing::error!("Error generating {} report: {}", artifact, e);
                RenderOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Create the parent directory of `path` if needed
pub(crate) fn ensure_parent(path: &Path) -> Result<(), RenderError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| RenderError::io(parent, e))
        }
        _ => Ok(()),
    }
}
