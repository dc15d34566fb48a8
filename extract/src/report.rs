//! Structured reporting for batch conversion runs.

use serde::{Deserialize, Serialize};

use crate::diagnostics::ExtractionStats;

/// Structured failure code for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// The source document could not be read.
    ReadFailed,
    /// The source document is not valid JSON.
    ParseFailed,
    /// The document holds no list/table/grid block.
    NoBlockFound,
    /// The contract file could not be written.
    WriteFailed,
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read_failed"),
            Self::ParseFailed => write!(f, "parse_failed"),
            Self::NoBlockFound => write!(f, "no_block_found"),
            Self::WriteFailed => write!(f, "write_failed"),
        }
    }
}

/// Per-document conversion report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Source path relative to the input root (`system/page.json`).
    pub document: String,
    /// System directory, when the document lives in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub page: String,
    pub success: bool,
    /// Structured failure code when conversion did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<FailureCode>,
    /// Human-readable detail about the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_detail: Option<String>,
    /// Output path relative to the output root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub contracts: usize,
    pub operations: usize,
    pub fields: usize,
    pub stats: ExtractionStats,
    pub warnings: Vec<String>,
}

impl ConversionReport {
    /// Report for a document that failed before any contract was built.
    pub fn failed(
        document: &str,
        system: Option<&str>,
        page: &str,
        code: FailureCode,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            document: document.to_string(),
            system: system.map(str::to_string),
            page: page.to_string(),
            success: false,
            failure_code: Some(code),
            failure_detail: Some(detail.into()),
            output: None,
            contracts: 0,
            operations: 0,
            fields: 0,
            stats: ExtractionStats::default(),
            warnings: Vec::new(),
        }
    }
}

/// Batch report for a full conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReportBundle {
    /// Contract format version.
    pub contract_version: String,
    pub generated_at: String,
    pub version: String,
    pub reports: Vec<ConversionReport>,
    /// Failing documents, as relative paths.
    pub failures: Vec<String>,
}

impl ConversionReportBundle {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }
}
