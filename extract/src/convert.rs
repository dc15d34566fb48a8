//! Batch conversion of page directories into contract files.
//!
//! Documents are read from `<amis_dir>/<system>/<page>.json` or directly
//! from `<amis_dir>/<page>.json`; contracts are written to the mirrored path
//! under the output directory. Every document is attempted; failures are
//! recorded per document and never abort the run.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use amis_contract_core::{CONTRACT_INFO_VERSION, ContractDocument, ExtractionSettings};

use crate::report::{ConversionReport, ConversionReportBundle, FailureCode};
use crate::{ExtractError, extract_contracts};

/// File name of the run report written next to the contracts.
pub const REPORT_FILE_NAME: &str = "conversion-report.json";

/// Typed error for conversion file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Invalid or missing input (e.g. non-existent path, wrong extension).
    #[error("{0}")]
    InvalidInput(String),
}

/// Batch conversion configuration.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub amis_dir: PathBuf,
    pub out_dir: PathBuf,
    pub settings: ExtractionSettings,
    /// Number of documents converted in parallel.
    pub jobs: usize,
}

/// One source page found under the input root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceDocument {
    /// Path relative to the input root; also the output path.
    pub relative: PathBuf,
    pub path: PathBuf,
    /// Enclosing system directory, if any.
    pub system: Option<String>,
    /// File stem, used to name contracts.
    pub page: String,
}

/// Aggregated output from a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// Per-document reports, sorted by relative path.
    pub reports: Vec<ConversionReport>,
    /// Relative paths of documents that failed.
    pub failures: Vec<String>,
    /// Contract files written.
    pub written: Vec<PathBuf>,
}

fn is_json(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("json"))
}

/// Lists every page document under `amis_dir`, sorted by relative path.
///
/// Top-level `.json` files are flat pages; each subdirectory is a system
/// whose `.json` files are its pages. Deeper levels are ignored.
pub fn collect_documents(amis_dir: &Path) -> Result<Vec<SourceDocument>, ConvertError> {
    if !amis_dir.is_dir() {
        return Err(ConvertError::InvalidInput(format!(
            "Input directory '{}' does not exist",
            amis_dir.display()
        )));
    }

    let mut documents = BTreeSet::new();
    for entry in fs::read_dir(amis_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            let Some(system) = path.file_name().and_then(OsStr::to_str).map(str::to_string)
            else {
                continue;
            };
            for inner in fs::read_dir(&path)? {
                let inner = inner?.path();
                if inner.is_file() && is_json(&inner) {
                    documents.insert(source_document(amis_dir, inner, Some(system.clone())));
                }
            }
        } else if path.is_file() && is_json(&path) {
            documents.insert(source_document(amis_dir, path, None));
        }
    }

    Ok(documents.into_iter().collect())
}

fn source_document(root: &Path, path: PathBuf, system: Option<String>) -> SourceDocument {
    let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
    let page = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_string();
    SourceDocument {
        relative,
        path,
        system,
        page,
    }
}

/// Converts one document and writes its contracts under `out_dir`.
///
/// Never fails: every problem becomes a failed [`ConversionReport`].
pub fn convert_document(
    document: &SourceDocument,
    out_dir: &Path,
    settings: &ExtractionSettings,
) -> ConversionReport {
    let label = document.relative.display().to_string();
    let fail = |code: FailureCode, detail: String| {
        warn!(document = %label, code = %code, "{detail}");
        ConversionReport::failed(
            &label,
            document.system.as_deref(),
            &document.page,
            code,
            detail,
        )
    };

    let raw = match fs::read_to_string(&document.path) {
        Ok(raw) => raw,
        Err(e) => return fail(FailureCode::ReadFailed, format!("Failed to read: {e}")),
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => return fail(FailureCode::ParseFailed, format!("Invalid JSON: {e}")),
    };
    let output = match extract_contracts(&value, &document.page, settings) {
        Ok(output) => output,
        Err(e @ ExtractError::NoBlockFound { .. }) => {
            return fail(FailureCode::NoBlockFound, e.to_string());
        }
    };

    let contracts = output.contracts.len();
    let operations = output.contracts.iter().map(|c| c.operation_count()).sum();
    let fields = output.stats.fields_retained();
    let warnings = output.stats.warnings();

    let target = out_dir.join(&document.relative);
    if let Err(e) = write_contracts(&target, ContractDocument::from_contracts(output.contracts)) {
        return fail(FailureCode::WriteFailed, format!("Failed to write: {e}"));
    }

    info!(
        document = %label,
        contracts,
        operations,
        fields,
        "Converted document"
    );
    ConversionReport {
        document: label.clone(),
        system: document.system.clone(),
        page: document.page.clone(),
        success: true,
        failure_code: None,
        failure_detail: None,
        output: Some(label),
        contracts,
        operations,
        fields,
        stats: output.stats,
        warnings,
    }
}

fn write_contracts(target: &Path, document: ContractDocument) -> Result<(), ConvertError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&document)?;
    fs::write(target, json)?;
    Ok(())
}

/// Converts every document under `config.amis_dir` in parallel.
///
/// # Errors
///
/// Fails only when the run cannot start: the input directory is missing,
/// the output directory cannot be created, or the worker pool fails.
pub fn convert_directory(config: &ConvertConfig) -> Result<ConvertOutcome, ConvertError> {
    let documents = collect_documents(&config.amis_dir)?;
    fs::create_dir_all(&config.out_dir)?;
    info!(
        input = %config.amis_dir.display(),
        documents = documents.len(),
        jobs = config.jobs,
        "Starting conversion"
    );

    let reports: Vec<ConversionReport> = {
        use rayon::prelude::*;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs.max(1))
            .build()?;

        pool.install(|| {
            documents
                .par_iter()
                .map(|document| convert_document(document, &config.out_dir, &config.settings))
                .collect()
        })
    };

    // Sort by document path for deterministic output.
    let mut reports = reports;
    reports.sort_by(|a, b| a.document.cmp(&b.document));

    let mut failures = Vec::new();
    let mut written = Vec::new();
    for report in &reports {
        match &report.output {
            Some(output) if report.success => written.push(config.out_dir.join(output)),
            _ => failures.push(report.document.clone()),
        }
    }

    Ok(ConvertOutcome {
        reports,
        failures,
        written,
    })
}

/// Summarizes failure code distribution from conversion reports.
pub fn failure_code_summary(reports: &[ConversionReport]) -> Vec<(FailureCode, usize)> {
    let mut counts: BTreeMap<FailureCode, usize> = BTreeMap::new();
    for report in reports {
        if let Some(code) = report.failure_code {
            *counts.entry(code).or_insert(0) += 1;
        }
    }
    counts.into_iter().collect()
}

/// Builds a serializable bundle report for a conversion run.
pub fn build_report_bundle(
    version: &str,
    reports: Vec<ConversionReport>,
    failures: Vec<String>,
) -> ConversionReportBundle {
    ConversionReportBundle {
        contract_version: CONTRACT_INFO_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        version: version.to_string(),
        reports,
        failures,
    }
}

fn is_contract_file(path: &Path) -> bool {
    let supported = matches!(
        path.extension().and_then(OsStr::to_str),
        Some("json" | "yaml" | "yml")
    );
    let is_report = path
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name == REPORT_FILE_NAME);
    supported && !is_report
}

/// Collects contract file paths from input files and/or directories.
///
/// Directories are searched one system level deep, matching the layout
/// [`convert_directory`] writes.
pub fn collect_contract_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ConvertError> {
    if inputs.is_empty() {
        return Err(ConvertError::InvalidInput(
            "No contract paths were provided".to_string(),
        ));
    }

    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_dir() {
                    for inner in fs::read_dir(&path)? {
                        let inner = inner?.path();
                        if inner.is_file() && is_contract_file(&inner) {
                            paths.insert(inner);
                        }
                    }
                } else if is_contract_file(&path) {
                    paths.insert(path);
                }
            }
            continue;
        }

        if input.is_file() {
            if !is_contract_file(input) {
                return Err(ConvertError::InvalidInput(format!(
                    "Contract file '{}' must end in .json, .yaml or .yml",
                    input.display()
                )));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(ConvertError::InvalidInput(format!(
            "Contract path '{}' does not exist",
            input.display(),
        )));
    }

    if paths.is_empty() {
        return Err(ConvertError::InvalidInput(
            "No contract files found in provided paths".to_string(),
        ));
    }

    Ok(paths.into_iter().collect())
}

/// Reads one contract file (JSON, or YAML by extension).
pub fn load_contract_document(path: &Path) -> Result<ContractDocument, ConvertError> {
    let raw = fs::read_to_string(path)?;
    let document = match path.extension().and_then(OsStr::to_str) {
        Some("yaml" | "yml") => serde_yaml::from_str(&raw)?,
        _ => serde_json::from_str(&raw)?,
    };
    Ok(document)
}
