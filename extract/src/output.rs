//! Output formatting for contracts, statistics and reports.

use amis_contract_core::{ContractDocument, InterfaceContract};

use crate::diagnostics::ExtractionStats;
use crate::report::{ConversionReport, ConversionReportBundle};

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Formats contracts in the requested output format.
///
/// JSON and YAML use the on-disk document shape: one contract as an object,
/// several as a list.
pub fn format_contracts(
    contracts: &[InterfaceContract],
    format: OutputFormat,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => {
            let document = ContractDocument::from_contracts(contracts.to_vec());
            serde_json::to_string_pretty(&document)
                .map_err(|e| format!("JSON serialization failed: {e}"))
        }
        OutputFormat::Yaml => {
            let document = ContractDocument::from_contracts(contracts.to_vec());
            serde_yaml::to_string(&document).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(contracts
            .iter()
            .map(contract_to_markdown)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Table => Ok(contracts.iter().map(contract_to_table).collect()),
    }
}

/// Formats extraction statistics in the requested output format.
pub fn format_stats(stats: &ExtractionStats, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(stats)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(stats).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(stats_to_markdown(stats)),
        OutputFormat::Table => Ok(stats_to_table(stats)),
    }
}

/// Formats a whole run's report bundle.
pub fn format_bundle(
    bundle: &ConversionReportBundle,
    format: OutputFormat,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(bundle)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(bundle).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => {
            let mut out = format!(
                "# Conversion Report\n\n- **Generated:** {}\n\
                 - **Succeeded:** {}\n- **Failed:** {}\n\n",
                bundle.generated_at,
                bundle.succeeded(),
                bundle.failed()
            );
            for report in &bundle.reports {
                out.push_str(&report_to_markdown(report));
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Table => Ok(bundle.reports.iter().map(report_to_table).collect()),
    }
}

fn contract_to_markdown(contract: &InterfaceContract) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", contract.title()));
    out.push_str(&format!("**Table:** {}\n\n", contract.table_name()));

    if contract.operation_count() > 0 {
        out.push_str("## Operations\n\n");
        out.push_str("| Method | URL | Kind | Parameters |\n");
        out.push_str("|--------|-----|------|------------|\n");
        for (url, method, op) in contract.operations() {
            let params: Vec<&str> = op.parameters.iter().map(|p| p.name.as_str()).collect();
            out.push_str(&format!(
                "| {} | `{url}` | {} | {} |\n",
                method.as_str().to_uppercase(),
                op.kind,
                params.join(", ")
            ));
        }
        out.push('\n');
    }

    if let Some(schema) = contract.schema().filter(|s| !s.properties.is_empty()) {
        out.push_str("## Schema\n\n");
        out.push_str("| Field | Java Type | Column | Description |\n");
        out.push_str("|-------|-----------|--------|-------------|\n");
        for (name, property) in &schema.properties {
            out.push_str(&format!(
                "| `{name}` | {} | {} | {} |\n",
                property.java_type,
                property.column_name.as_deref().unwrap_or(name),
                property.description
            ));
        }
        out.push('\n');
    }

    out
}

fn contract_to_table(contract: &InterfaceContract) -> String {
    let mut out = String::new();
    let field_count = contract.schema().map_or(0, |s| s.properties.len());

    out.push_str(&format!(
        "Contract: {}  Table: {}  Fields: {field_count}\n",
        contract.title(),
        contract.table_name()
    ));

    let methods: Vec<String> = contract
        .operations()
        .map(|(_, method, _)| method.as_str().to_uppercase())
        .collect();
    let width = methods.iter().map(String::len).max().unwrap_or(3);
    for ((url, _, op), method) in contract.operations().zip(&methods) {
        out.push_str(&format!("  {method:<width$}  {url}  ({})\n", op.kind));
    }

    out
}

fn stats_to_markdown(stats: &ExtractionStats) -> String {
    let mut out = String::new();

    out.push_str("# Extraction Statistics\n\n");
    out.push_str(&format!("- **Blocks found:** {}\n", stats.blocks_found));
    out.push_str(&format!(
        "- **Operations:** {} discovered, {} retained, {} duplicates\n",
        stats.operations_discovered,
        stats.operations_retained(),
        stats.duplicate_operations
    ));
    out.push_str(&format!("- **Fields:** {}\n", stats.fields_retained()));

    if !stats.blocks.is_empty() {
        out.push_str("\n## Blocks\n\n");
        out.push_str("| Path | Type | Title | Fields | Operations |\n");
        out.push_str("|------|------|-------|--------|------------|\n");
        for block in &stats.blocks {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                block.path,
                block.block_type,
                block.title,
                block.fields.len(),
                block.operations.len()
            ));
        }
    }

    let warnings = stats.warnings();
    if !warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for w in &warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

fn stats_to_table(stats: &ExtractionStats) -> String {
    let mut out = format!(
        "blocks={} discovered={} retained={} duplicates={} ignored={} fields={}\n",
        stats.blocks_found,
        stats.operations_discovered,
        stats.operations_retained(),
        stats.duplicate_operations,
        stats.ignored_apis,
        stats.fields_retained()
    );
    for block in &stats.blocks {
        out.push_str(&format!("  {:<30} {}\n", block.path, block.title));
        for op in &block.operations {
            out.push_str(&format!(
                "    {:<7} {:<40} {:<6} {}\n",
                op.method.as_str().to_uppercase(),
                op.url,
                op.kind,
                op.source_path
            ));
        }
    }
    out
}

fn report_to_markdown(report: &ConversionReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("## {}\n\n", report.document));
    out.push_str(&format!(
        "- **Success:** {}\n",
        if report.success { "yes" } else { "no" }
    ));
    out.push_str(&format!("- **Contracts:** {}\n", report.contracts));
    out.push_str(&format!("- **Operations:** {}\n", report.operations));
    out.push_str(&format!("- **Fields:** {}\n", report.fields));

    if let Some(ref code) = report.failure_code {
        out.push_str(&format!("- **Failure Code:** {code}\n"));
    }
    if let Some(ref detail) = report.failure_detail {
        out.push_str(&format!("- **Failure Detail:** {detail}\n"));
    }

    if !report.warnings.is_empty() {
        out.push_str("\n### Warnings\n\n");
        for w in &report.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

fn report_to_table(report: &ConversionReport) -> String {
    let mut out = String::new();
    let status = if report.success { "OK" } else { "FAIL" };
    out.push_str(&format!(
        "{:<40} {:<6} contracts={} ops={} fields={}",
        report.document, status, report.contracts, report.operations, report.fields,
    ));
    if let Some(ref code) = report.failure_code {
        out.push_str(&format!("  [{code}]"));
    }
    out.push('\n');
    out
}
