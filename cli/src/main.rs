use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use amis_contract_codegen::generate_project;
use amis_contract_core::{AppConfig, validate_contracts};
use amis_contract_extract::convert::{
    ConvertConfig, REPORT_FILE_NAME, build_report_bundle, collect_contract_paths,
    convert_directory, failure_code_summary, load_contract_document,
};
use amis_contract_extract::extract_contracts;
use amis_contract_extract::output::{OutputFormat, format_bundle, format_contracts, format_stats};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "amis2api")]
#[command(version, about = "Convert amis pages into interface contracts and Spring Boot backends")]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a directory of amis pages into contract files.
    Convert(ConvertArgs),
    /// Print the contracts and extraction statistics of one page.
    Inspect(InspectArgs),
    /// Validate one or more contract files.
    Validate(ValidateArgs),
    /// Generate Spring Boot backends from a contract directory.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Directory of amis pages (`<system>/<page>.json` or `<page>.json`).
    #[arg(long)]
    amis_dir: PathBuf,
    /// Output directory for contract files.
    #[arg(long)]
    out_dir: PathBuf,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of parallel conversion jobs (default: from config).
    #[arg(long)]
    jobs: Option<usize>,
    /// Base URL substituted for the URL placeholder.
    #[arg(long)]
    base_url: Option<String>,
    /// Keep only the first block of each page.
    #[arg(long)]
    first_block_only: bool,
    /// Format of the run summary printed to stdout.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// amis page file.
    #[arg(long)]
    input: PathBuf,
    /// Page name used for entity naming (default: file stem).
    #[arg(long)]
    page: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Contract files and/or directories containing contract files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Directory of contracts (`<system>/<page>.json`).
    #[arg(long)]
    openapi_dir: PathBuf,
    /// Output directory for generated projects.
    #[arg(long)]
    output_dir: PathBuf,
    /// Root Java package (default: from config).
    #[arg(long)]
    package_prefix: Option<String>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fail when a generated project is missing expected paths.
    #[arg(long)]
    check: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Validate(args) => run_validate(args),
        Command::Generate(args) => run_generate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, String> {
    match path {
        Some(path) => AppConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let mut settings = config.extraction;
    if let Some(base_url) = args.base_url {
        settings.base_url = Some(base_url);
    }
    if args.first_block_only {
        settings.first_block_only = true;
    }
    let jobs = args.jobs.unwrap_or(config.batch.jobs);
    if jobs == 0 {
        return Err("--jobs must be at least 1".to_string());
    }

    let convert_config = ConvertConfig {
        amis_dir: args.amis_dir,
        out_dir: args.out_dir,
        settings,
        jobs,
    };
    let outcome = convert_directory(&convert_config).map_err(|err| err.to_string())?;

    let bundle = build_report_bundle(
        PACKAGE_VERSION,
        outcome.reports.clone(),
        outcome.failures.clone(),
    );
    let report_path = convert_config.out_dir.join(REPORT_FILE_NAME);
    let report_raw = serde_json::to_string_pretty(&bundle)
        .map_err(|err| format!("Failed to serialize conversion report: {err}"))?;
    fs::write(&report_path, report_raw)
        .map_err(|err| format!("Failed to write '{}': {err}", report_path.display()))?;

    print!("{}", format_bundle(&bundle, args.format)?);
    println!(
        "Converted {} of {} document(s); wrote {} contract file(s).",
        bundle.succeeded(),
        bundle.reports.len(),
        outcome.written.len()
    );

    if !outcome.failures.is_empty() {
        let breakdown: Vec<String> = failure_code_summary(&outcome.reports)
            .iter()
            .map(|(code, count)| format!("{count} {code}"))
            .collect();
        eprintln!(
            "{} conversion failure(s) ({}): {}",
            outcome.failures.len(),
            breakdown.join(", "),
            outcome.failures.join(", ")
        );
    }

    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let document: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| format!("Invalid JSON in '{}': {err}", args.input.display()))?;

    let page = match args.page {
        Some(page) => page,
        None => args
            .input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string(),
    };

    let output = extract_contracts(&document, &page, &AppConfig::default().extraction)
        .map_err(|err| err.to_string())?;

    match args.format {
        OutputFormat::Json => {
            #[derive(serde::Serialize)]
            struct InspectOutput<'a> {
                contracts: &'a [amis_contract_core::InterfaceContract],
                stats: &'a amis_contract_extract::diagnostics::ExtractionStats,
            }

            let json = serde_json::to_string_pretty(&InspectOutput {
                contracts: &output.contracts,
                stats: &output.stats,
            })
            .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{json}");
        }
        format => {
            print!("{}", format_contracts(&output.contracts, format)?);
            print!("{}", format_stats(&output.stats, format)?);
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let paths = collect_contract_paths(&args.inputs).map_err(|err| err.to_string())?;

    let mut contracts = 0usize;
    let mut problems = Vec::new();
    for path in &paths {
        let document = load_contract_document(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
        contracts += document.len();
        for err in validate_contracts(document.contracts()) {
            problems.push(format!("{}: {err}", path.display()));
        }
    }

    if !problems.is_empty() {
        return Err(format!(
            "{} validation error(s):\n  {}",
            problems.len(),
            problems.join("\n  ")
        ));
    }

    println!(
        "Validated {} contract file(s) with {} contract(s).",
        paths.len(),
        contracts
    );
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let mut settings = config.codegen;
    if let Some(prefix) = args.package_prefix {
        settings.package_prefix = prefix;
    }

    let outcome = generate_project(&args.openapi_dir, &args.output_dir, &settings)
        .map_err(|err| err.to_string())?;

    for system in &outcome.systems {
        println!(
            "{}: {} page(s), {} file(s) -> {}",
            system.system,
            system.pages.len(),
            system.files.len(),
            system.backend_dir.display()
        );
        for failure in &system.failures {
            eprintln!("  skipped {}: {}", failure.page, failure.detail);
        }
    }
    println!(
        "Generated {} page(s) into {} project(s); {} file(s) written.",
        outcome.pages_generated(),
        outcome.systems.len(),
        outcome.files_written()
    );

    if args.check {
        let missing: Vec<String> = outcome
            .systems
            .iter()
            .flat_map(|s| {
                s.missing
                    .iter()
                    .map(move |path| format!("{}/{}", s.system, path.display()))
            })
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "Consistency check failed, missing: {}",
                missing.join(", ")
            ));
        }
        println!("Consistency check passed.");
    }

    Ok(())
}
