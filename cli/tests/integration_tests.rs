//! End-to-end tests for the `amis2api` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn amis2api(args: &[&str], paths: &[&Path]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_amis2api"));
    command.args(args);
    for path in paths {
        command.arg(path);
    }
    command.output().expect("failed to run amis2api")
}

fn workspace_fixture(crate_dir: &str, name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(crate_dir)
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn convert_fixtures(out: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_amis2api"))
        .arg("convert")
        .arg("--amis-dir")
        .arg(workspace_fixture("extract", "amis"))
        .arg("--out-dir")
        .arg(out)
        .args(["--jobs", "2"])
        .output()
        .expect("failed to run amis2api")
}

#[test]
fn test_convert_writes_contracts_and_report() {
    let out = tempfile::tempdir().unwrap();
    let output = convert_fixtures(out.path());
    assert_success(&output, "convert");

    assert!(out.path().join("trade/trade_info.json").is_file());
    assert!(out.path().join("crm/customer.json").is_file());

    let raw = fs::read_to_string(out.path().join("conversion-report.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(report["reports"].as_array().unwrap().len(), 4);
    assert_eq!(report["failures"][0], "broken.json");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Converted 2 of 4 document(s); wrote 2 contract file(s)."));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 conversion failure(s) (1 parse_failed, 1 no_block_found)"));
}

#[test]
fn test_convert_with_base_url_and_config() {
    let out = tempfile::tempdir().unwrap();
    let config = out.path().join("amis2api.yml");
    fs::write(&config, "batch:\n  jobs: 1\nextraction:\n  first_block_only: true\n").unwrap();
    let contracts = out.path().join("contracts");

    let output = Command::new(env!("CARGO_BIN_EXE_amis2api"))
        .arg("convert")
        .arg("--amis-dir")
        .arg(workspace_fixture("extract", "amis"))
        .arg("--out-dir")
        .arg(&contracts)
        .arg("--config")
        .arg(&config)
        .args(["--base-url", "http://10.0.0.5:8080"])
        .output()
        .unwrap();
    assert_success(&output, "convert --config");

    let raw = fs::read_to_string(contracts.join("trade/trade_info.json")).unwrap();
    assert!(raw.contains("http://10.0.0.5:8080/api/trade/list"));
    assert!(!raw.contains("${baseUrl}"));
}

#[test]
fn test_inspect_json_output() {
    let input = workspace_fixture("extract", "amis/trade/trade_info.json");
    let output = amis2api(&["inspect", "--input"], &[&input]);
    assert_success(&output, "inspect");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("Invalid JSON output: {e}\n{stdout}"));
    assert_eq!(parsed["contracts"][0]["info"]["tableName"], "ODS_TRADE_INFO");
    assert_eq!(parsed["stats"]["blocks_found"], 1);
}

#[test]
fn test_inspect_table_output_with_page_name() {
    let input = workspace_fixture("extract", "amis/crm/customer.json");
    let output = amis2api(
        &["inspect", "--page", "client_list", "--format", "table", "--input"],
        &[&input],
    );
    assert_success(&output, "inspect --format table");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Contract: ClientList  Table: CLIENT_LIST"));
    assert!(stdout.contains("blocks=1"));
}

#[test]
fn test_inspect_page_without_block_fails() {
    let input = workspace_fixture("extract", "amis/crm/dashboard.json");
    let output = amis2api(&["inspect", "--input"], &[&input]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_validate_converted_contracts() {
    let out = tempfile::tempdir().unwrap();
    assert_success(&convert_fixtures(out.path()), "convert");

    let output = amis2api(&["validate"], &[out.path()]);
    assert_success(&output, "validate");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Validated 2 contract file(s) with 2 contract(s)."));
}

#[test]
fn test_validate_rejects_contract_without_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bare.json");
    fs::write(
        &path,
        r#"{"openapi": "3.0.0", "info": {"title": "Orders", "tableName": "ORDERS", "version": "1.0.0"}}"#,
    )
    .unwrap();

    let output = amis2api(&["validate"], &[&path]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no schema named 'Orders' in components"));
}

#[test]
fn test_generate_from_converted_contracts() {
    let dir = tempfile::tempdir().unwrap();
    let contracts = dir.path().join("contracts");
    let backends = dir.path().join("backends");
    assert_success(&convert_fixtures(&contracts), "convert");

    let output = Command::new(env!("CARGO_BIN_EXE_amis2api"))
        .arg("generate")
        .arg("--openapi-dir")
        .arg(&contracts)
        .arg("--output-dir")
        .arg(&backends)
        .args(["--package-prefix", "org.acme", "--check"])
        .output()
        .unwrap();
    assert_success(&output, "generate");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Consistency check passed."));
    assert!(
        backends
            .join("trade-backend/src/main/java/org/acme/trade/entity/OdsTradeInfoEntity.java")
            .is_file()
    );
    assert!(
        backends
            .join("crm-backend/src/main/java/org/acme/crm/customer/controller/CustomerController.java")
            .is_file()
    );
}

#[test]
fn test_generate_reports_skipped_pages() {
    let dir = tempfile::tempdir().unwrap();
    let output = amis2api(
        &["generate", "--openapi-dir"],
        &[&workspace_fixture("codegen", "openapi")],
    );
    assert!(!output.status.success(), "--output-dir is required");

    let output = Command::new(env!("CARGO_BIN_EXE_amis2api"))
        .arg("generate")
        .arg("--openapi-dir")
        .arg(workspace_fixture("codegen", "openapi"))
        .arg("--output-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert_success(&output, "generate");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipped legacy: no schema for page 'legacy'"));
}
