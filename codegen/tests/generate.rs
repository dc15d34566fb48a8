use std::fs;
use std::path::PathBuf;

use serde_json::json;

use amis_contract_codegen::java::render_entity;
use amis_contract_codegen::{
    CodegenError, PageModel, SystemModel, generate_project, load_page_contract,
};
use amis_contract_core::{CodegenSettings, ExtractionSettings, HttpMethod, MavenDependency};
use amis_contract_extract::extract_contracts;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("openapi")
}

#[test]
fn test_generates_one_backend_per_system() {
    let out = tempfile::tempdir().unwrap();
    let outcome = generate_project(&fixtures(), out.path(), &CodegenSettings::default()).unwrap();

    let systems: Vec<&str> = outcome.systems.iter().map(|s| s.system.as_str()).collect();
    assert_eq!(systems, vec!["crm", "trade"]);
    assert!(out.path().join("crm-backend/pom.xml").is_file());
    assert!(out.path().join("trade-backend/pom.xml").is_file());
    assert!(outcome.is_consistent());
}

#[test]
fn test_missing_schema_skips_page_and_continues() {
    let out = tempfile::tempdir().unwrap();
    let outcome = generate_project(&fixtures(), out.path(), &CodegenSettings::default()).unwrap();

    let crm = &outcome.systems[0];
    assert_eq!(crm.pages, vec!["customer"]);
    assert_eq!(crm.failures.len(), 1);
    assert_eq!(crm.failures[0].page, "legacy");
    assert!(crm.failures[0].detail.contains("no schema for page 'legacy'"));
    assert!(crm.failures[0].detail.contains("Record"));

    let root = out.path().join("crm-backend/src/main/java/com/hg/crm");
    assert!(root.join("customer/controller/CustomerController.java").is_file());
    assert!(!root.join("legacy").exists());
    assert!(!root.join("entity/Archive2019Entity.java").exists());

    assert_eq!(outcome.pages_generated(), 2);
    assert_eq!(outcome.page_failures(), 1);
}

#[test]
fn test_trade_page_sources() {
    let out = tempfile::tempdir().unwrap();
    generate_project(&fixtures(), out.path(), &CodegenSettings::default()).unwrap();
    let root = out.path().join("trade-backend/src/main/java/com/hg/trade");

    let entity = fs::read_to_string(root.join("entity/OdsTradeInfoEntity.java")).unwrap();
    assert!(entity.contains("@Table(name = \"ODS_TRADE_INFO\")"));
    assert!(entity.contains("    @Id\n    @Column(name = \"ODS_ID\")\n    private String odsId;"));

    let controller =
        fs::read_to_string(root.join("trade_info/controller/TradeInfoController.java")).unwrap();
    assert!(controller.contains("@GetMapping(\"/api/trade/list\")"));
    assert!(controller.contains("@PutMapping(\"/api/trade/update\")"));
    assert!(controller.contains(
        "public void deleteApiTradeOdsId(@PathVariable(\"ODS_ID\") String odsId) {"
    ));

    let service =
        fs::read_to_string(root.join("trade_info/service/TradeInfoService.java")).unwrap();
    assert!(service.contains("List<OdsTradeInfoDTO> query(String tradeCode, String tradeDate);"));

    // The date parameter arrives as text and is not matched onto the entity.
    let service_impl = fs::read_to_string(
        root.join("trade_info/service/impl/TradeInfoServiceImpl.java"),
    )
    .unwrap();
    assert!(service_impl.contains("probe.setTradeCode(tradeCode);"));
    assert!(!service_impl.contains("probe.setTradeDate("));

    let app = fs::read_to_string(root.join("TradeApiApplication.java")).unwrap();
    assert!(app.contains("package com.hg.trade;"));

    let yml = fs::read_to_string(
        out.path()
            .join("trade-backend/src/main/resources/application.yml"),
    )
    .unwrap();
    assert!(yml.contains("name: trade-backend"));

    let readme = fs::read_to_string(out.path().join("trade-backend/README.md")).unwrap();
    assert!(readme.contains("| trade_info | OdsTradeInfoEntity | `ODS_TRADE_INFO` | 3 |"));
}

#[test]
fn test_flagged_primary_key_drives_repository() {
    let out = tempfile::tempdir().unwrap();
    generate_project(&fixtures(), out.path(), &CodegenSettings::default()).unwrap();

    let repository = fs::read_to_string(
        out.path()
            .join("crm-backend/src/main/java/com/hg/crm/repository/CustomerRepository.java"),
    )
    .unwrap();
    assert!(repository.contains("JpaRepository<CustomerEntity, String>"));

    let service = fs::read_to_string(
        out.path()
            .join("crm-backend/src/main/java/com/hg/crm/customer/service/CustomerService.java"),
    )
    .unwrap();
    assert!(service.contains("void delete(String customerNo);"));
}

#[test]
fn test_settings_flow_into_package_and_pom() {
    let out = tempfile::tempdir().unwrap();
    let settings = CodegenSettings {
        package_prefix: "org.acme".to_string(),
        dependencies: vec![MavenDependency::new("com.hg", "common-backend").with_version("1.0.0")],
        ..CodegenSettings::default()
    };
    generate_project(&fixtures(), out.path(), &settings).unwrap();

    assert!(
        out.path()
            .join("trade-backend/src/main/java/org/acme/trade/TradeApiApplication.java")
            .is_file()
    );
    let pom = fs::read_to_string(out.path().join("trade-backend/pom.xml")).unwrap();
    assert!(pom.contains("<artifactId>common-backend</artifactId>"));
    assert!(pom.contains("<artifactId>spring-boot-starter-data-jpa</artifactId>"));
}

#[test]
fn test_multi_contract_page_uses_first_contract() {
    let contract = load_page_contract(&fixtures().join("crm/customer.json")).unwrap();
    assert_eq!(contract.title(), "Customer");
}

#[test]
fn test_invalid_input_directory() {
    let out = tempfile::tempdir().unwrap();
    let err = generate_project(
        &out.path().join("missing"),
        out.path(),
        &CodegenSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CodegenError::InvalidInput(_)));
}

#[test]
fn test_extracted_mixed_case_names_resolve_schema() {
    let page = json!({
        "type": "crud",
        "tableName": "orderItem",
        "api": "/api/order-items",
        "columns": [{"name": "id"}, {"name": "sku"}]
    });
    let output = extract_contracts(&page, "orderLine", &ExtractionSettings::default()).unwrap();
    let contract = &output.contracts[0];

    let system = SystemModel::new("shop", "com.hg");
    let model = PageModel::build(&system, "orderLine", contract).unwrap();
    assert_eq!(model.model_class, "Orderitem");
    assert_eq!(model.fields.len(), 2);
}

#[test]
fn test_configured_key_becomes_entity_id() {
    let page = json!({
        "type": "crud",
        "api": "/api/orders",
        "columns": [
            {"name": "title"},
            {"name": "order_no"},
            {"type": "operation", "buttons": [
                {"actionType": "ajax", "api": "delete:/api/orders/${order_no}"}
            ]}
        ]
    });
    let settings = ExtractionSettings {
        primary_key_names: vec!["order_no".to_string()],
        ..ExtractionSettings::default()
    };
    let output = extract_contracts(&page, "orders", &settings).unwrap();
    let contract = &output.contracts[0];
    let delete = contract
        .operation("/api/orders/${order_no}", &HttpMethod::Delete)
        .unwrap();
    let delete_key = &delete.parameters[0].name;

    let system = SystemModel::new("shop", "com.hg");
    let model = PageModel::build(&system, "orders", contract).unwrap();
    assert_eq!(&model.primary_key().name, delete_key);

    let entity = render_entity(&system, &model);
    assert!(
        entity.contains("    @Id\n    @Column(name = \"order_no\")\n    private String orderNo;")
    );
}
