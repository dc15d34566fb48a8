use std::fs;
use std::path::PathBuf;

use amis_contract_core::{
    ExtractionSettings, FieldMergePolicy, FieldType, HttpMethod, OperationKind, validate_contract,
};
use amis_contract_extract::{ExtractError, extract_contracts};
use serde_json::{Value, json};

fn fixture(relative: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("amis")
        .join(relative);
    let raw = fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
    serde_json::from_str(&raw).unwrap()
}

fn orders_block() -> Value {
    json!({
        "type": "crud",
        "tableName": "ORDERS",
        "api": {"url": "/api/orders", "method": "get"},
        "columns": [
            {"name": "id", "label": "ID"},
            {"type": "operation", "buttons": [
                {"actionType": "dialog", "dialog": {"body": {
                    "api": {"url": "/api/orders", "method": "put"},
                    "body": [{"name": "id"}, {"name": "amount", "type": "input-number"}]
                }}}
            ]}
        ]
    })
}

#[test]
fn test_orders_scenario_merges_edit_form_into_schema() {
    let output = extract_contracts(&orders_block(), "orders", &ExtractionSettings::default())
        .expect("block should extract");
    assert_eq!(output.contracts.len(), 1);

    let contract = &output.contracts[0];
    assert_eq!(contract.table_name(), "ORDERS");
    assert_eq!(contract.title(), "Orders");

    let methods: Vec<&String> = contract.paths["/api/orders"].keys().collect();
    assert_eq!(methods, vec!["get", "put"]);
    assert_eq!(
        contract.operation("/api/orders", &HttpMethod::Get).unwrap().kind,
        OperationKind::Query
    );
    assert_eq!(
        contract.operation("/api/orders", &HttpMethod::Put).unwrap().kind,
        OperationKind::Edit
    );

    let schema = contract.schema().unwrap();
    assert_eq!(
        schema.properties.keys().collect::<Vec<_>>(),
        vec!["id", "amount"]
    );
    assert_eq!(schema.properties["id"].java_type, FieldType::String.java_type());
    assert_eq!(schema.properties["id"].description, "ID");
    assert_eq!(schema.properties["amount"].java_type, FieldType::Integer.java_type());
    assert!(validate_contract(contract).is_empty());
}

#[test]
fn test_delete_button_yields_required_primary_key() {
    let block = json!({
        "type": "crud",
        "columns": [
            {"name": "title"},
            {"type": "operation", "buttons": [
                {"actionType": "ajax", "api": {"url": "/api/orders", "method": "delete"}}
            ]}
        ]
    });
    let output = extract_contracts(&block, "orders", &ExtractionSettings::default()).unwrap();
    let delete = output.contracts[0]
        .operation("/api/orders", &HttpMethod::Delete)
        .expect("delete entry");

    assert_eq!(delete.kind, OperationKind::Delete);
    assert_eq!(delete.parameters.len(), 1);
    assert_eq!(delete.parameters[0].name, "id");
    assert_eq!(delete.parameters[0].location, "query");
    assert!(delete.parameters[0].required);
}

#[test]
fn test_two_buttons_posting_same_url_collapse() {
    let block = json!({
        "type": "crud",
        "columns": [{"name": "id"}],
        "headerToolbar": [
            {"actionType": "ajax", "api": {"url": "/api/orders/add", "method": "post"}},
            {"actionType": "dialog", "dialog": {"body": {
                "type": "form",
                "api": {"url": "/api/orders/add", "method": "post"},
                "body": [{"name": "amount"}]
            }}}
        ]
    });
    let output = extract_contracts(&block, "orders", &ExtractionSettings::default()).unwrap();
    let contract = &output.contracts[0];

    assert_eq!(contract.paths["/api/orders/add"].len(), 1);
    assert_eq!(contract.operation_count(), 1);
    assert_eq!(output.stats.duplicate_operations, 1);
    // The first-seen declaration wins: the bare ajax button carries no form.
    let kept = contract.operation("/api/orders/add", &HttpMethod::Post).unwrap();
    assert_eq!(kept.source_path.as_deref(), Some("$.headerToolbar[0]"));
}

#[test]
fn test_extraction_is_idempotent() {
    let document = fixture("trade/trade_info.json");
    let settings = ExtractionSettings::default();
    let first = extract_contracts(&document, "trade_info", &settings).unwrap();
    let second = extract_contracts(&document, "trade_info", &settings).unwrap();

    assert_eq!(first.contracts, second.contracts);
    assert_eq!(
        serde_json::to_string(&first.contracts).unwrap(),
        serde_json::to_string(&second.contracts).unwrap()
    );
}

#[test]
fn test_repeated_field_names_across_depths_stay_unique() {
    let block = json!({
        "type": "crud",
        "api": "/api/items",
        "filter": {"body": [{"name": "code", "type": "input-number"}]},
        "columns": [{"name": "code", "label": "Code"}, {"name": "code"}],
        "headerToolbar": [{"dialog": {"body": {"type": "form", "api": "/api/items/add", "body": [
            {"name": "code", "type": "input-date"},
            {"type": "group", "body": [{"name": "code"}]}
        ]}}}]
    });
    for policy in [FieldMergePolicy::FirstSeen, FieldMergePolicy::LastSeen] {
        let settings = ExtractionSettings {
            field_merge: policy,
            ..Default::default()
        };
        let output = extract_contracts(&block, "items", &settings).unwrap();
        let schema = output.contracts[0].schema().unwrap();
        assert_eq!(schema.properties.len(), 1, "{policy:?}");
        assert!(schema.properties.contains_key("code"));
    }

    let output = extract_contracts(&block, "items", &ExtractionSettings::default()).unwrap();
    let code = &output.contracts[0].schema().unwrap().properties["code"];
    assert_eq!(code.description, "Code");
    assert_eq!(code.java_type, "String");
}

#[test]
fn test_document_without_block_is_rejected() {
    let err = extract_contracts(
        &fixture("crm/dashboard.json"),
        "dashboard",
        &ExtractionSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::NoBlockFound { ref page } if page == "dashboard"));
}

#[test]
fn test_type_inference_through_columns() {
    let block = json!({
        "type": "table",
        "columns": [
            {"name": "placed", "type": "input-datetime"},
            {"name": "due", "type": "date"},
            {"name": "qty", "type": "input-number"},
            {"name": "note", "type": "textarea"},
            {"name": "plain"}
        ]
    });
    let output = extract_contracts(&block, "t", &ExtractionSettings::default()).unwrap();
    let schema = output.contracts[0].schema().unwrap();
    let java: Vec<&str> = schema
        .properties
        .values()
        .map(|p| p.java_type.as_str())
        .collect();
    assert_eq!(
        java,
        vec!["java.util.Date", "java.util.Date", "Integer", "String", "String"]
    );
    assert_eq!(schema.properties["placed"].format.as_deref(), Some("date-time"));
}

#[test]
fn test_fallback_collects_names_three_levels_deep() {
    let block = json!({
        "type": "list",
        "listItem": {
            "body": [
                {"type": "wrapper", "body": {"type": "container", "body": [
                    {"type": "tpl", "name": "headline"}
                ]}}
            ]
        }
    });
    let output = extract_contracts(&block, "news", &ExtractionSettings::default()).unwrap();
    let schema = output.contracts[0].schema().unwrap();
    assert!(schema.properties.contains_key("headline"));
    assert_eq!(output.stats.fallback_field_collections, 1);
    assert!(output.stats.blocks[0].fallback_fields);
}

#[test]
fn test_trade_fixture_operations_and_fields() {
    let output = extract_contracts(
        &fixture("trade/trade_info.json"),
        "trade_info",
        &ExtractionSettings::default(),
    )
    .unwrap();
    let contract = &output.contracts[0];
    assert_eq!(contract.title(), "OdsTradeInfo");
    assert_eq!(contract.table_name(), "ODS_TRADE_INFO");

    let entries: Vec<(String, HttpMethod, OperationKind)> = contract
        .operations()
        .map(|(url, method, op)| {
            (url.trim_start_matches("${baseUrl}").to_string(), method, op.kind)
        })
        .collect();
    assert_eq!(
        entries,
        vec![
            ("/api/trade/list".to_string(), HttpMethod::Get, OperationKind::Query),
            ("/api/trade/update".to_string(), HttpMethod::Put, OperationKind::Edit),
            ("/api/trade/detail?id=${ODS_ID}".to_string(), HttpMethod::Get, OperationKind::View),
            ("/api/trade/delete".to_string(), HttpMethod::Delete, OperationKind::Delete),
            ("/api/trade/audit".to_string(), HttpMethod::Post, OperationKind::Add),
            ("/api/trade/add".to_string(), HttpMethod::Post, OperationKind::Add),
            ("/api/trade/batchDelete".to_string(), HttpMethod::Delete, OperationKind::Delete),
        ]
    );

    let query = contract
        .operation("${baseUrl}/api/trade/list", &HttpMethod::Get)
        .unwrap();
    let filters: Vec<&str> = query.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(filters, vec!["trade_code", "trade_date"]);

    let delete = contract
        .operation("${baseUrl}/api/trade/delete", &HttpMethod::Delete)
        .unwrap();
    assert_eq!(delete.parameters[0].name, "ODS_ID");

    let schema = contract.schema().unwrap();
    assert_eq!(
        schema.properties.keys().collect::<Vec<_>>(),
        vec!["ODS_ID", "trade_code", "quantity", "trade_time", "trade_date", "remark", "status"]
    );
    assert_eq!(schema.properties["quantity"].java_type, "Integer");
    assert_eq!(schema.properties["trade_time"].java_type, "java.util.Date");
    assert!(validate_contract(contract).is_empty());
}

#[test]
fn test_base_url_substitution() {
    let settings = ExtractionSettings {
        base_url: Some("http://10.1.1.1:8080/".to_string()),
        ..Default::default()
    };
    let output =
        extract_contracts(&fixture("trade/trade_info.json"), "trade_info", &settings).unwrap();
    let contract = &output.contracts[0];
    assert!(contract.paths.contains_key("http://10.1.1.1:8080/api/trade/list"));
    assert!(contract.paths.keys().all(|url| !url.contains("${baseUrl}")));
}

#[test]
fn test_customer_fixture_uses_enabled_filters_and_controls() {
    let output = extract_contracts(
        &fixture("crm/customer.json"),
        "customer",
        &ExtractionSettings::default(),
    )
    .unwrap();
    let contract = &output.contracts[0];
    assert_eq!(contract.title(), "Customer");
    assert_eq!(contract.table_name(), "CUSTOMER");

    let query = contract
        .operation("/api/customer/list", &HttpMethod::Get)
        .unwrap();
    assert_eq!(query.parameters.len(), 2);
    assert_eq!(query.parameters[1].description, "Region");

    let update = contract
        .operation("/api/customer/update", &HttpMethod::Put)
        .unwrap();
    let body = &update.request_body.as_ref().unwrap().content["application/json"].schema;
    assert_eq!(
        body.properties.keys().collect::<Vec<_>>(),
        vec!["customer_name", "score"]
    );
    assert_eq!(
        contract.schema().unwrap().properties["score"].java_type,
        "Integer"
    );
}

#[test]
fn test_nested_block_gets_its_own_contract() {
    let page = json!({
        "type": "crud",
        "api": "/api/orders",
        "columns": [
            {"name": "id"},
            {"type": "operation", "buttons": [{"actionType": "dialog", "dialog": {"body": {
                "type": "crud",
                "tableName": "order_lines",
                "api": "/api/orders/${id}/lines",
                "columns": [{"name": "line_no"}]
            }}}]}
        ]
    });
    let output = extract_contracts(&page, "orders", &ExtractionSettings::default()).unwrap();
    assert_eq!(output.contracts.len(), 2);

    let outer = &output.contracts[0];
    assert_eq!(outer.operation_count(), 1);
    assert!(!outer.schema().unwrap().properties.contains_key("line_no"));

    let inner = &output.contracts[1];
    assert_eq!(inner.title(), "OrderLines");
    assert!(inner.paths.contains_key("/api/orders/${id}/lines"));
    assert_eq!(
        inner.schema().unwrap().properties.keys().collect::<Vec<_>>(),
        vec!["line_no"]
    );
}
