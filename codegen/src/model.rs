//! Render model: Java-facing names and shapes derived from one contract.
//!
//! A [`SystemModel`] carries the per-project names (artifact, root package,
//! application class). A [`PageModel`] carries everything the page-level and
//! entity-level templates need: the entity fields, the primary key, the GET
//! query parameters and one [`Endpoint`] per contract operation.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, warn};

use amis_contract_core::naming::{DEFAULT_ENTITY_NAME, small_camel, upper_camel};
use amis_contract_core::{
    DEFAULT_PRIMARY_KEY_NAMES, FieldType, HttpMethod, InterfaceContract, ObjectSchema,
    OperationKind,
};

use crate::error::{CodegenError, Result};

/// Spring request-mapping annotation for an HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingAnnotation {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    /// Generic `@RequestMapping`, with an explicit method when one is known.
    Request(Option<&'static str>),
}

impl MappingAnnotation {
    /// Maps an HTTP method to its annotation. Verbs without a dedicated
    /// annotation fall back to `@RequestMapping`; unknown verbs are logged.
    pub fn for_method(method: &HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::Get,
            HttpMethod::Post => Self::Post,
            HttpMethod::Put => Self::Put,
            HttpMethod::Delete => Self::Delete,
            HttpMethod::Patch => Self::Patch,
            HttpMethod::Head => Self::Request(Some("HEAD")),
            HttpMethod::Options => Self::Request(Some("OPTIONS")),
            HttpMethod::Other(verb) => {
                warn!(method = %verb, "unknown HTTP method, using @RequestMapping");
                Self::Request(None)
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Get => "GetMapping",
            Self::Post => "PostMapping",
            Self::Put => "PutMapping",
            Self::Delete => "DeleteMapping",
            Self::Patch => "PatchMapping",
            Self::Request(_) => "RequestMapping",
        }
    }

    /// Full annotation for `path`, e.g. `@GetMapping("/api/orders")`.
    pub fn render(self, path: &str) -> String {
        let path = java_string(path);
        match self {
            Self::Request(Some(verb)) => format!(
                "@RequestMapping(value = \"{path}\", method = RequestMethod.{verb})"
            ),
            _ => format!("@{}(\"{path}\")", self.name()),
        }
    }
}

/// One entity field as seen by the Java templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaField {
    /// Schema key.
    pub name: String,
    /// Database column.
    pub column: String,
    pub java_name: String,
    pub java_type: String,
    pub label: String,
    pub primary_key: bool,
}

impl JavaField {
    pub fn getter(&self) -> String {
        format!("get{}", upper_first(&self.java_name))
    }

    pub fn setter(&self) -> String {
        format!("set{}", upper_first(&self.java_name))
    }

    pub fn is_date(&self) -> bool {
        FieldType::from_java_type(&self.java_type) == FieldType::Date
            && self.java_type != "java.time.LocalDateTime"
    }
}

/// Query parameter of the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub java_name: String,
    pub java_type: String,
    pub description: String,
}

/// One controller handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Spring path template (host and query string removed).
    pub path: String,
    pub method: HttpMethod,
    pub mapping: MappingAnnotation,
    pub kind: OperationKind,
    /// Java method name, unique within the controller.
    pub handler: String,
    pub summary: String,
    /// Names of `{var}` segments in `path`.
    pub path_variables: Vec<String>,
}

/// Names shared by every page of one system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemModel {
    pub system: String,
    /// `<system>-backend`.
    pub artifact_id: String,
    /// `<prefix>.<system>`.
    pub package: String,
    /// `src/main/java/<prefix path>/<system>`, relative to the project root.
    pub java_root: PathBuf,
    /// `<UpperCamel(system)>ApiApplication`.
    pub app_class: String,
}

impl SystemModel {
    pub fn new(system: &str, package_prefix: &str) -> Self {
        let segment = package_segment(system);
        let package = if package_prefix.trim().is_empty() {
            segment.clone()
        } else {
            format!("{}.{segment}", package_prefix.trim())
        };

        let mut java_root = PathBuf::from("src/main/java");
        for part in package.split('.').filter(|p| !p.is_empty()) {
            java_root.push(part);
        }

        Self {
            system: system.to_string(),
            artifact_id: format!("{system}-backend"),
            package,
            java_root,
            app_class: format!("{}ApiApplication", upper_camel(system)),
        }
    }
}

/// Everything rendered for one page contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageModel {
    pub page: String,
    /// Directory and last package segment of the page-level classes.
    pub page_segment: String,
    /// `<system package>.<page segment>`.
    pub package: String,
    pub page_class: String,
    /// Entity name derived from the table name.
    pub model_class: String,
    pub table_name: String,
    pub fields: Vec<JavaField>,
    /// Index into `fields`.
    pub primary_key: usize,
    /// `true` when the schema was empty and an `id` key was synthesized.
    pub synthesized_key: bool,
    pub query_params: Vec<QueryParam>,
    pub endpoints: Vec<Endpoint>,
}

impl PageModel {
    /// Builds the render model for `page` from its contract.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::MissingSchema`] when the contract has no
    /// schema under `UpperCamel(page)` or `UpperCamel(tableName)`.
    pub fn build(system: &SystemModel, page: &str, contract: &InterfaceContract) -> Result<Self> {
        let table_name = if contract.table_name().trim().is_empty() {
            page.to_string()
        } else {
            contract.table_name().to_string()
        };
        let schema = lookup_schema(page, &table_name, contract)?;

        let mut fields = java_fields(schema);
        let synthesized_key = fields.is_empty();
        if synthesized_key {
            fields.push(JavaField {
                name: "id".to_string(),
                column: "id".to_string(),
                java_name: "id".to_string(),
                java_type: "Long".to_string(),
                label: "Primary key".to_string(),
                primary_key: true,
            });
        }
        let primary_key = primary_key_index(&fields);
        for (i, field) in fields.iter_mut().enumerate() {
            field.primary_key = i == primary_key;
        }

        let model_class = non_empty(upper_camel(&table_name), DEFAULT_ENTITY_NAME);
        let page_segment = package_segment(page);

        let model = Self {
            page: page.to_string(),
            package: format!("{}.{page_segment}", system.package),
            page_segment,
            page_class: non_empty(upper_camel(page), DEFAULT_ENTITY_NAME),
            model_class,
            table_name,
            query_params: query_params(contract),
            endpoints: endpoints(contract),
            fields,
            primary_key,
            synthesized_key,
        };
        debug!(
            page = %model.page,
            entity = %model.model_class,
            fields = model.fields.len(),
            endpoints = model.endpoints.len(),
            "built page model"
        );
        Ok(model)
    }

    pub fn primary_key(&self) -> &JavaField {
        &self.fields[self.primary_key]
    }

    pub fn entity_class(&self) -> String {
        format!("{}Entity", self.model_class)
    }

    pub fn repository_class(&self) -> String {
        format!("{}Repository", self.model_class)
    }

    pub fn model_pojo_class(&self) -> String {
        format!("{}Model", self.model_class)
    }

    pub fn dto_class(&self) -> String {
        format!("{}DTO", self.model_class)
    }

    pub fn controller_class(&self) -> String {
        format!("{}Controller", self.page_class)
    }

    pub fn service_class(&self) -> String {
        format!("{}Service", self.page_class)
    }

    pub fn service_impl_class(&self) -> String {
        format!("{}ServiceImpl", self.page_class)
    }

    /// Injected field name of the page service, e.g. `tradeInfoService`.
    pub fn service_instance(&self) -> String {
        format!("{}Service", lower_first(&self.page_class))
    }

    /// Entity field matching a query parameter by name and Java type.
    pub fn field_for_param(&self, param: &QueryParam) -> Option<&JavaField> {
        self.fields
            .iter()
            .find(|f| f.name == param.name && f.java_type == param.java_type)
    }
}

fn lookup_schema<'a>(
    page: &str,
    table_name: &str,
    contract: &'a InterfaceContract,
) -> Result<&'a ObjectSchema> {
    let mut expected = vec![upper_camel(page)];
    let by_table = upper_camel(table_name);
    if !expected.contains(&by_table) {
        expected.push(by_table);
    }

    let schemas = &contract.components.schemas;
    expected
        .iter()
        .find_map(|key| schemas.get(key))
        .ok_or_else(|| CodegenError::MissingSchema {
            page: page.to_string(),
            expected: expected.clone(),
            available: schemas.keys().cloned().collect(),
        })
}

fn java_fields(schema: &ObjectSchema) -> Vec<JavaField> {
    let mut taken = HashSet::new();
    schema
        .properties
        .iter()
        .map(|(name, property)| {
            let base = non_empty(small_camel(name), "field");
            let java_name = unique_name(&base, &mut taken);
            JavaField {
                name: name.clone(),
                column: property.column_name.clone().unwrap_or_else(|| name.clone()),
                java_name,
                java_type: if property.java_type.trim().is_empty() {
                    "String".to_string()
                } else {
                    property.java_type.clone()
                },
                label: if property.description.is_empty() {
                    name.clone()
                } else {
                    property.description.clone()
                },
                primary_key: property.primary_key,
            }
        })
        .collect()
}

/// Flagged field first, then well-known key names, then the first field.
fn primary_key_index(fields: &[JavaField]) -> usize {
    if let Some(i) = fields.iter().position(|f| f.primary_key) {
        return i;
    }
    fields
        .iter()
        .position(|f| DEFAULT_PRIMARY_KEY_NAMES.contains(&f.name.to_lowercase().as_str()))
        .unwrap_or(0)
}

fn query_params(contract: &InterfaceContract) -> Vec<QueryParam> {
    let mut seen = HashSet::new();
    let mut params = Vec::new();
    for (_, method, op) in contract.operations() {
        if method != HttpMethod::Get {
            continue;
        }
        for p in &op.parameters {
            let java_name = non_empty(small_camel(&p.name), "param");
            if !seen.insert(java_name.clone()) {
                continue;
            }
            params.push(QueryParam {
                name: p.name.clone(),
                java_name,
                java_type: param_java_type(&p.schema.schema_type).to_string(),
                description: if p.description.is_empty() {
                    p.name.clone()
                } else {
                    p.description.clone()
                },
            });
        }
    }
    params
}

fn param_java_type(openapi_type: &str) -> &'static str {
    match openapi_type {
        "integer" => "Integer",
        "number" => "Double",
        "boolean" => "Boolean",
        _ => "String",
    }
}

fn endpoints(contract: &InterfaceContract) -> Vec<Endpoint> {
    let mut taken = HashSet::new();
    contract
        .operations()
        .map(|(url, method, op)| {
            let path = spring_path(url);
            let id = if op.operation_id.is_empty() {
                format!("{}_{}", method.as_str(), path.replace('/', "_"))
            } else {
                op.operation_id.clone()
            };
            let handler = unique_name(&non_empty(handler_name(&id), "handle"), &mut taken);
            Endpoint {
                path_variables: path_variables(&path),
                path,
                mapping: MappingAnnotation::for_method(&method),
                kind: op.kind,
                handler,
                summary: op.summary.clone(),
                method,
            }
        })
        .collect()
}

/// Converts a contract URL into a Spring path template.
///
/// The scheme and host (or a leading host placeholder) are dropped, the
/// query string is removed and `${name}` placeholders become `{name}` path
/// variables.
///
/// ```
/// use amis_contract_codegen::model::spring_path;
///
/// assert_eq!(spring_path("http://10.0.0.5:8080/api/orders?page=1"), "/api/orders");
/// assert_eq!(spring_path("/api/orders/${id}"), "/api/orders/{id}");
/// assert_eq!(spring_path("${baseUrl}/api/orders"), "/api/orders");
/// assert_eq!(spring_path(""), "/");
/// ```
pub fn spring_path(url: &str) -> String {
    let without_host = match url.find("://") {
        Some(i) => {
            let rest = &url[i + 3..];
            rest.find('/').map_or("", |j| &rest[j..])
        }
        None => url,
    };
    // A leading placeholder stands for the host (`${baseUrl}/api/...`).
    let without_host = match without_host.strip_prefix("${") {
        Some(rest) => rest.find('}').map_or(without_host, |end| &rest[end + 1..]),
        None => without_host,
    };
    let without_query = without_host.split(['?', '#']).next().unwrap_or_default();

    let mut out = String::new();
    let mut rest = without_query.trim();
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        match tail.find('}') {
            Some(end) => {
                out.push('{');
                out.push_str(&identifier(&tail[..end]));
                out.push('}');
                rest = &tail[end + 1..];
            }
            None => {
                rest = tail;
            }
        }
    }
    out.push_str(rest);

    if !out.starts_with('/') {
        out.insert(0, '/');
    }
    out
}

fn path_variables(path: &str) -> Vec<String> {
    let mut vars = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let tail = &rest[start + 1..];
        let Some(end) = tail.find('}') else { break };
        let name = tail[..end].to_string();
        if !name.is_empty() && !vars.contains(&name) {
            vars.push(name);
        }
        rest = &tail[end + 1..];
    }
    vars
}

fn handler_name(operation_id: &str) -> String {
    let cleaned = identifier(operation_id);
    let camel = small_camel(&cleaned);
    match camel.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("op{camel}"),
        _ => camel,
    }
}

/// Keeps ASCII alphanumerics and `_`; everything else becomes `_`.
fn identifier(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Lowercased Java package segment for a system or page name.
///
/// ```
/// use amis_contract_codegen::model::package_segment;
///
/// assert_eq!(package_segment("Trade-Info"), "trade_info");
/// assert_eq!(package_segment("2024report"), "_2024report");
/// ```
pub fn package_segment(name: &str) -> String {
    let segment = identifier(name).to_lowercase();
    match segment.chars().next() {
        None => DEFAULT_ENTITY_NAME.to_lowercase(),
        Some(c) if c.is_ascii_digit() => format!("_{segment}"),
        Some(_) => segment,
    }
}

fn unique_name(base: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{base}{n}");
        n += 1;
    }
    candidate
}

fn non_empty(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

pub(crate) fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub(crate) fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Escapes a value for a Java string literal.
pub(crate) fn java_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
