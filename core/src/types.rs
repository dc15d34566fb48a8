//! Contract type definitions for page-to-interface extraction.
//!
//! This module defines the data model shared by the extraction engine and the
//! rendering stage. Field and operation descriptors are transient values
//! produced while one block is processed; [`InterfaceContract`] is the
//! persisted result and serializes to an OpenAPI 3.0 shaped document.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// OpenAPI version written into every contract.
pub const CONTRACT_OPENAPI_VERSION: &str = "3.0.0";

/// Version of the contract document format (semver).
///
/// Stored in `info.version` of every [`InterfaceContract`].
pub const CONTRACT_INFO_VERSION: &str = "1.0.0";

/// Media type used for request and response bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Inferred value type of a field.
///
/// Inference is heuristic and keyed on the UI control type; it is never
/// authoritative.
///
/// # Examples
///
/// ```
/// use amis_contract_core::FieldType;
///
/// assert_eq!(FieldType::default(), FieldType::String);
/// assert_eq!(FieldType::Date.java_type(), "java.util.Date");
/// assert_eq!(FieldType::from_java_type("Integer"), FieldType::Integer);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FieldType {
    /// Free text (the default for unknown or absent control types).
    #[default]
    String,
    /// Whole number.
    Integer,
    /// Date or timestamp.
    Date,
}

impl FieldType {
    /// Java type name used by generated backend code.
    pub fn java_type(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Date => "java.util.Date",
        }
    }

    /// OpenAPI primitive type.
    pub fn openapi_type(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String | Self::Date => "string",
        }
    }

    /// OpenAPI format qualifier, when one applies.
    pub fn openapi_format(self) -> Option<&'static str> {
        match self {
            Self::Date => Some("date-time"),
            Self::String | Self::Integer => None,
        }
    }

    /// Maps a Java type name back to a field type. Unknown names map to
    /// [`FieldType::String`].
    pub fn from_java_type(java_type: &str) -> Self {
        match java_type.trim() {
            "Integer" | "int" | "Long" | "long" | "java.lang.Integer" | "java.lang.Long" => {
                Self::Integer
            }
            "java.util.Date" | "Date" | "java.time.LocalDateTime" => Self::Date,
            _ => Self::String,
        }
    }
}

/// Normalized field record produced by the field extractor.
///
/// # Examples
///
/// ```
/// use amis_contract_core::{FieldDescriptor, FieldType};
///
/// let field = FieldDescriptor::new("amount").with_type(FieldType::Integer);
/// assert_eq!(field.column_name, "amount");
/// assert_eq!(field.label, "amount");
/// assert_eq!(field.field_type, FieldType::Integer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field key, unique within one contract.
    pub name: String,
    /// Storage column name (defaults to `name`).
    pub column_name: String,
    /// Inferred value type.
    pub field_type: FieldType,
    /// Display label (defaults to `name`).
    pub label: String,
}

impl FieldDescriptor {
    /// Creates a string field whose column name and label default to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column_name: name.clone(),
            label: name.clone(),
            name,
            field_type: FieldType::String,
        }
    }

    /// Sets the inferred type.
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the storage column name.
    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = column_name.into();
        self
    }
}

/// HTTP method of a discovered operation.
///
/// Parsing is case-insensitive and never fails; unrecognized verbs are kept
/// as [`HttpMethod::Other`]. Serializes as the lowercase verb.
///
/// # Examples
///
/// ```
/// use amis_contract_core::HttpMethod;
///
/// assert_eq!(HttpMethod::parse("PUT"), HttpMethod::Put);
/// assert_eq!(HttpMethod::parse(" Delete "), HttpMethod::Delete);
/// assert_eq!(HttpMethod::parse("jsonp").as_str(), "jsonp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    /// Any other verb, stored lowercased.
    Other(String),
}

impl HttpMethod {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        match lower.as_str() {
            "get" => Self::Get,
            "post" => Self::Post,
            "put" => Self::Put,
            "delete" => Self::Delete,
            "patch" => Self::Patch,
            "head" => Self::Head,
            "options" => Self::Options,
            _ => Self::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
            Self::Other(verb) => verb,
        }
    }

    /// Returns `true` for verbs whose payload travels in a request body.
    pub fn carries_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// CRUD-like role of an operation.
///
/// # Examples
///
/// ```
/// use amis_contract_core::{HttpMethod, OperationKind};
///
/// assert_eq!(OperationKind::from_method(&HttpMethod::Post), OperationKind::Add);
/// assert_eq!(OperationKind::from_method(&HttpMethod::Put), OperationKind::Edit);
/// assert_eq!(OperationKind::from_method(&HttpMethod::Patch), OperationKind::View);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// The block's own data-loading call.
    Query,
    Add,
    Edit,
    Delete,
    /// Per-row read, and the fallback for unmapped verbs.
    View,
}

impl OperationKind {
    /// Derives the kind from a method for every call except the block's own
    /// data source, which is always [`OperationKind::Query`].
    pub fn from_method(method: &HttpMethod) -> Self {
        match method {
            HttpMethod::Post => Self::Add,
            HttpMethod::Put => Self::Edit,
            HttpMethod::Delete => Self::Delete,
            _ => Self::View,
        }
    }

    /// Verb used in generated summaries.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Add => "Add",
            Self::Edit => "Edit",
            Self::Delete => "Delete",
            Self::View => "View",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Add => write!(f, "add"),
            Self::Edit => write!(f, "edit"),
            Self::Delete => write!(f, "delete"),
            Self::View => write!(f, "view"),
        }
    }
}

/// One network call discovered inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub url: String,
    pub method: HttpMethod,
    pub kind: OperationKind,
    /// Fields sent or filtered by this call, in discovery order.
    pub fields: Vec<FieldDescriptor>,
    /// Trace of where in the document the call was found (e.g.
    /// `$.columns[1].buttons[0].dialog.body`).
    pub source_path: String,
}

impl OperationDescriptor {
    pub fn new(
        url: impl Into<String>,
        method: HttpMethod,
        kind: OperationKind,
        source_path: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            method,
            kind,
            fields: Vec::new(),
            source_path: source_path.into(),
        }
    }

    /// Deduplication key: operations are unique per (url, method).
    pub fn key(&self) -> (&str, &HttpMethod) {
        (self.url.as_str(), &self.method)
    }
}

/// `info` section of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractInfo {
    /// Entity name, also the key of the contract's schema.
    pub title: String,
    #[serde(rename = "tableName")]
    pub table_name: String,
    pub version: String,
}

/// Schema entry for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "javaType", default = "default_java_type")]
    pub java_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "columnName", default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    /// Marks the entity identifier for generated persistence code.
    #[serde(rename = "primaryKey", default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

fn default_java_type() -> String {
    FieldType::String.java_type().to_string()
}

impl SchemaProperty {
    pub fn from_field(field: &FieldDescriptor) -> Self {
        Self {
            schema_type: field.field_type.openapi_type().to_string(),
            format: field.field_type.openapi_format().map(String::from),
            java_type: field.field_type.java_type().to_string(),
            description: field.label.clone(),
            column_name: Some(field.column_name.clone()),
            primary_key: false,
        }
    }

    /// Rebuilds the field descriptor stored under `name`.
    pub fn to_field(&self, name: &str) -> FieldDescriptor {
        let label = if self.description.is_empty() {
            name.to_string()
        } else {
            self.description.clone()
        };
        FieldDescriptor {
            name: name.to_string(),
            column_name: self
                .column_name
                .clone()
                .unwrap_or_else(|| name.to_string()),
            field_type: FieldType::from_java_type(&self.java_type),
            label,
        }
    }
}

/// Object schema: an ordered mapping from field name to property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(rename = "type", default = "object_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: IndexMap<String, SchemaProperty>,
}

fn object_type() -> String {
    "object".to_string()
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self {
            schema_type: object_type(),
            properties: IndexMap::new(),
        }
    }
}

impl ObjectSchema {
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a FieldDescriptor>) -> Self {
        let mut schema = Self::default();
        for field in fields {
            schema
                .properties
                .entry(field.name.clone())
                .or_insert_with(|| SchemaProperty::from_field(field));
        }
        schema
    }

    /// Field descriptors in schema order.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        self.properties
            .iter()
            .map(|(name, property)| property.to_field(name))
            .collect()
    }
}

/// Type of a query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Query parameter of a path operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: ParameterSchema,
    #[serde(default)]
    pub description: String,
}

impl Parameter {
    pub fn query(field: &FieldDescriptor, required: bool) -> Self {
        Self {
            name: field.name.clone(),
            location: "query".to_string(),
            required,
            schema: ParameterSchema {
                schema_type: field.field_type.openapi_type().to_string(),
                format: field.field_type.openapi_format().map(String::from),
            },
            description: field.label.clone(),
        }
    }
}

/// Body schema: either an inline object or a `$ref` to a component schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaSchema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaProperty>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: MediaSchema,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// One method entry under a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathOperation {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "operationId", default)]
    pub operation_id: String,
    #[serde(rename = "x-operation-kind")]
    pub kind: OperationKind,
    #[serde(rename = "x-source-path", default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

/// `components` section of a contract.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, ObjectSchema>,
}

/// Normalized interface contract for one located block.
///
/// Paths map URL → method → operation. Both levels keep first-discovery
/// order, and a (url, method) pair appears at most once.
///
/// # Examples
///
/// ```
/// use amis_contract_core::*;
///
/// let mut contract = InterfaceContract::new("Orders", "ORDERS");
/// contract.set_schema(ObjectSchema::from_fields(&[FieldDescriptor::new("id")]));
///
/// assert_eq!(contract.title(), "Orders");
/// assert_eq!(contract.table_name(), "ORDERS");
/// assert!(contract.schema().unwrap().properties.contains_key("id"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceContract {
    pub openapi: String,
    pub info: ContractInfo,
    #[serde(default)]
    pub paths: IndexMap<String, IndexMap<String, PathOperation>>,
    #[serde(default)]
    pub components: Components,
}

impl InterfaceContract {
    pub fn new(title: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            openapi: CONTRACT_OPENAPI_VERSION.to_string(),
            info: ContractInfo {
                title: title.into(),
                table_name: table_name.into(),
                version: CONTRACT_INFO_VERSION.to_string(),
            },
            paths: IndexMap::new(),
            components: Components::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn table_name(&self) -> &str {
        &self.info.table_name
    }

    /// Schema stored under the contract's title.
    pub fn schema(&self) -> Option<&ObjectSchema> {
        self.components.schemas.get(&self.info.title)
    }

    /// Stores `schema` under the contract's title, replacing any previous one.
    pub fn set_schema(&mut self, schema: ObjectSchema) {
        self.components
            .schemas
            .insert(self.info.title.clone(), schema);
    }

    /// Inserts an operation unless the (url, method) pair already exists.
    ///
    /// Returns `false` when the pair was already present; the existing entry
    /// is kept.
    pub fn insert_operation(
        &mut self,
        url: &str,
        method: &HttpMethod,
        operation: PathOperation,
    ) -> bool {
        let methods = self.paths.entry(url.to_string()).or_default();
        if methods.contains_key(method.as_str()) {
            return false;
        }
        methods.insert(method.as_str().to_string(), operation);
        true
    }

    pub fn operation(&self, url: &str, method: &HttpMethod) -> Option<&PathOperation> {
        self.paths.get(url)?.get(method.as_str())
    }

    /// Total number of (url, method) entries.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(IndexMap::len).sum()
    }

    /// Iterates `(url, method, operation)` in path order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &PathOperation)> {
        self.paths.iter().flat_map(|(url, methods)| {
            methods
                .iter()
                .map(move |(method, op)| (url.as_str(), HttpMethod::parse(method), op))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_operation(kind: OperationKind) -> PathOperation {
        PathOperation {
            tags: vec!["Orders".to_string()],
            summary: format!("{} Orders", kind.verb()),
            operation_id: "op".to_string(),
            kind,
            source_path: None,
            parameters: Vec::new(),
            request_body: None,
            responses: IndexMap::new(),
        }
    }

    #[test]
    fn test_http_method_serde_is_lowercase() {
        let json = serde_json::to_string(&HttpMethod::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
        let back: HttpMethod = serde_json::from_str("\"POST\"").unwrap();
        assert_eq!(back, HttpMethod::Post);
        let other: HttpMethod = serde_json::from_str("\"jsonp\"").unwrap();
        assert_eq!(other, HttpMethod::Other("jsonp".to_string()));
    }

    #[test]
    fn test_operation_kind_display_matches_serde() {
        for kind in [
            OperationKind::Query,
            OperationKind::Add,
            OperationKind::Edit,
            OperationKind::Delete,
            OperationKind::View,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_insert_operation_keeps_first_entry() {
        let mut contract = InterfaceContract::new("Orders", "ORDERS");
        assert!(contract.insert_operation(
            "/api/orders",
            &HttpMethod::Post,
            sample_operation(OperationKind::Add)
        ));
        assert!(!contract.insert_operation(
            "/api/orders",
            &HttpMethod::Post,
            sample_operation(OperationKind::View)
        ));

        assert_eq!(contract.operation_count(), 1);
        let kept = contract
            .operation("/api/orders", &HttpMethod::Post)
            .unwrap();
        assert_eq!(kept.kind, OperationKind::Add);
    }

    #[test]
    fn test_contract_serializes_openapi_shape() {
        let mut contract = InterfaceContract::new("Orders", "ORDERS");
        contract.set_schema(ObjectSchema::from_fields(&[
            FieldDescriptor::new("created").with_type(FieldType::Date)
        ]));
        contract.insert_operation(
            "/api/orders",
            &HttpMethod::Get,
            sample_operation(OperationKind::Query),
        );

        let value = serde_json::to_value(&contract).unwrap();
        assert_eq!(value["openapi"], "3.0.0");
        assert_eq!(value["info"]["tableName"], "ORDERS");
        assert_eq!(
            value["paths"]["/api/orders"]["get"]["x-operation-kind"],
            "query"
        );
        let created = &value["components"]["schemas"]["Orders"]["properties"]["created"];
        assert_eq!(created["javaType"], "java.util.Date");
        assert_eq!(created["format"], "date-time");
        assert_eq!(created["columnName"], "created");
    }

    #[test]
    fn test_schema_property_round_trips_field() {
        let field = FieldDescriptor::new("amount")
            .with_type(FieldType::Integer)
            .with_label("Amount")
            .with_column_name("AMOUNT");
        let property = SchemaProperty::from_field(&field);
        assert_eq!(property.to_field("amount"), field);
    }

    #[test]
    fn test_legacy_property_without_column_name() {
        let property: SchemaProperty = serde_json::from_str(
            r#"{"type": "string", "javaType": "Integer", "description": "数量"}"#,
        )
        .unwrap();
        let field = property.to_field("qty");
        assert_eq!(field.column_name, "qty");
        assert_eq!(field.field_type, FieldType::Integer);
        assert_eq!(field.label, "数量");
    }
}
