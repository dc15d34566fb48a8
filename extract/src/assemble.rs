//! Contract assembly for one located block.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use amis_contract_core::naming::BlockNaming;
use amis_contract_core::{
    ExtractionSettings, FieldDescriptor, FieldSet, HttpMethod, InterfaceContract,
    JSON_MEDIA_TYPE, MediaSchema, MediaType, ObjectSchema, OperationDescriptor, OperationKind,
    Parameter, PathOperation, RequestBody, Response, SchemaProperty,
};

use crate::diagnostics::{BlockSummary, ExtractionStats, OperationSummary};
use crate::fields;
use crate::locate::{BlockMatcher, LocatedBlock};
use crate::operations::{DiscoveredOperation, collect_operations};
use crate::url::normalize_url;

const SYNTHESIZED_KEY_NAME: &str = "id";
const SYNTHESIZED_KEY_LABEL: &str = "Primary key";

/// Builds the contract for one block.
///
/// Operations are collected, URL-normalized and deduplicated by
/// (url, method) keeping the first seen. Each retained operation gets its
/// fields from context, and the schema merges the block's field set with
/// every operation's fields under the configured merge policy.
pub fn assemble(
    block: &LocatedBlock<'_>,
    naming: &BlockNaming,
    settings: &ExtractionSettings,
    matcher: &BlockMatcher,
    stats: &mut ExtractionStats,
) -> InterfaceContract {
    let discovered = collect_operations(block.node, &block.path, matcher, stats);
    let (block_fields, fallback_fields) = fields::block_fields(block.node, matcher, stats);

    let mut key_name = configured_key(&block_fields, settings).map(|f| f.name.clone());
    let mut seen: HashSet<(String, HttpMethod)> = HashSet::new();
    let mut retained: Vec<OperationDescriptor> = Vec::new();
    for DiscoveredOperation { mut descriptor, origin } in discovered {
        descriptor.url = normalize_url(
            &descriptor.url,
            &settings.url_placeholder,
            settings.base_url.as_deref(),
        );
        let (url, method) = descriptor.key();
        if !seen.insert((url.to_string(), method.clone())) {
            stats.duplicate_operations += 1;
            debug!(
                url = %descriptor.url,
                method = %descriptor.method,
                path = %descriptor.source_path,
                "Collapsing duplicate operation"
            );
            continue;
        }

        descriptor.fields = match descriptor.kind {
            OperationKind::Query => fields::filter_fields(block.node, stats),
            OperationKind::Add | OperationKind::Edit | OperationKind::View => {
                fields::form_fields(origin, stats)
            }
            OperationKind::Delete => {
                let key = primary_key_field(&block_fields, settings, stats);
                key_name.get_or_insert_with(|| key.name.clone());
                Some(vec![key])
            }
        }
        .unwrap_or_else(|| block_fields.clone());
        retained.push(descriptor);
    }

    let mut schema_fields = FieldSet::new(settings.field_merge);
    schema_fields.extend(block_fields);
    for op in &retained {
        schema_fields.extend(op.fields.iter().cloned());
    }

    let mut contract = InterfaceContract::new(&naming.title, &naming.table_name);
    let mut schema = ObjectSchema::from_fields(schema_fields.iter());
    if let Some(property) = key_name.and_then(|name| schema.properties.get_mut(&name)) {
        property.primary_key = true;
    }
    contract.set_schema(schema);
    for op in &retained {
        contract.insert_operation(&op.url, &op.method, path_operation(op, &naming.title));
    }

    debug!(
        path = %block.path,
        title = %naming.title,
        operations = retained.len(),
        fields = schema_fields.len(),
        "Assembled contract"
    );
    stats.blocks.push(BlockSummary {
        path: block.path.clone(),
        block_type: block.block_type.clone(),
        title: naming.title.clone(),
        table_name: naming.table_name.clone(),
        fields: schema_fields.names().into_iter().map(String::from).collect(),
        fallback_fields,
        operations: retained
            .into_iter()
            .map(|op| OperationSummary {
                method: op.method,
                url: op.url,
                kind: op.kind,
                source_path: op.source_path,
            })
            .collect(),
    });

    contract
}

/// First block field whose lowercased name is a configured primary-key
/// candidate.
fn configured_key<'a>(
    block_fields: &'a [FieldDescriptor],
    settings: &ExtractionSettings,
) -> Option<&'a FieldDescriptor> {
    let candidates: Vec<String> = settings
        .primary_key_names
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();
    block_fields
        .iter()
        .find(|field| candidates.contains(&field.name.to_lowercase()))
}

/// The configured key field, else a synthesized `id`.
fn primary_key_field(
    block_fields: &[FieldDescriptor],
    settings: &ExtractionSettings,
    stats: &mut ExtractionStats,
) -> FieldDescriptor {
    configured_key(block_fields, settings)
        .cloned()
        .unwrap_or_else(|| {
            stats.synthesized_keys += 1;
            FieldDescriptor::new(SYNTHESIZED_KEY_NAME).with_label(SYNTHESIZED_KEY_LABEL)
        })
}

fn path_operation(op: &OperationDescriptor, title: &str) -> PathOperation {
    let mut entry = PathOperation {
        tags: vec![title.to_string()],
        summary: format!("{} {title}", op.kind.verb()),
        operation_id: operation_id(&op.method, &op.url),
        kind: op.kind,
        source_path: Some(op.source_path.clone()),
        parameters: Vec::new(),
        request_body: None,
        responses: IndexMap::new(),
    };

    match op.method {
        HttpMethod::Delete => {
            entry.parameters = op
                .fields
                .iter()
                .map(|field| Parameter::query(field, true))
                .collect();
            entry
                .responses
                .insert("200".to_string(), success("Deleted"));
        }
        ref method if method.carries_body() => {
            let properties = op
                .fields
                .iter()
                .map(|field| (field.name.clone(), SchemaProperty::from_field(field)))
                .collect();
            entry.request_body = Some(RequestBody {
                content: json_content(MediaSchema {
                    reference: None,
                    schema_type: Some("object".to_string()),
                    properties,
                }),
            });
            entry
                .responses
                .insert("200".to_string(), success("Operation succeeded"));
        }
        _ => {
            entry.parameters = op
                .fields
                .iter()
                .map(|field| Parameter::query(field, false))
                .collect();
            entry.responses.insert(
                "200".to_string(),
                Response {
                    description: "Query succeeded".to_string(),
                    content: json_content(MediaSchema {
                        reference: Some(format!("#/components/schemas/{title}")),
                        ..Default::default()
                    }),
                },
            );
        }
    }

    entry
}

fn json_content(schema: MediaSchema) -> IndexMap<String, MediaType> {
    IndexMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}

fn success(description: &str) -> Response {
    Response {
        description: description.to_string(),
        content: IndexMap::new(),
    }
}

/// `<method>_<url slug>`, e.g. `put_api_orders_id`.
fn operation_id(method: &HttpMethod, url: &str) -> String {
    let path = url
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map_or("", |(_, path)| path))
        .unwrap_or(url);

    let mut slug = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');

    if slug.is_empty() {
        method.to_string()
    } else {
        format!("{method}_{slug}")
    }
}
