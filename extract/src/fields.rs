//! Field extraction from UI field lists.

use indexmap::IndexSet;
use serde_json::Value;

use amis_contract_core::{FieldDescriptor, FieldType};

use crate::diagnostics::ExtractionStats;
use crate::locate::BlockMatcher;

/// Control types inferred as [`FieldType::Date`].
const DATE_CONTROLS: &[&str] = &[
    "input-date",
    "input-datetime",
    "date",
    "datetime",
    "input-date-range",
    "input-datetime-range",
    "input-time",
    "input-month",
    "input-year",
    "input-quarter",
];

/// Control types inferred as [`FieldType::Integer`].
const INTEGER_CONTROLS: &[&str] = &["input-number", "number", "input-range", "input-rating"];

/// Keys holding a form's field list, in lookup order.
const FORM_FIELD_KEYS: &[&str] = &["body", "controls"];

/// Infers a field type from a UI control type.
///
/// # Examples
///
/// ```
/// use amis_contract_core::FieldType;
/// use amis_contract_extract::fields::infer_field_type;
///
/// assert_eq!(infer_field_type(Some("input-datetime")), FieldType::Date);
/// assert_eq!(infer_field_type(Some("Input-Number")), FieldType::Integer);
/// assert_eq!(infer_field_type(Some("select")), FieldType::String);
/// assert_eq!(infer_field_type(None), FieldType::String);
/// ```
pub fn infer_field_type(control_type: Option<&str>) -> FieldType {
    let Some(control_type) = control_type else {
        return FieldType::String;
    };
    let control_type = control_type.trim().to_ascii_lowercase();
    if DATE_CONTROLS.contains(&control_type.as_str()) {
        FieldType::Date
    } else if INTEGER_CONTROLS.contains(&control_type.as_str()) {
        FieldType::Integer
    } else {
        FieldType::String
    }
}

/// Builds a descriptor from one field-list entry.
///
/// Returns `None` unless the entry is an object with a non-empty string
/// `name`. `label` and `columnName` are used only when they are strings.
pub fn field_from_node(node: &Value) -> Option<FieldDescriptor> {
    let map = node.as_object()?;
    let name = map.get("name")?.as_str()?;
    if name.trim().is_empty() {
        return None;
    }

    let mut field = FieldDescriptor::new(name)
        .with_type(infer_field_type(map.get("type").and_then(Value::as_str)));
    if let Some(label) = map.get("label").and_then(Value::as_str) {
        field = field.with_label(label);
    }
    if let Some(column) = map
        .get("columnName")
        .and_then(Value::as_str)
        .filter(|column| !column.trim().is_empty())
    {
        field = field.with_column_name(column);
    }
    Some(field)
}

/// Extracts descriptors from a field list, in list order.
///
/// A non-sequence input yields nothing; entries without a usable `name` are
/// skipped. Both cases are counted in `stats`.
pub fn extract_fields(list: &Value, stats: &mut ExtractionStats) -> Vec<FieldDescriptor> {
    let Some(items) = list.as_array() else {
        stats.non_sequence_field_lists += 1;
        return Vec::new();
    };

    let mut fields = Vec::with_capacity(items.len());
    for item in items {
        match field_from_node(item) {
            Some(field) => fields.push(field),
            None => stats.unnamed_field_entries += 1,
        }
    }
    fields
}

/// Collects every distinct string `name` in the block's subtree.
///
/// Used when a block declares no column list. Each name becomes a
/// [`FieldType::String`] descriptor, in depth-first discovery order. Nested
/// blocks below `block` are not entered.
pub fn collect_named_fields(block: &Value, matcher: &BlockMatcher) -> Vec<FieldDescriptor> {
    let mut names = IndexSet::new();
    walk_names(block, true, matcher, &mut names);
    names.into_iter().map(FieldDescriptor::new).collect()
}

fn walk_names(node: &Value, is_root: bool, matcher: &BlockMatcher, names: &mut IndexSet<String>) {
    match node {
        Value::Object(map) => {
            if !is_root && matcher.matches(node) {
                return;
            }
            if let Some(name) = map
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.trim().is_empty())
            {
                names.insert(name.to_string());
            }
            for value in map.values() {
                walk_names(value, false, matcher, names);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_names(item, false, matcher, names);
            }
        }
        _ => {}
    }
}

/// Field set declared by the block's `columns`, with the subtree fallback.
///
/// Returns the fields and whether the fallback was used.
pub fn block_fields(
    block: &Value,
    matcher: &BlockMatcher,
    stats: &mut ExtractionStats,
) -> (Vec<FieldDescriptor>, bool) {
    if let Some(columns) = block.get("columns") {
        let fields = extract_fields(columns, stats);
        if !fields.is_empty() {
            return (fields, false);
        }
    }
    stats.fallback_field_collections += 1;
    (collect_named_fields(block, matcher), true)
}

/// Filter fields of a block's own query.
///
/// `filter.body` via [`extract_fields`], else `filterEnabledList` entries
/// `{value, label}` as string fields. `None` when the block declares neither.
pub fn filter_fields(block: &Value, stats: &mut ExtractionStats) -> Option<Vec<FieldDescriptor>> {
    if let Some(body) = block.get("filter").and_then(|filter| filter.get("body")) {
        let fields = extract_fields(body, stats);
        if !fields.is_empty() {
            return Some(fields);
        }
    }

    let enabled = block.get("filterEnabledList")?.as_array()?;
    let fields: Vec<FieldDescriptor> = enabled
        .iter()
        .filter_map(|entry| {
            let value = entry.get("value")?.as_str()?;
            if value.trim().is_empty() {
                return None;
            }
            let field = FieldDescriptor::new(value);
            Some(match entry.get("label").and_then(Value::as_str) {
                Some(label) => field.with_label(label),
                None => field,
            })
        })
        .collect();
    (!fields.is_empty()).then_some(fields)
}

/// Form fields declared by the node that carries an `api`.
///
/// Reads the first present of `body` and `controls`. `None` when the node
/// declares no field list or the list names no fields.
pub fn form_fields(origin: &Value, stats: &mut ExtractionStats) -> Option<Vec<FieldDescriptor>> {
    let list = FORM_FIELD_KEYS.iter().find_map(|key| origin.get(*key))?;
    // A single nested form (`body: {type: form, body: [...]}`).
    if list.is_object() {
        return form_fields(list, stats);
    }
    let fields = extract_fields(list, stats);
    (!fields.is_empty()).then_some(fields)
}
