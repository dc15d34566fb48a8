//! Operation collection inside one located block.
//!
//! The collector walks a block and records every `api` declaration that is
//! reachable through dialogs, drawers, forms, buttons, action lists and event
//! handlers. Output is unreduced: the same (url, method) pair may appear more
//! than once and is collapsed later by the assembler.
//!
//! At every object node the rules apply in this order:
//!
//! 1. an `api` attribute yields an operation when the node's behavior tags
//!    are CRUD-relevant or the method is get/post/put/delete (the block's own
//!    `api` always yields a query);
//! 2. `onEvent` handlers are entered action by action;
//! 3. `dialog`, `drawer` and `form` are entered;
//! 4. `actions`, `body`, `columns`, `buttons` and `items` are entered;
//! 5. every remaining attribute is entered generically.
//!
//! Located blocks nested below the root are skipped; each yields its own
//! contract.

use serde_json::{Map, Value};
use tracing::debug;

use amis_contract_core::{HttpMethod, OperationDescriptor, OperationKind};

use crate::classify::classify;
use crate::diagnostics::ExtractionStats;
use crate::locate::BlockMatcher;
use crate::trace;

const API_KEY: &str = "api";
const EVENT_KEY: &str = "onEvent";
const CONTAINER_KEYS: &[&str] = &["dialog", "drawer", "form"];
const LIST_KEYS: &[&str] = &["actions", "body", "columns", "buttons", "items"];

/// Methods accepted without a CRUD behavior tag.
const PLAIN_METHODS: &[HttpMethod] = &[
    HttpMethod::Get,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Delete,
];

/// Verbs recognized as the `method:` prefix of a shorthand api string.
const SHORTHAND_VERBS: &[&str] = &[
    "get", "post", "put", "delete", "patch", "head", "options", "jsonp", "js",
];

/// An operation together with the node that declared it.
///
/// `descriptor.fields` is empty; the assembler fills it from `origin`.
#[derive(Debug, Clone)]
pub struct DiscoveredOperation<'a> {
    pub descriptor: OperationDescriptor,
    pub origin: &'a Value,
}

/// Result of reading one `api` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiSpec {
    /// A usable declaration. `method` is `None` when not stated.
    Declared { url: String, method: Option<HttpMethod> },
    /// An api object or string with no usable URL.
    NoUrl,
    /// Not an api declaration at all.
    NotApi,
}

/// Reads an `api` attribute: either `{url, method}` or a `"[method:]url"`
/// shorthand string.
///
/// # Examples
///
/// ```
/// use amis_contract_core::HttpMethod;
/// use amis_contract_extract::operations::{ApiSpec, parse_api};
/// use serde_json::json;
///
/// assert_eq!(
///     parse_api(&json!("delete:/api/orders/${id}")),
///     ApiSpec::Declared { url: "/api/orders/${id}".into(), method: Some(HttpMethod::Delete) }
/// );
/// assert_eq!(
///     parse_api(&json!({"url": "http://h/api"})),
///     ApiSpec::Declared { url: "http://h/api".into(), method: None }
/// );
/// assert_eq!(parse_api(&json!({"method": "get"})), ApiSpec::NoUrl);
/// assert_eq!(parse_api(&json!(42)), ApiSpec::NotApi);
/// ```
pub fn parse_api(api: &Value) -> ApiSpec {
    match api {
        Value::Object(map) => {
            let method = map
                .get("method")
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .map(HttpMethod::parse);
            match map.get("url").and_then(Value::as_str).map(str::trim) {
                Some(url) if !url.is_empty() => ApiSpec::Declared {
                    url: url.to_string(),
                    method,
                },
                _ => ApiSpec::NoUrl,
            }
        }
        Value::String(raw) => parse_shorthand(raw),
        _ => ApiSpec::NotApi,
    }
}

fn parse_shorthand(raw: &str) -> ApiSpec {
    let raw = raw.trim();
    let (method, url) = match raw.split_once(':') {
        Some((verb, rest)) if SHORTHAND_VERBS.contains(&verb.trim().to_lowercase().as_str()) => {
            (Some(HttpMethod::parse(verb)), rest.trim())
        }
        _ => (None, raw),
    };
    if url.is_empty() {
        ApiSpec::NoUrl
    } else {
        ApiSpec::Declared {
            url: url.to_string(),
            method,
        }
    }
}

/// Method used when an api does not state one.
fn default_method(node: &Map<String, Value>) -> HttpMethod {
    let is_form = node
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("form"));
    if is_form { HttpMethod::Post } else { HttpMethod::Get }
}

/// Collects every operation reachable from `block`.
///
/// `block_path` is the block's own trace; source paths extend it.
pub fn collect_operations<'a>(
    block: &'a Value,
    block_path: &str,
    matcher: &BlockMatcher,
    stats: &mut ExtractionStats,
) -> Vec<DiscoveredOperation<'a>> {
    let mut collector = Collector {
        matcher,
        stats,
        out: Vec::new(),
    };
    collector.visit(block, block_path.to_string(), true);
    collector.out
}

struct Collector<'m, 's, 'a> {
    matcher: &'m BlockMatcher,
    stats: &'s mut ExtractionStats,
    out: Vec<DiscoveredOperation<'a>>,
}

impl<'a> Collector<'_, '_, 'a> {
    fn visit(&mut self, node: &'a Value, path: String, is_root: bool) {
        match node {
            Value::Object(map) => {
                if !is_root && self.matcher.matches(node) {
                    debug!(path = %path, "Skipping nested block");
                    return;
                }
                self.visit_object(node, map, &path, is_root);
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.visit(item, trace::index(&path, index), false);
                }
            }
            _ => {}
        }
    }

    fn visit_object(
        &mut self,
        node: &'a Value,
        map: &'a Map<String, Value>,
        path: &str,
        is_root: bool,
    ) {
        // Rule 1
        if let Some(api) = map.get(API_KEY) {
            self.record_api(node, map, api, path, is_root);
        }

        // Rule 2
        if let Some(events) = map.get(EVENT_KEY) {
            self.visit_events(events, &trace::key(path, EVENT_KEY));
        }

        // Rule 3
        for key in CONTAINER_KEYS {
            if let Some(value) = map.get(*key) {
                self.visit(value, trace::key(path, key), false);
            }
        }

        // Rule 4
        for key in LIST_KEYS {
            if let Some(value) = map.get(*key) {
                self.visit(value, trace::key(path, key), false);
            }
        }

        // Rule 5
        for (key, value) in map {
            let key = key.as_str();
            if key == API_KEY
                || key == EVENT_KEY
                || CONTAINER_KEYS.contains(&key)
                || LIST_KEYS.contains(&key)
            {
                continue;
            }
            self.visit(value, trace::key(path, key), false);
        }
    }

    fn visit_events(&mut self, events: &'a Value, path: &str) {
        let Some(events) = events.as_object() else {
            self.visit(events, path.to_string(), false);
            return;
        };
        for (event, handler) in events {
            let event_path = trace::key(path, event);
            let actions = match handler {
                Value::Object(handler) => handler.get("actions"),
                Value::Array(_) => Some(handler),
                _ => None,
            };
            match actions {
                Some(Value::Array(actions)) => {
                    for (index, action) in actions.iter().enumerate() {
                        self.visit(action, trace::index(&event_path, index), false);
                    }
                }
                Some(other) => self.visit(other, event_path, false),
                None => {}
            }
        }
    }

    fn record_api(
        &mut self,
        node: &'a Value,
        map: &Map<String, Value>,
        api: &Value,
        path: &str,
        is_root: bool,
    ) {
        let (url, method) = match parse_api(api) {
            ApiSpec::Declared { url, method } => {
                (url, method.unwrap_or_else(|| default_method(map)))
            }
            ApiSpec::NoUrl => {
                self.stats.apis_without_url += 1;
                debug!(path = %path, "Skipping api without url");
                return;
            }
            ApiSpec::NotApi => return,
        };

        let kind = if is_root {
            OperationKind::Query
        } else if classify(node).is_crud_relevant() || PLAIN_METHODS.contains(&method) {
            OperationKind::from_method(&method)
        } else {
            self.stats.ignored_apis += 1;
            debug!(path = %path, url = %url, method = %method, "Ignoring non-CRUD api");
            return;
        };

        debug!(path = %path, url = %url, method = %method, kind = %kind, "Discovered operation");
        self.stats.operations_discovered += 1;
        self.out.push(DiscoveredOperation {
            descriptor: OperationDescriptor::new(url, method, kind, path),
            origin: node,
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn collect(block: &Value) -> (Vec<OperationDescriptor>, ExtractionStats) {
        let matcher = BlockMatcher::new(amis_contract_core::DEFAULT_BLOCK_TYPES);
        let mut stats = ExtractionStats::default();
        let ops = collect_operations(block, "$", &matcher, &mut stats)
            .into_iter()
            .map(|op| op.descriptor)
            .collect();
        (ops, stats)
    }

    #[test]
    fn test_root_api_is_always_query() {
        let (ops, _) = collect(&json!({
            "type": "crud",
            "api": {"url": "/api/orders", "method": "post"}
        }));
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, OperationKind::Query);
        assert_eq!(ops[0].method, HttpMethod::Post);
        assert_eq!(ops[0].source_path, "$");
    }

    #[test]
    fn test_nested_dialog_and_delete_button() {
        let block = json!({
            "type": "crud",
            "api": "/api/orders",
            "columns": [
                {"name": "id"},
                {"type": "operation", "buttons": [
                    {"actionType": "dialog", "dialog": {"body": {
                        "type": "form",
                        "api": "put:/api/orders/${id}",
                        "body": [{"name": "amount"}]
                    }}},
                    {"actionType": "ajax", "api": {"url": "/api/orders/${id}", "method": "delete"}}
                ]}
            ]
        });
        let (ops, stats) = collect(&block);
        let summary: Vec<(OperationKind, &str)> =
            ops.iter().map(|op| (op.kind, op.source_path.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (OperationKind::Query, "$"),
                (OperationKind::Edit, "$.columns[1].buttons[0].dialog.body"),
                (OperationKind::Delete, "$.columns[1].buttons[1]"),
            ]
        );
        assert_eq!(stats.operations_discovered, 3);
    }

    #[test]
    fn test_form_defaults_to_post() {
        let block = json!({"type": "crud", "headerToolbar": [
            {"type": "button", "drawer": {"body": {"type": "form", "api": "/api/orders/add"}}}
        ]});
        let (ops, _) = collect(&block);
        assert_eq!(ops[0].method, HttpMethod::Post);
        assert_eq!(ops[0].kind, OperationKind::Add);
        assert_eq!(ops[0].source_path, "$.headerToolbar[0].drawer.body");
    }

    #[test]
    fn test_event_handlers_are_followed() {
        let block = json!({"type": "crud", "columns": [{"type": "button", "onEvent": {
            "click": {"actions": [
                {"actionType": "toast"},
                {"actionType": "ajax", "api": {"url": "/api/orders/export", "method": "post"}}
            ]},
            "dblclick": [{"actionType": "ajax", "api": "get:/api/orders/${id}"}]
        }}]});
        let (ops, _) = collect(&block);
        let paths: Vec<&str> = ops.iter().map(|op| op.source_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["$.columns[0].onEvent.click[1]", "$.columns[0].onEvent.dblclick[0]"]
        );
        assert_eq!(ops[1].kind, OperationKind::View);
    }

    #[test]
    fn test_non_crud_method_needs_behavior() {
        let block = json!({"type": "crud", "toolbar": [
            {"api": {"url": "/api/a", "method": "patch"}},
            {"behavior": "inlineEdit", "api": {"url": "/api/b", "method": "patch"}}
        ]});
        let (ops, stats) = collect(&block);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].url, "/api/b");
        assert_eq!(ops[0].kind, OperationKind::View);
        assert_eq!(stats.ignored_apis, 1);
    }

    #[test]
    fn test_api_without_url_is_counted() {
        let (ops, stats) = collect(&json!({
            "type": "crud",
            "api": {"method": "get"},
            "buttons": [{"api": ""}]
        }));
        assert!(ops.is_empty());
        assert_eq!(stats.apis_without_url, 2);
    }

    #[test]
    fn test_nested_block_is_not_entered() {
        let block = json!({"type": "crud", "api": "/api/outer", "body": [
            {"type": "table", "api": "/api/inner", "columns": [
                {"buttons": [{"api": "delete:/api/inner"}]}
            ]}
        ]});
        let (ops, _) = collect(&block);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].url, "/api/outer");
    }

    #[test]
    fn test_shorthand_without_verb_keeps_protocol() {
        assert_eq!(
            parse_api(&json!("http://h/api/orders")),
            ApiSpec::Declared {
                url: "http://h/api/orders".to_string(),
                method: None
            }
        );
        assert_eq!(parse_api(&json!("post:  ")), ApiSpec::NoUrl);
    }
}
