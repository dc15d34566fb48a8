//! Block location: finds every list/table/grid container in a document.

use serde_json::Value;

use crate::trace;

/// Recognizes block nodes by their declared `type`.
///
/// A node is a block when it is an object whose `type` string,
/// case-insensitively, starts with one of the configured prefixes.
///
/// # Examples
///
/// ```
/// use amis_contract_extract::locate::BlockMatcher;
/// use serde_json::json;
///
/// let matcher = BlockMatcher::new(["crud", "table"]);
/// assert!(matcher.matches(&json!({"type": "CRUD"})));
/// assert!(matcher.matches(&json!({"type": "crud2"})));
/// assert!(!matcher.matches(&json!({"type": "input-table"})));
/// assert!(!matcher.matches(&json!(["crud"])));
/// ```
#[derive(Debug, Clone)]
pub struct BlockMatcher {
    prefixes: Vec<String>,
}

impl BlockMatcher {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|prefix| prefix.as_ref().trim().to_lowercase())
            .filter(|prefix| !prefix.is_empty())
            .collect();
        Self { prefixes }
    }

    /// Returns the matched block type (lowercased) when `node` is a block.
    pub fn block_type(&self, node: &Value) -> Option<String> {
        let declared = node.as_object()?.get("type")?.as_str()?.trim().to_lowercase();
        self.prefixes
            .iter()
            .any(|prefix| declared.starts_with(prefix.as_str()))
            .then_some(declared)
    }

    pub fn matches(&self, node: &Value) -> bool {
        self.block_type(node).is_some()
    }
}

/// A block found in a document, with its trace.
#[derive(Debug, Clone)]
pub struct LocatedBlock<'a> {
    pub node: &'a Value,
    /// Trace from the document root (`$.body[0]`).
    pub path: String,
    /// Declared `type`, lowercased.
    pub block_type: String,
}

/// Collects every block in depth-first pre-order.
///
/// Traversal continues below a located block, so nested blocks are reported
/// too, each after its enclosing block.
pub fn locate_blocks<'a>(document: &'a Value, matcher: &BlockMatcher) -> Vec<LocatedBlock<'a>> {
    let mut blocks = Vec::new();
    walk(document, trace::ROOT.to_string(), matcher, &mut blocks);
    blocks
}

fn walk<'a>(
    node: &'a Value,
    path: String,
    matcher: &BlockMatcher,
    out: &mut Vec<LocatedBlock<'a>>,
) {
    match node {
        Value::Object(map) => {
            if let Some(block_type) = matcher.block_type(node) {
                out.push(LocatedBlock {
                    node,
                    path: path.clone(),
                    block_type,
                });
            }
            for (key, value) in map {
                walk(value, trace::key(&path, key), matcher, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, trace::index(&path, index), matcher, out);
            }
        }
        _ => {}
    }
}
