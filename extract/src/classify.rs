//! Behavior classification for UI nodes.
//!
//! Collects the behavior hints a node declares and decides whether they mark
//! a CRUD-relevant action. UI frameworks use compound behavior names
//! (`bulk-delete`, `inlineEdit`), so a tag is relevant when it *contains* a
//! vocabulary word, not only when it equals one.

use std::collections::BTreeSet;

use serde_json::Value;

/// Closed vocabulary of CRUD verbs recognized inside behavior tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CrudVerb {
    Insert,
    Add,
    Create,
    Edit,
    Update,
    Delete,
    Remove,
    View,
    Query,
    Get,
}

/// Token → verb table. Matching is substring containment on lowercased tags.
const CRUD_VOCABULARY: &[(&str, CrudVerb)] = &[
    ("insert", CrudVerb::Insert),
    ("add", CrudVerb::Add),
    ("create", CrudVerb::Create),
    ("edit", CrudVerb::Edit),
    ("update", CrudVerb::Update),
    ("delete", CrudVerb::Delete),
    ("remove", CrudVerb::Remove),
    ("view", CrudVerb::View),
    ("query", CrudVerb::Query),
    ("get", CrudVerb::Get),
];

/// `actionType` values that count as behavior tags.
pub const RECOGNIZED_ACTION_TYPES: &[&str] = &[
    "add", "insert", "create", "edit", "update", "delete", "remove", "view", "ajax", "submit",
];

const BEHAVIOR_KEYS: &[&str] = &["behavior", "feat"];

/// Lowercased behavior tags declared by one node.
///
/// # Examples
///
/// ```
/// use amis_contract_extract::classify::{CrudVerb, classify};
/// use serde_json::json;
///
/// let tags = classify(&json!({"behavior": ["Bulk-Delete"], "actionType": "ajax"}));
/// assert!(tags.contains("bulk-delete"));
/// assert!(tags.contains("ajax"));
/// assert!(tags.crud_verbs().contains(&CrudVerb::Delete));
/// assert!(tags.is_crud_relevant());
///
/// let plain = classify(&json!({"actionType": "submit"}));
/// assert!(!plain.is_crud_relevant());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BehaviorSet {
    tags: BTreeSet<String>,
}

impl BehaviorSet {
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Every vocabulary verb contained in at least one tag.
    pub fn crud_verbs(&self) -> BTreeSet<CrudVerb> {
        self.tags
            .iter()
            .flat_map(|tag| {
                CRUD_VOCABULARY
                    .iter()
                    .filter(move |(word, _)| tag.contains(word))
                    .map(|(_, verb)| *verb)
            })
            .collect()
    }

    pub fn is_crud_relevant(&self) -> bool {
        self.tags
            .iter()
            .any(|tag| CRUD_VOCABULARY.iter().any(|(word, _)| tag.contains(word)))
    }

    fn insert(&mut self, raw: &str) {
        let tag = raw.trim().to_lowercase();
        if !tag.is_empty() {
            self.tags.insert(tag);
        }
    }

    fn insert_value(&mut self, value: Option<&Value>) {
        match value {
            Some(Value::String(tag)) => self.insert(tag),
            Some(Value::Array(items)) => {
                for tag in items.iter().filter_map(Value::as_str) {
                    self.insert(tag);
                }
            }
            _ => {}
        }
    }
}

/// Collects the behavior tags of `node`.
///
/// Sources, unioned: `behavior` and `feat` (string or list of strings), the
/// same two keys inside `editorSetting`, and `actionType` when it is one of
/// [`RECOGNIZED_ACTION_TYPES`]. Non-object nodes have no tags.
pub fn classify(node: &Value) -> BehaviorSet {
    let mut set = BehaviorSet::default();
    let Some(map) = node.as_object() else {
        return set;
    };

    for key in BEHAVIOR_KEYS {
        set.insert_value(map.get(*key));
    }
    if let Some(editor) = map.get("editorSetting").and_then(Value::as_object) {
        for key in BEHAVIOR_KEYS {
            set.insert_value(editor.get(*key));
        }
    }
    if let Some(action_type) = map.get("actionType").and_then(Value::as_str) {
        let action_type = action_type.trim().to_lowercase();
        if RECOGNIZED_ACTION_TYPES.contains(&action_type.as_str()) {
            set.insert(&action_type);
        }
    }

    set
}
