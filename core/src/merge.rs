//! Field merging with a configurable conflict policy.
//!
//! The same field name is often discovered more than once per block: once in
//! the column list and again in an edit form or a filter. [`FieldSet`]
//! collapses these into one ordered set keyed by name, using a
//! [`FieldMergePolicy`] to decide which metadata survives.
//!
//! # Example
//!
//! ```
//! use amis_contract_core::*;
//!
//! let mut set = FieldSet::new(FieldMergePolicy::FirstSeen);
//! set.insert(FieldDescriptor::new("id").with_label("ID"));
//! set.insert(FieldDescriptor::new("amount").with_type(FieldType::Integer));
//! set.insert(FieldDescriptor::new("id").with_label("Identifier"));
//!
//! assert_eq!(set.len(), 2);
//! assert_eq!(set.get("id").unwrap().label, "ID");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::FieldDescriptor;

/// Conflict policy for repeated field names.
///
/// Position in the set is always the first-discovery position; the policy
/// only selects which descriptor is stored there.
///
/// # Examples
///
/// ```
/// use amis_contract_core::*;
///
/// let mut last = FieldSet::new(FieldMergePolicy::LastSeen);
/// last.insert(FieldDescriptor::new("id").with_label("ID"));
/// last.insert(FieldDescriptor::new("id").with_label("Identifier"));
/// assert_eq!(last.get("id").unwrap().label, "Identifier");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMergePolicy {
    /// Keep the first descriptor seen (column metadata stays authoritative).
    #[default]
    FirstSeen,
    /// Replace with the most recent descriptor.
    LastSeen,
}

/// Ordered, name-unique collection of field descriptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    policy: FieldMergePolicy,
    fields: IndexMap<String, FieldDescriptor>,
}

impl FieldSet {
    pub fn new(policy: FieldMergePolicy) -> Self {
        Self {
            policy,
            fields: IndexMap::new(),
        }
    }

    /// Inserts a field. Returns `true` when the name was not present before.
    pub fn insert(&mut self, field: FieldDescriptor) -> bool {
        match self.fields.get_mut(&field.name) {
            Some(existing) => {
                if self.policy == FieldMergePolicy::LastSeen {
                    *existing = field;
                }
                false
            }
            None => {
                self.fields.insert(field.name.clone(), field);
                true
            }
        }
    }

    /// Inserts every field, returning how many names were new.
    pub fn extend<I>(&mut self, fields: I) -> usize
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        fields
            .into_iter()
            .map(|field| self.insert(field))
            .filter(|added| *added)
            .count()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn to_vec(&self) -> Vec<FieldDescriptor> {
        self.fields.values().cloned().collect()
    }

    pub fn into_vec(self) -> Vec<FieldDescriptor> {
        self.fields.into_values().collect()
    }
}
