//! Extraction statistics.
//!
//! [`ExtractionStats`] is threaded through one document's extraction by
//! `&mut` reference. It is write-only during traversal and never affects the
//! produced contracts.

use serde::{Deserialize, Serialize};

use amis_contract_core::{HttpMethod, OperationKind};

/// One retained operation, as reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub method: HttpMethod,
    pub url: String,
    pub kind: OperationKind,
    pub source_path: String,
}

/// What was extracted from one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub path: String,
    pub block_type: String,
    pub title: String,
    pub table_name: String,
    pub fields: Vec<String>,
    /// Whether the field set came from whole-subtree collection.
    pub fallback_fields: bool,
    pub operations: Vec<OperationSummary>,
}

/// Counters and per-block records for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub blocks_found: usize,
    /// Operations emitted by the collector, before deduplication.
    pub operations_discovered: usize,
    /// Operations dropped because their (url, method) was already seen.
    pub duplicate_operations: usize,
    /// `api` declarations skipped as not CRUD-relevant.
    pub ignored_apis: usize,
    /// `api` declarations without a usable URL.
    pub apis_without_url: usize,
    /// Field lists that were not sequences.
    pub non_sequence_field_lists: usize,
    /// Field-list entries without a usable `name`.
    pub unnamed_field_entries: usize,
    /// Blocks whose fields came from whole-subtree collection.
    pub fallback_field_collections: usize,
    /// Delete operations whose key field had to be synthesized.
    pub synthesized_keys: usize,
    pub blocks: Vec<BlockSummary>,
}

impl ExtractionStats {
    /// Operations kept across all blocks.
    pub fn operations_retained(&self) -> usize {
        self.blocks.iter().map(|b| b.operations.len()).sum()
    }

    /// Fields kept across all blocks.
    pub fn fields_retained(&self) -> usize {
        self.blocks.iter().map(|b| b.fields.len()).sum()
    }

    /// Human-readable notes about degraded input.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.duplicate_operations > 0 {
            warnings.push(format!(
                "Collapsed {} duplicate operation(s) sharing url and method",
                self.duplicate_operations
            ));
        }
        if self.ignored_apis > 0 {
            warnings.push(format!(
                "Ignored {} api declaration(s) without CRUD behavior or known method",
                self.ignored_apis
            ));
        }
        if self.apis_without_url > 0 {
            warnings.push(format!(
                "Skipped {} api declaration(s) without a url",
                self.apis_without_url
            ));
        }
        if self.non_sequence_field_lists > 0 || self.unnamed_field_entries > 0 {
            warnings.push(format!(
                "Field lists degraded: {} not a list, {} entries without a name",
                self.non_sequence_field_lists, self.unnamed_field_entries
            ));
        }
        if self.fallback_field_collections > 0 {
            warnings.push(format!(
                "{} block(s) had no column list; fields collected from the whole block",
                self.fallback_field_collections
            ));
        }
        if self.synthesized_keys > 0 {
            warnings.push(format!(
                "Synthesized a primary key for {} delete operation(s)",
                self.synthesized_keys
            ));
        }
        for block in self.blocks.iter().filter(|b| b.operations.is_empty()) {
            warnings.push(format!(
                "Block {} ({}) has no operations",
                block.path, block.title
            ));
        }

        warnings
    }
}
