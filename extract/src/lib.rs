//! Interface-contract extraction from amis page documents.
//!
//! [`extract_contracts`] locates every list/table/grid block in one parsed
//! document and assembles one [`InterfaceContract`] per block. The batch
//! driver in [`convert`] runs it over a directory of pages.

pub mod assemble;
pub mod classify;
pub mod convert;
pub mod diagnostics;
pub mod fields;
pub mod locate;
pub mod operations;
pub mod output;
pub mod report;
pub mod trace;
pub mod url;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use amis_contract_core::naming::BlockNaming;
use amis_contract_core::{ExtractionSettings, InterfaceContract};
use diagnostics::ExtractionStats;
use locate::{BlockMatcher, locate_blocks};

/// Terminal failures for one document.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no list/table/grid block found in page '{page}'")]
    NoBlockFound { page: String },
}

/// Contracts for one document plus what was observed while building them.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub contracts: Vec<InterfaceContract>,
    pub stats: ExtractionStats,
}

/// Extracts one contract per located block, in block-discovery order.
///
/// `page_name` names contracts whose block declares no `tableName`. With
/// `first_block_only`, only the first block is assembled.
///
/// # Errors
///
/// Returns [`ExtractError::NoBlockFound`] when the document holds no block.
///
/// # Examples
///
/// ```
/// use amis_contract_core::{ExtractionSettings, HttpMethod, OperationKind};
/// use amis_contract_extract::extract_contracts;
/// use serde_json::json;
///
/// let page = json!({"type": "page", "body": {
///     "type": "crud",
///     "api": "/api/orders",
///     "columns": [{"name": "id"}]
/// }});
/// let output = extract_contracts(&page, "order_list", &ExtractionSettings::default()).unwrap();
/// let contract = &output.contracts[0];
/// assert_eq!(contract.title(), "OrderList");
/// assert_eq!(contract.table_name(), "ORDER_LIST");
/// let query = contract.operation("/api/orders", &HttpMethod::Get).unwrap();
/// assert_eq!(query.kind, OperationKind::Query);
/// ```
pub fn extract_contracts(
    document: &Value,
    page_name: &str,
    settings: &ExtractionSettings,
) -> Result<ExtractionOutput, ExtractError> {
    let matcher = BlockMatcher::new(&settings.block_types);
    let mut blocks = locate_blocks(document, &matcher);
    if blocks.is_empty() {
        return Err(ExtractError::NoBlockFound {
            page: page_name.to_string(),
        });
    }

    let mut stats = ExtractionStats {
        blocks_found: blocks.len(),
        ..Default::default()
    };
    if settings.first_block_only {
        blocks.truncate(1);
    }

    let page_naming = BlockNaming::for_page(page_name);
    let mut untitled = 0usize;
    let mut contracts = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let declared = block
            .node
            .get("tableName")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty());
        let naming = match declared {
            Some(table_name) => page_naming.with_table_name(table_name),
            None => {
                untitled += 1;
                if untitled == 1 {
                    page_naming.clone()
                } else {
                    page_naming.with_ordinal(untitled)
                }
            }
        };

        debug!(page = %page_name, path = %block.path, title = %naming.title, "Assembling block");
        contracts.push(assemble::assemble(block, &naming, settings, &matcher, &mut stats));
    }

    Ok(ExtractionOutput { contracts, stats })
}
