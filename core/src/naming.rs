//! Identifier conventions shared by extraction and code generation.
//!
//! Page files are named in snake or kebab case (`order_list.json`); entity
//! names, table names and Java identifiers are derived from them here.

/// Fallback entity name when neither a table name nor a page name is usable.
pub const DEFAULT_ENTITY_NAME: &str = "Entity";

fn split_words(s: &str) -> impl Iterator<Item = &str> {
    s.split(['-', '_', '.']).filter(|part| !part.is_empty())
}

fn capitalize(word: &str, lower_rest: bool) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let rest: String = chars.collect();
            let rest = if lower_rest { rest.to_lowercase() } else { rest };
            first.to_uppercase().collect::<String>() + &rest
        }
        None => String::new(),
    }
}

/// Entity-style name: each part capitalized, the rest lowercased.
///
/// ```
/// use amis_contract_core::naming::camel_case;
///
/// assert_eq!(camel_case("order_list"), "OrderList");
/// assert_eq!(camel_case("ODS_TRADE-INFO"), "OdsTradeInfo");
/// ```
pub fn camel_case(s: &str) -> String {
    split_words(s).map(|part| capitalize(part, true)).collect()
}

/// Class-style name for generated sources. Follows the [`camel_case`] rule
/// so a class or schema lookup derived from a page or table name finds the
/// schema key the extractor wrote for it.
///
/// ```
/// use amis_contract_core::naming::upper_camel;
///
/// assert_eq!(upper_camel("trade_info"), "TradeInfo");
/// assert_eq!(upper_camel("orderItem"), "Orderitem");
/// ```
pub fn upper_camel(s: &str) -> String {
    camel_case(s)
}

/// Member-style name: lowercased, `_`-separated parts joined in camel case.
///
/// ```
/// use amis_contract_core::naming::small_camel;
///
/// assert_eq!(small_camel("ORDER_ID"), "orderId");
/// assert_eq!(small_camel("amount"), "amount");
/// ```
pub fn small_camel(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut parts = lower.split('_').filter(|part| !part.is_empty());
    let Some(first) = parts.next() else {
        return String::new();
    };
    let mut out = first.to_string();
    for part in parts {
        out.push_str(&capitalize(part, false));
    }
    out
}

/// Names assigned to the contract of one block.
///
/// # Examples
///
/// ```
/// use amis_contract_core::naming::BlockNaming;
///
/// let page = BlockNaming::for_page("order_list");
/// assert_eq!(page.title, "OrderList");
/// assert_eq!(page.table_name, "ORDER_LIST");
///
/// let declared = page.with_table_name("ODS_TRADE_INFO");
/// assert_eq!(declared.title, "OdsTradeInfo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNaming {
    pub title: String,
    pub table_name: String,
}

impl BlockNaming {
    /// Naming derived from the page (file stem) alone.
    pub fn for_page(page_name: &str) -> Self {
        let title = camel_case(page_name);
        if title.is_empty() {
            return Self {
                title: DEFAULT_ENTITY_NAME.to_string(),
                table_name: DEFAULT_ENTITY_NAME.to_uppercase(),
            };
        }
        Self {
            title,
            table_name: page_name.trim().to_uppercase(),
        }
    }

    /// Naming when the block declares its own table name. Blank names keep
    /// the page-derived naming.
    pub fn with_table_name(&self, table_name: &str) -> Self {
        let table_name = table_name.trim();
        let title = camel_case(table_name);
        if title.is_empty() {
            return self.clone();
        }
        Self {
            title,
            table_name: table_name.to_string(),
        }
    }

    /// Appends a numeric suffix to the title so sibling blocks of one page
    /// get distinct schema keys.
    pub fn with_ordinal(&self, ordinal: usize) -> Self {
        Self {
            title: format!("{}{ordinal}", self.title),
            table_name: self.table_name.clone(),
        }
    }
}
