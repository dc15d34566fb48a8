use serde::{Deserialize, Serialize};

use crate::InterfaceContract;

/// Serialized form of one converted page.
///
/// A page with a single block is written as one contract object; a page with
/// several blocks is written as an array, in block-discovery order. Readers
/// accept either shape.
///
/// # Examples
///
/// ```
/// use amis_contract_core::*;
///
/// let one = ContractDocument::from_contracts(vec![InterfaceContract::new("A", "A")]);
/// assert!(matches!(one, ContractDocument::Single(_)));
///
/// let json = serde_json::to_string(&one).unwrap();
/// assert!(json.starts_with('{'));
///
/// let many = ContractDocument::from_contracts(vec![
///     InterfaceContract::new("A", "A"),
///     InterfaceContract::new("B", "B"),
/// ]);
/// assert_eq!(many.len(), 2);
/// assert!(serde_json::to_string(&many).unwrap().starts_with('['));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContractDocument {
    Single(Box<InterfaceContract>),
    Many(Vec<InterfaceContract>),
}

impl ContractDocument {
    pub fn from_contracts(mut contracts: Vec<InterfaceContract>) -> Self {
        if contracts.len() == 1 {
            if let Some(contract) = contracts.pop() {
                return Self::Single(Box::new(contract));
            }
        }
        Self::Many(contracts)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(contracts) => contracts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first contract, which is the one the rendering stage uses for
    /// page-level files.
    pub fn first(&self) -> Option<&InterfaceContract> {
        match self {
            Self::Single(contract) => Some(contract),
            Self::Many(contracts) => contracts.first(),
        }
    }

    pub fn contracts(&self) -> Vec<&InterfaceContract> {
        match self {
            Self::Single(contract) => vec![contract.as_ref()],
            Self::Many(contracts) => contracts.iter().collect(),
        }
    }

    pub fn into_contracts(self) -> Vec<InterfaceContract> {
        match self {
            Self::Single(contract) => vec![*contract],
            Self::Many(contracts) => contracts,
        }
    }
}
