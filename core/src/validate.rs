//! Contract validation.
//!
//! Checks the structural invariants of an [`InterfaceContract`] read back
//! from disk before it is handed to the rendering stage.
//!
//! # Examples
//!
//! ```
//! use amis_contract_core::*;
//!
//! let mut contract = InterfaceContract::new("Orders", "ORDERS");
//! contract.set_schema(ObjectSchema::from_fields(&[FieldDescriptor::new("id")]));
//! assert!(validate_contract(&contract).is_empty());
//!
//! // Schema missing under the title key
//! let bare = InterfaceContract::new("Orders", "ORDERS");
//! assert!(!validate_contract(&bare).is_empty());
//! ```

use thiserror::Error;

use crate::{HttpMethod, InterfaceContract};

/// Contract validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `info.title` is empty or whitespace-only.
    #[error("contract title cannot be empty")]
    EmptyTitle,
    /// `info.tableName` is empty or whitespace-only.
    #[error("contract table name cannot be empty")]
    EmptyTableName,
    /// No schema is stored under the title key.
    #[error("no schema named '{0}' in components")]
    MissingSchema(String),
    /// A path key is empty.
    #[error("path URL cannot be empty")]
    EmptyPath,
    /// A query-style operation declares a required parameter.
    #[error("{method} {url}: query parameter '{name}' must be optional")]
    RequiredQueryParameter {
        method: String,
        url: String,
        name: String,
    },
    /// A delete operation declares an optional parameter.
    #[error("delete {url}: parameter '{name}' must be required")]
    OptionalDeleteParameter { url: String, name: String },
    /// A delete operation has no parameters at all.
    #[error("delete {0}: no key parameter")]
    DeleteWithoutKey(String),
}

/// Validates one contract, returning every problem found.
pub fn validate_contract(contract: &InterfaceContract) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if contract.title().trim().is_empty() {
        errors.push(ValidationError::EmptyTitle);
    }
    if contract.table_name().trim().is_empty() {
        errors.push(ValidationError::EmptyTableName);
    }
    if contract.schema().is_none() {
        errors.push(ValidationError::MissingSchema(contract.title().to_string()));
    }

    for (url, method, operation) in contract.operations() {
        if url.trim().is_empty() {
            errors.push(ValidationError::EmptyPath);
            continue;
        }
        match method {
            HttpMethod::Delete => {
                if operation.parameters.is_empty() {
                    errors.push(ValidationError::DeleteWithoutKey(url.to_string()));
                }
                for param in operation.parameters.iter().filter(|p| !p.required) {
                    errors.push(ValidationError::OptionalDeleteParameter {
                        url: url.to_string(),
                        name: param.name.clone(),
                    });
                }
            }
            ref other if !other.carries_body() => {
                for param in operation.parameters.iter().filter(|p| p.required) {
                    errors.push(ValidationError::RequiredQueryParameter {
                        method: other.to_string(),
                        url: url.to_string(),
                        name: param.name.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    errors
}

/// Validates several contracts, concatenating their errors.
pub fn validate_contracts<'a>(
    contracts: impl IntoIterator<Item = &'a InterfaceContract>,
) -> Vec<ValidationError> {
    contracts.into_iter().flat_map(validate_contract).collect()
}
