//! Core contract types and shared primitives for amis page conversion.
//!
//! This crate defines the data model that connects the extraction engine to
//! the scaffolding stage:
//!
//! - [`FieldDescriptor`]: a normalized field (name, column, inferred type,
//!   label).
//! - [`OperationDescriptor`]: one network call discovered in a page, keyed
//!   by (url, method) and classified into an [`OperationKind`].
//! - [`InterfaceContract`]: the OpenAPI-shaped paths + schema produced for
//!   one list/table/grid block.
//! - [`ContractDocument`]: the on-disk form of a converted page (one
//!   contract or several).
//!
//! [`FieldSet`] merges repeated field names under a [`FieldMergePolicy`],
//! [`validate_contract`] checks contract invariants, [`naming`] derives
//! entity/table/Java identifiers, and [`AppConfig`] holds the YAML run
//! configuration.
//!
//! # Example
//!
//! ```
//! use amis_contract_core::*;
//!
//! let mut fields = FieldSet::new(FieldMergePolicy::FirstSeen);
//! fields.insert(FieldDescriptor::new("id").with_label("ID"));
//! fields.insert(FieldDescriptor::new("amount").with_type(FieldType::Integer));
//!
//! let mut contract = InterfaceContract::new("Orders", "ORDERS");
//! contract.set_schema(ObjectSchema::from_fields(fields.iter()));
//!
//! assert_eq!(contract.schema().unwrap().properties.len(), 2);
//! assert!(validate_contract(&contract).is_empty());
//! ```

mod config;
mod error;
mod merge;
pub mod naming;
mod package;
mod types;
mod validate;

pub use config::{
    AppConfig, BatchSettings, CodegenSettings, DEFAULT_BLOCK_TYPES, DEFAULT_PRIMARY_KEY_NAMES,
    DEFAULT_URL_PLACEHOLDER, ExtractionSettings, MavenDependency, MavenRepository,
};
pub use error::ConfigError;
pub use merge::{FieldMergePolicy, FieldSet};
pub use package::ContractDocument;
pub use types::*;
pub use validate::{ValidationError, validate_contract, validate_contracts};
