//! Spring Boot backend scaffolding from interface contracts.
//!
//! The rendering stage reads the contracts written by the conversion stage
//! (`<openapi_dir>/<system>/<page>.json`) and produces one Maven project per
//! system:
//!
//! ```text
//! <system>-backend/
//!   pom.xml
//!   README.md
//!   src/main/resources/application.yml
//!   src/main/java/<prefix>/<system>/
//!     <System>ApiApplication.java
//!     entity/ repository/ model/          one class each per table
//!     <page>/controller/ service/ service/impl/ dto/
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use amis_contract_codegen::generate_project;
//! use amis_contract_core::CodegenSettings;
//!
//! let outcome = generate_project(
//!     Path::new("docs/openapi_json"),
//!     Path::new("output"),
//!     &CodegenSettings::default(),
//! )?;
//! println!("{} files written", outcome.files_written());
//! # Ok::<(), amis_contract_codegen::CodegenError>(())
//! ```

mod error;
pub mod java;
pub mod model;
pub mod pom;
pub mod project;
pub mod resources;

pub use error::{CodegenError, Result};
pub use model::{Endpoint, JavaField, MappingAnnotation, PageModel, QueryParam, SystemModel};
pub use project::{
    GenerateOutcome, GeneratedFile, PageFailure, SystemOutcome, check_consistency,
    expected_structure, generate_project, load_page_contract, render_system,
};
