//! ContractSpec Core Library
//!
//! This library converts between OpenAPI documents and ContractSpec
//! operation registries: it parses OpenAPI 3.x, imports operations as
//! canonical specs plus generated code, exports registries back to OpenAPI
//! 3.1, and diffs the two sides to keep them in sync.

pub mod config;
pub mod contract;
pub mod diff;
pub mod error;
pub mod export;
pub mod import;
pub mod loader;
pub mod openapi;
pub mod schema;
pub mod templates;
pub mod utils;

pub use crate::{
    config::Config,
    contract::{ContractRegistries, ImportedOperationSpec, OperationSpec},
    diff::{diff_all, diff_specs, DiffChange, DiffOptions, SpecDiff, SyncResult},
    error::{Error, Result},
    export::{export_contract_spec, ExportOptions, ExportResult},
    import::{import_from_openapi, ImportOptions, ImportResult},
    loader::DocumentLoader,
    openapi::{OpenApiDocument, ParseResult},
};
