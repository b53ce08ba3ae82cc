//! tfplug - Terraform provider contract for Rust
//!
//! The pieces a provider implements against: schemas, dynamic values,
//! diagnostics, validators and the provider/resource/data source traits.
//! Serving them over the plugin protocol is left to the host.

pub mod context;
pub mod error;
pub mod schema;
pub mod types;

pub mod data_source;
pub mod provider;
pub mod resource;

pub mod import;
pub mod validator;

pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::{DataSourceFactory, Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, NestedBlockBuilder, NestingMode, Schema, SchemaBuilder};
pub use types::{AttributePath, Config, Diagnostic, Dynamic, DynamicValue, State};
pub use validator::{validate_config, Validator};
