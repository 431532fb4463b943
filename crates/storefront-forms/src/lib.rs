//! Schema-driven attribute form for product categories.
//!
//! The catalog of attribute definitions is fetched once per form session.
//! Binding the form to a category derives that category's fields and resets
//! their values; edits then update single fields and republish the map.

pub mod catalog;
pub mod error;
pub mod form;
pub mod types;

pub use catalog::{parse_catalog, parse_definitions, parse_options, CatalogConfig, CatalogSource};
pub use error::CatalogError;
pub use form::{AttributeForm, Binding, ChangeCallback, EditOutcome};
pub use types::{
    AttributeDefinition, AttributeKind, AttributeOption, Catalog, CategoryId, FieldValue,
    FormValues,
};
