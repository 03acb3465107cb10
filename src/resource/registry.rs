//! Resource Registry
//!
//! Lists the definitions of every supported kind so the host can declare
//! them to its engine.

use super::book::BookSchema;
use super::schema::{ResourceDef, SchemaError};
use super::word::word_definition;

/// Names of all supported kinds
pub const RESOURCE_NAMES: &[&str] = &["word", "book"];

/// All resource definitions, with the book shaped by `book_schema`
pub fn definitions(book_schema: BookSchema) -> Vec<ResourceDef> {
    vec![word_definition(), book_schema.definition()]
}

/// Get a resource definition by name
pub fn get_definition(name: &str, book_schema: BookSchema) -> Option<ResourceDef> {
    definitions(book_schema).into_iter().find(|d| d.name == name)
}

/// Validate every definition, stopping at the first violation
pub fn validate_all(book_schema: BookSchema) -> Result<(), SchemaError> {
    definitions(book_schema).iter().try_for_each(ResourceDef::validate)
}
