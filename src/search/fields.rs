//! Dynamic field resolver
//!
//! Keywords that are not built in may name a project-configured field. The
//! catalog is supplied by the caller, so the vocabulary follows project
//! configuration and the parser itself performs no I/O.

use serde::Serialize;

use crate::models::FieldDefinition;

/// Custom field condition carried by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFilter {
    pub field_definition_id: i64,
    pub string_value: String,
}

/// Find a definition by case-insensitive name; the first one in catalog order wins
pub fn find_definition<'a>(catalog: &'a [FieldDefinition], name: &str) -> Option<&'a FieldDefinition> {
    let wanted = name.to_lowercase();
    catalog
        .iter()
        .find(|definition| definition.name.to_lowercase() == wanted)
}

/// Resolve `name:value` against the catalog. `None` means unresolved.
pub fn resolve_field(catalog: &[FieldDefinition], name: &str, value: &str) -> Option<FieldFilter> {
    if name.is_empty() || value.is_empty() {
        return None;
    }
    find_definition(catalog, name).map(|definition| FieldFilter {
        field_definition_id: definition.id,
        string_value: value.to_string(),
    })
}
