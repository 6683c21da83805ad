use serde::{Deserialize, Serialize};
use crate::models::EntityKind;

/// Semantic role of a project-configured field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraitType {
    Custom,
    Priority,
    Milestone,
    Release,
    Component,
    Feature,
    Tag,
}

impl TraitType {
    pub const ALL: [TraitType; 7] = [
        TraitType::Custom,
        TraitType::Priority,
        TraitType::Milestone,
        TraitType::Release,
        TraitType::Component,
        TraitType::Feature,
        TraitType::Tag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TraitType::Custom => "Custom",
            TraitType::Priority => "Priority",
            TraitType::Milestone => "Milestone",
            TraitType::Release => "Release",
            TraitType::Component => "Component",
            TraitType::Feature => "Feature",
            TraitType::Tag => "Tag",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

impl Default for TraitType {
    fn default() -> Self {
        TraitType::Custom
    }
}

/// A project-configured custom attribute.
///
/// Definitions form the catalog that turns `name:value` tokens into field
/// filters. The catalog is loaded per tenant, project and entity kind by the
/// caller before a query is parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub trait_type: TraitType,
    pub target: EntityKind,
    #[serde(default = "crate::models::default_tenant")]
    pub tenant_id: String,
    #[serde(default)]
    pub project_id: Option<i64>,
}

impl FieldDefinition {
    pub fn new(id: i64, name: &str, target: EntityKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            trait_type: TraitType::Custom,
            target,
            tenant_id: crate::models::default_tenant(),
            project_id: None,
        }
    }
}

/// Value of a custom field on one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub field_definition_id: i64,
    pub string_value: String,
}

impl FieldValue {
    pub fn new(field_definition_id: i64, string_value: &str) -> Self {
        Self {
            field_definition_id,
            string_value: string_value.to_string(),
        }
    }
}
