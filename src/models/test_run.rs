use serde::{Deserialize, Serialize};

use crate::filter::{Property, Scalar, Searchable};
use crate::models::{EntityKind, FieldValue};

/// Test run model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    pub id: i64,
    #[serde(default = "crate::models::default_tenant")]
    pub tenant_id: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_ts: i64,
    #[serde(default)]
    pub fields: Vec<FieldValue>,
}

impl TestRun {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            tenant_id: crate::models::default_tenant(),
            team_id: None,
            project_id: None,
            name: name.to_string(),
            state: None,
            completed: false,
            created_ts: chrono::Utc::now().timestamp(),
            fields: Vec::new(),
        }
    }
}

impl Searchable for TestRun {
    const KIND: EntityKind = EntityKind::TestRun;
    const TABLE: &'static str = "test_runs";
    const TEXT_COLUMNS: &'static [&'static str] = &["name"];

    fn column(property: Property) -> Option<&'static str> {
        match property {
            Property::Id => Some("id"),
            Property::TenantId => Some("tenant_id"),
            Property::TeamId => Some("team_id"),
            Property::ProjectId => Some("project_id"),
            Property::Name => Some("name"),
            Property::State => Some("state"),
            Property::Completed => Some("completed"),
            Property::Created => Some("created_ts"),
            _ => None,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn property(&self, property: Property) -> Option<Scalar<'_>> {
        match property {
            Property::Id => Some(Scalar::Int(self.id)),
            Property::TenantId => Some(Scalar::Text(&self.tenant_id)),
            Property::TeamId => self.team_id.map(Scalar::Int),
            Property::ProjectId => self.project_id.map(Scalar::Int),
            Property::Name => Some(Scalar::Text(&self.name)),
            Property::State => self.state.as_deref().map(Scalar::Text),
            Property::Completed => Some(Scalar::Bool(self.completed)),
            Property::Created => Some(Scalar::Int(self.created_ts)),
            _ => None,
        }
    }

    fn text_values(&self) -> Vec<Option<&str>> {
        vec![Some(self.name.as_str())]
    }

    fn fields(&self) -> &[FieldValue] {
        &self.fields
    }
}
