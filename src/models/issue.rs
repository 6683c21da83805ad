use serde::{Deserialize, Serialize};

use crate::filter::{Property, Scalar, Searchable};
use crate::models::{EntityKind, FieldValue, IssueType};

/// Issue or incident, possibly mirrored from an external tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    #[serde(default = "crate::models::default_tenant")]
    pub tenant_id: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub external_display_id: Option<String>,
    /// Tracker the issue came from (the `origin` keyword)
    #[serde(default)]
    pub external_system_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub created_ts: i64,
    #[serde(default)]
    pub fields: Vec<FieldValue>,
}

impl Issue {
    pub fn new(id: i64, title: &str) -> Self {
        Self {
            id,
            tenant_id: crate::models::default_tenant(),
            team_id: None,
            project_id: None,
            external_display_id: None,
            external_system_name: None,
            title: title.to_string(),
            description: None,
            state: None,
            issue_type: IssueType::Issue,
            assigned_to: None,
            created_ts: chrono::Utc::now().timestamp(),
            fields: Vec::new(),
        }
    }
}

impl Searchable for Issue {
    const KIND: EntityKind = EntityKind::Issue;
    const TABLE: &'static str = "issues";
    const TEXT_COLUMNS: &'static [&'static str] = &["title", "description", "external_display_id"];

    fn column(property: Property) -> Option<&'static str> {
        match property {
            Property::Id => Some("id"),
            Property::TenantId => Some("tenant_id"),
            Property::TeamId => Some("team_id"),
            Property::ProjectId => Some("project_id"),
            Property::ExternalDisplayId => Some("external_display_id"),
            Property::ExternalSystemName => Some("external_system_name"),
            Property::Name => Some("title"),
            Property::State => Some("state"),
            Property::IssueType => Some("issue_type"),
            Property::AssignedTo => Some("assigned_to"),
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
            Property::ExternalDisplayId => self.external_display_id.as_deref().map(Scalar::Text),
            Property::ExternalSystemName => self.external_system_name.as_deref().map(Scalar::Text),
            Property::Name => Some(Scalar::Text(&self.title)),
            Property::State => self.state.as_deref().map(Scalar::Text),
            Property::IssueType => Some(Scalar::Text(self.issue_type.as_str())),
            Property::AssignedTo => self.assigned_to.as_deref().map(Scalar::Text),
            Property::Created => Some(Scalar::Int(self.created_ts)),
            _ => None,
        }
    }

    fn text_values(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.title.as_str()),
            self.description.as_deref(),
            self.external_display_id.as_deref(),
        ]
    }

    fn fields(&self) -> &[FieldValue] {
        &self.fields
    }
}
