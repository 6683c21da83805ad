use serde::{Deserialize, Serialize};

use crate::filter::{Property, Scalar, Searchable};
use crate::models::{EntityKind, FieldValue, TestExecutionType};

/// Test case model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    #[serde(default = "crate::models::default_tenant")]
    pub tenant_id: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub test_suite_id: Option<i64>,
    /// Folder ancestors, root first
    #[serde(default)]
    pub path_ids: Vec<i64>,
    #[serde(default)]
    pub external_display_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub execution_type: TestExecutionType,
    #[serde(default)]
    pub created_ts: i64,
    #[serde(default)]
    pub fields: Vec<FieldValue>,
}

impl TestCase {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            tenant_id: crate::models::default_tenant(),
            team_id: None,
            project_id: None,
            test_suite_id: None,
            path_ids: Vec::new(),
            external_display_id: None,
            name: name.to_string(),
            description: None,
            state: None,
            execution_type: TestExecutionType::Manual,
            created_ts: chrono::Utc::now().timestamp(),
            fields: Vec::new(),
        }
    }
}

/// Encode folder ancestors as `/1/4/9/` so membership is a substring test
pub fn encode_path(ids: &[i64]) -> String {
    let mut path = String::from("/");
    for id in ids {
        path.push_str(&id.to_string());
        path.push('/');
    }
    path
}

pub fn decode_path(path: &str) -> Vec<i64> {
    path.split('/')
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}

impl Searchable for TestCase {
    const KIND: EntityKind = EntityKind::TestCase;
    const TABLE: &'static str = "test_cases";
    const TEXT_COLUMNS: &'static [&'static str] = &["name", "description", "external_display_id"];
    const PATH_COLUMN: Option<&'static str> = Some("path");

    fn column(property: Property) -> Option<&'static str> {
        match property {
            Property::Id => Some("id"),
            Property::TenantId => Some("tenant_id"),
            Property::TeamId => Some("team_id"),
            Property::ProjectId => Some("project_id"),
            Property::TestSuiteId => Some("test_suite_id"),
            Property::ExternalDisplayId => Some("external_display_id"),
            Property::Name => Some("name"),
            Property::State => Some("state"),
            Property::ExecutionType => Some("execution_type"),
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
            Property::TestSuiteId => self.test_suite_id.map(Scalar::Int),
            Property::ExternalDisplayId => self.external_display_id.as_deref().map(Scalar::Text),
            Property::Name => Some(Scalar::Text(&self.name)),
            Property::State => self.state.as_deref().map(Scalar::Text),
            Property::ExecutionType => Some(Scalar::Text(self.execution_type.as_str())),
            Property::Created => Some(Scalar::Int(self.created_ts)),
            _ => None,
        }
    }

    fn text_values(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.name.as_str()),
            self.description.as_deref(),
            self.external_display_id.as_deref(),
        ]
    }

    fn path_ids(&self) -> &[i64] {
        &self.path_ids
    }

    fn fields(&self) -> &[FieldValue] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_encoding() {
        assert_eq!(encode_path(&[]), "/");
        assert_eq!(encode_path(&[1, 4, 9]), "/1/4/9/");
        assert_eq!(decode_path("/1/4/9/"), vec![1, 4, 9]);
        assert_eq!(decode_path("/"), Vec::<i64>::new());
    }

    #[test]
    fn test_properties_follow_columns() {
        let mut case = TestCase::new(1, "Login");
        case.team_id = Some(2);
        case.project_id = Some(3);
        case.test_suite_id = Some(4);
        case.external_display_id = Some("TC-1".to_string());
        case.state = Some("Draft".to_string());
        for property in Property::ALL {
            assert_eq!(
                case.property(property).is_some(),
                TestCase::column(property).is_some(),
                "{:?}",
                property
            );
        }
    }
}
