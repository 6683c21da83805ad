use serde::{Deserialize, Serialize};

use crate::filter::{Property, Scalar, Searchable};
use crate::models::{EntityKind, FieldValue, Metric, TestResult};

/// One execution of a test case inside a test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseRun {
    pub id: i64,
    #[serde(default = "crate::models::default_tenant")]
    pub tenant_id: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub test_suite_id: Option<i64>,
    #[serde(default)]
    pub test_run_id: Option<i64>,
    #[serde(default)]
    pub test_case_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub result: TestResult,
    #[serde(default)]
    pub assigned_to_user_name: Option<String>,
    #[serde(default)]
    pub created_ts: i64,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub fields: Vec<FieldValue>,
}

impl TestCaseRun {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            tenant_id: crate::models::default_tenant(),
            team_id: None,
            project_id: None,
            test_suite_id: None,
            test_run_id: None,
            test_case_id: None,
            name: name.to_string(),
            state: None,
            result: TestResult::NoRun,
            assigned_to_user_name: None,
            created_ts: chrono::Utc::now().timestamp(),
            metrics: Vec::new(),
            fields: Vec::new(),
        }
    }
}

impl Searchable for TestCaseRun {
    const KIND: EntityKind = EntityKind::TestCaseRun;
    const TABLE: &'static str = "test_case_runs";
    const TEXT_COLUMNS: &'static [&'static str] = &["name"];

    fn column(property: Property) -> Option<&'static str> {
        match property {
            Property::Id => Some("id"),
            Property::TenantId => Some("tenant_id"),
            Property::TeamId => Some("team_id"),
            Property::ProjectId => Some("project_id"),
            Property::TestSuiteId => Some("test_suite_id"),
            Property::TestRunId => Some("test_run_id"),
            Property::TestCaseId => Some("test_case_id"),
            Property::Name => Some("name"),
            Property::State => Some("state"),
            Property::Result => Some("result"),
            Property::AssignedTo => Some("assigned_to_user_name"),
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
            Property::TestRunId => self.test_run_id.map(Scalar::Int),
            Property::TestCaseId => self.test_case_id.map(Scalar::Int),
            Property::Name => Some(Scalar::Text(&self.name)),
            Property::State => self.state.as_deref().map(Scalar::Text),
            Property::Result => Some(Scalar::Text(self.result.as_str())),
            Property::AssignedTo => self.assigned_to_user_name.as_deref().map(Scalar::Text),
            Property::Created => Some(Scalar::Int(self.created_ts)),
            _ => None,
        }
    }

    fn text_values(&self) -> Vec<Option<&str>> {
        vec![Some(self.name.as_str())]
    }

    fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    fn fields(&self) -> &[FieldValue] {
        &self.fields
    }
}
