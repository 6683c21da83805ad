use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::{FilterSpecification, Property};
use crate::models::{TestCaseRun, TestResult};
use crate::search::fields::FieldFilter;
use crate::search::keywords::{self, Keyword, KeywordError};
use crate::search::metric::{parse_metric_expression, MetricCondition};
use crate::search::query::{field_specifications, SearchQuery, DEFAULT_PAGE_SIZE};
use crate::utils::TimeSource;

/// Search over test case runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCaseRunQuery {
    pub text: Option<String>,
    pub team_id: Option<i64>,
    pub project_id: Option<i64>,
    pub test_suite_id: Option<i64>,
    pub test_run_id: Option<i64>,
    pub state: Option<String>,
    pub result: Option<TestResult>,
    pub assigned_to_user: Option<String>,
    pub unassigned: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub metric: Option<MetricCondition>,
    pub fields: Vec<FieldFilter>,
    pub offset: usize,
    pub count: usize,
}

impl Default for TestCaseRunQuery {
    fn default() -> Self {
        Self {
            text: None,
            team_id: None,
            project_id: None,
            test_suite_id: None,
            test_run_id: None,
            state: None,
            result: None,
            assigned_to_user: None,
            unassigned: None,
            created_from: None,
            metric: None,
            fields: Vec::new(),
            offset: 0,
            count: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery for TestCaseRunQuery {
    type Entity = TestCaseRun;

    const KEYWORDS: &'static [Keyword] = &[
        Keyword::TeamId,
        Keyword::ProjectId,
        Keyword::TestSuiteId,
        Keyword::TestRunId,
        Keyword::State,
        Keyword::Result,
        Keyword::AssignedTo,
        Keyword::Unassigned,
        Keyword::Since,
        Keyword::From,
        Keyword::Metric,
    ];

    fn apply(&mut self, keyword: Keyword, value: &str, clock: &dyn TimeSource) -> Result<(), KeywordError> {
        match keyword {
            Keyword::TeamId => self.team_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::ProjectId => self.project_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::TestSuiteId => self.test_suite_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::TestRunId => self.test_run_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::State => self.state = Some(keywords::parse_text(keyword, value)?),
            Keyword::Result => {
                self.result = Some(keywords::parse_named("test result", value, TestResult::from_name)?)
            }
            Keyword::AssignedTo => {
                self.assigned_to_user = Some(keywords::parse_text(keyword, value)?);
                self.unassigned = None;
            }
            Keyword::Unassigned => {
                let unassigned = keywords::parse_flag(keyword, value)?;
                if unassigned {
                    self.assigned_to_user = None;
                }
                self.unassigned = Some(unassigned);
            }
            Keyword::Since | Keyword::From => {
                self.created_from = Some(keywords::parse_created_from(keyword, value, clock)?)
            }
            Keyword::Metric => self.metric = Some(parse_metric_expression(value)?),
            other => return Err(KeywordError::NotApplicable(other.name())),
        }
        Ok(())
    }

    fn push_field(&mut self, filter: FieldFilter) {
        self.fields.push(filter);
    }

    fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn fields(&self) -> &[FieldFilter] {
        &self.fields
    }

    fn page(&self) -> (usize, usize) {
        (self.offset, self.count)
    }

    fn set_page(&mut self, offset: usize, count: usize) {
        self.offset = offset;
        self.count = count;
    }

    fn specifications(&self) -> Vec<FilterSpecification<TestCaseRun>> {
        let mut specs = Vec::new();
        if let Some(id) = self.team_id {
            specs.push(FilterSpecification::equals(Property::TeamId, id));
        }
        if let Some(id) = self.project_id {
            specs.push(FilterSpecification::project(id));
        }
        if let Some(id) = self.test_suite_id {
            specs.push(FilterSpecification::equals(Property::TestSuiteId, id));
        }
        if let Some(id) = self.test_run_id {
            specs.push(FilterSpecification::equals(Property::TestRunId, id));
        }
        if let Some(state) = &self.state {
            specs.push(FilterSpecification::equals(Property::State, state.as_str()));
        }
        if let Some(result) = self.result {
            specs.push(FilterSpecification::equals(Property::Result, result.as_str()));
        }
        if let Some(user) = &self.assigned_to_user {
            specs.push(FilterSpecification::equals(Property::AssignedTo, user.as_str()));
        }
        if let Some(unassigned) = self.unassigned {
            specs.push(FilterSpecification::presence(Property::AssignedTo, !unassigned));
        }
        if let Some(from) = self.created_from {
            specs.push(FilterSpecification::on_or_after(Property::Created, from));
        }
        if let Some(metric) = &self.metric {
            specs.push(FilterSpecification::metric(metric.clone()));
        }
        specs.extend(field_specifications(&self.fields));
        specs
    }
}
