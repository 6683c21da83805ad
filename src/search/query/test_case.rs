use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::{FilterSpecification, Property};
use crate::models::{TestCase, TestExecutionType};
use crate::search::fields::FieldFilter;
use crate::search::keywords::{self, Keyword, KeywordError};
use crate::search::query::{field_specifications, SearchQuery, DEFAULT_PAGE_SIZE};
use crate::utils::TimeSource;

/// Search over test cases
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCaseQuery {
    pub text: Option<String>,
    pub team_id: Option<i64>,
    pub project_id: Option<i64>,
    pub test_suite_id: Option<i64>,
    pub folder_id: Option<i64>,
    pub external_display_id: Option<String>,
    pub state: Option<String>,
    pub execution_type: Option<TestExecutionType>,
    pub created_from: Option<DateTime<Utc>>,
    pub fields: Vec<FieldFilter>,
    pub offset: usize,
    pub count: usize,
}

impl Default for TestCaseQuery {
    fn default() -> Self {
        Self {
            text: None,
            team_id: None,
            project_id: None,
            test_suite_id: None,
            folder_id: None,
            external_display_id: None,
            state: None,
            execution_type: None,
            created_from: None,
            fields: Vec::new(),
            offset: 0,
            count: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery for TestCaseQuery {
    type Entity = TestCase;

    const KEYWORDS: &'static [Keyword] = &[
        Keyword::Id,
        Keyword::TeamId,
        Keyword::ProjectId,
        Keyword::TestSuiteId,
        Keyword::FolderId,
        Keyword::State,
        Keyword::Is,
        Keyword::Since,
        Keyword::From,
    ];

    fn apply(&mut self, keyword: Keyword, value: &str, clock: &dyn TimeSource) -> Result<(), KeywordError> {
        match keyword {
            Keyword::Id => self.external_display_id = Some(keywords::parse_text(keyword, value)?),
            Keyword::TeamId => self.team_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::ProjectId => self.project_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::TestSuiteId => self.test_suite_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::FolderId => self.folder_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::State => self.state = Some(keywords::parse_text(keyword, value)?),
            Keyword::Is => {
                self.execution_type = Some(keywords::parse_named(
                    "execution type",
                    value,
                    TestExecutionType::from_name,
                )?)
            }
            Keyword::Since | Keyword::From => {
                self.created_from = Some(keywords::parse_created_from(keyword, value, clock)?)
            }
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

    fn specifications(&self) -> Vec<FilterSpecification<TestCase>> {
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
        if let Some(id) = self.folder_id {
            specs.push(FilterSpecification::in_path(id));
        }
        if let Some(display_id) = &self.external_display_id {
            specs.push(FilterSpecification::equals(Property::ExternalDisplayId, display_id.as_str()));
        }
        if let Some(state) = &self.state {
            specs.push(FilterSpecification::equals(Property::State, state.as_str()));
        }
        if let Some(execution_type) = self.execution_type {
            specs.push(FilterSpecification::equals(Property::ExecutionType, execution_type.as_str()));
        }
        if let Some(from) = self.created_from {
            specs.push(FilterSpecification::on_or_after(Property::Created, from));
        }
        specs.extend(field_specifications(&self.fields));
        specs
    }
}
