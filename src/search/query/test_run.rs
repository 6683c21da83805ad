use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::{FilterSpecification, Property};
use crate::models::TestRun;
use crate::search::fields::FieldFilter;
use crate::search::keywords::{self, Keyword, KeywordError};
use crate::search::query::{field_specifications, SearchQuery, DEFAULT_PAGE_SIZE};
use crate::utils::TimeSource;

/// Search over test runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRunQuery {
    pub text: Option<String>,
    pub team_id: Option<i64>,
    pub project_id: Option<i64>,
    pub test_run_id: Option<i64>,
    pub state: Option<String>,
    pub completed: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub fields: Vec<FieldFilter>,
    pub offset: usize,
    pub count: usize,
}

impl Default for TestRunQuery {
    fn default() -> Self {
        Self {
            text: None,
            team_id: None,
            project_id: None,
            test_run_id: None,
            state: None,
            completed: None,
            created_from: None,
            fields: Vec::new(),
            offset: 0,
            count: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery for TestRunQuery {
    type Entity = TestRun;

    const KEYWORDS: &'static [Keyword] = &[
        Keyword::TeamId,
        Keyword::ProjectId,
        Keyword::TestRunId,
        Keyword::State,
        Keyword::Completed,
        Keyword::Since,
        Keyword::From,
    ];

    fn apply(&mut self, keyword: Keyword, value: &str, clock: &dyn TimeSource) -> Result<(), KeywordError> {
        match keyword {
            Keyword::TeamId => self.team_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::ProjectId => self.project_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::TestRunId => self.test_run_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::State => self.state = Some(keywords::parse_text(keyword, value)?),
            Keyword::Completed => self.completed = Some(keywords::parse_flag(keyword, value)?),
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

    fn specifications(&self) -> Vec<FilterSpecification<TestRun>> {
        let mut specs = Vec::new();
        if let Some(id) = self.team_id {
            specs.push(FilterSpecification::equals(Property::TeamId, id));
        }
        if let Some(id) = self.project_id {
            specs.push(FilterSpecification::project(id));
        }
        if let Some(id) = self.test_run_id {
            specs.push(FilterSpecification::equals(Property::Id, id));
        }
        if let Some(state) = &self.state {
            specs.push(FilterSpecification::equals(Property::State, state.as_str()));
        }
        if let Some(completed) = self.completed {
            specs.push(FilterSpecification::equals(Property::Completed, completed));
        }
        if let Some(from) = self.created_from {
            specs.push(FilterSpecification::on_or_after(Property::Created, from));
        }
        specs.extend(field_specifications(&self.fields));
        specs
    }
}
