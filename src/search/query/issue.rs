use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::{FilterSpecification, Property};
use crate::models::{Issue, IssueType};
use crate::search::fields::FieldFilter;
use crate::search::keywords::{self, Keyword, KeywordError};
use crate::search::query::{field_specifications, SearchQuery, DEFAULT_PAGE_SIZE};
use crate::utils::TimeSource;

/// Search over issues and incidents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueQuery {
    pub text: Option<String>,
    pub team_id: Option<i64>,
    pub project_id: Option<i64>,
    pub external_display_id: Option<String>,
    pub external_system_name: Option<String>,
    pub state: Option<String>,
    pub issue_type: Option<IssueType>,
    pub assigned_to_user: Option<String>,
    pub unassigned: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub fields: Vec<FieldFilter>,
    pub offset: usize,
    pub count: usize,
}

impl Default for IssueQuery {
    fn default() -> Self {
        Self {
            text: None,
            team_id: None,
            project_id: None,
            external_display_id: None,
            external_system_name: None,
            state: None,
            issue_type: None,
            assigned_to_user: None,
            unassigned: None,
            created_from: None,
            fields: Vec::new(),
            offset: 0,
            count: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery for IssueQuery {
    type Entity = Issue;

    const KEYWORDS: &'static [Keyword] = &[
        Keyword::Id,
        Keyword::TeamId,
        Keyword::ProjectId,
        Keyword::State,
        Keyword::Is,
        Keyword::Origin,
        Keyword::AssignedTo,
        Keyword::Unassigned,
        Keyword::Since,
        Keyword::From,
    ];

    fn apply(&mut self, keyword: Keyword, value: &str, clock: &dyn TimeSource) -> Result<(), KeywordError> {
        match keyword {
            Keyword::Id => self.external_display_id = Some(keywords::parse_text(keyword, value)?),
            Keyword::TeamId => self.team_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::ProjectId => self.project_id = Some(keywords::parse_id(keyword, value)?),
            Keyword::State => self.state = Some(keywords::parse_text(keyword, value)?),
            Keyword::Is => {
                self.issue_type = Some(keywords::parse_named("issue type", value, IssueType::from_name)?)
            }
            Keyword::Origin => self.external_system_name = Some(keywords::parse_text(keyword, value)?),
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

    fn specifications(&self) -> Vec<FilterSpecification<Issue>> {
        let mut specs = Vec::new();
        if let Some(id) = self.team_id {
            specs.push(FilterSpecification::equals(Property::TeamId, id));
        }
        if let Some(id) = self.project_id {
            specs.push(FilterSpecification::project(id));
        }
        if let Some(display_id) = &self.external_display_id {
            specs.push(FilterSpecification::equals(Property::ExternalDisplayId, display_id.as_str()));
        }
        if let Some(origin) = &self.external_system_name {
            specs.push(FilterSpecification::equals(Property::ExternalSystemName, origin.as_str()));
        }
        if let Some(state) = &self.state {
            specs.push(FilterSpecification::equals(Property::State, state.as_str()));
        }
        if let Some(issue_type) = self.issue_type {
            specs.push(FilterSpecification::equals(Property::IssueType, issue_type.as_str()));
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
        specs.extend(field_specifications(&self.fields));
        specs
    }
}
