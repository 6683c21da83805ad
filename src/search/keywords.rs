//! Built-in search keywords
//!
//! Each query kind declares which of these it accepts; the parser looks a
//! keyword up here first and only then tries the field catalog, so a field
//! definition can never shadow a built-in keyword.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::search::metric::MetricParseError;
use crate::utils::{parse_absolute_date, resolve_since, TimeLiteralError, TimeSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Id,
    TeamId,
    ProjectId,
    TestSuiteId,
    TestRunId,
    FolderId,
    State,
    Result,
    Is,
    Origin,
    AssignedTo,
    Unassigned,
    Completed,
    Since,
    From,
    Metric,
}

impl Keyword {
    pub const ALL: [Keyword; 16] = [
        Keyword::Id,
        Keyword::TeamId,
        Keyword::ProjectId,
        Keyword::TestSuiteId,
        Keyword::TestRunId,
        Keyword::FolderId,
        Keyword::State,
        Keyword::Result,
        Keyword::Is,
        Keyword::Origin,
        Keyword::AssignedTo,
        Keyword::Unassigned,
        Keyword::Completed,
        Keyword::Since,
        Keyword::From,
        Keyword::Metric,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Id => "id",
            Keyword::TeamId => "team-id",
            Keyword::ProjectId => "project-id",
            Keyword::TestSuiteId => "testsuite-id",
            Keyword::TestRunId => "testrun-id",
            Keyword::FolderId => "folder-id",
            Keyword::State => "state",
            Keyword::Result => "result",
            Keyword::Is => "is",
            Keyword::Origin => "origin",
            Keyword::AssignedTo => "assigned-to",
            Keyword::Unassigned => "unassigned",
            Keyword::Completed => "completed",
            Keyword::Since => "since",
            Keyword::From => "from",
            Keyword::Metric => "metric",
        }
    }

    /// Case-insensitive lookup
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|keyword| keyword.name().eq_ignore_ascii_case(name))
    }
}

/// Why a recognized keyword could not use its value.
///
/// Never surfaced to the caller: the token falls back to free text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeywordError {
    #[error("'{0}' is not accepted for this kind of query")]
    NotApplicable(&'static str),
    #[error("'{0}' needs a value")]
    EmptyValue(&'static str),
    #[error("'{value}' is not an integer id for '{keyword}'")]
    InvalidId { keyword: &'static str, value: String },
    #[error("'{value}' for '{keyword}' must be yes or no")]
    InvalidFlag { keyword: &'static str, value: String },
    #[error("unknown {what} '{value}'")]
    UnknownName { what: &'static str, value: String },
    #[error(transparent)]
    Time(#[from] TimeLiteralError),
    #[error(transparent)]
    Metric(#[from] MetricParseError),
}

pub(crate) fn require_value<'a>(keyword: Keyword, value: &'a str) -> Result<&'a str, KeywordError> {
    if value.is_empty() {
        Err(KeywordError::EmptyValue(keyword.name()))
    } else {
        Ok(value)
    }
}

pub(crate) fn parse_id(keyword: Keyword, value: &str) -> Result<i64, KeywordError> {
    require_value(keyword, value)?
        .parse::<i64>()
        .map_err(|_| KeywordError::InvalidId {
            keyword: keyword.name(),
            value: value.to_string(),
        })
}

/// `yes` / `no`, ASCII case-insensitive; anything else is malformed
pub(crate) fn parse_flag(keyword: Keyword, value: &str) -> Result<bool, KeywordError> {
    if value.eq_ignore_ascii_case("yes") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("no") {
        Ok(false)
    } else {
        Err(KeywordError::InvalidFlag {
            keyword: keyword.name(),
            value: value.to_string(),
        })
    }
}

pub(crate) fn parse_text(keyword: Keyword, value: &str) -> Result<String, KeywordError> {
    require_value(keyword, value).map(str::to_string)
}

pub(crate) fn parse_named<T>(
    what: &'static str,
    value: &str,
    lookup: impl Fn(&str) -> Option<T>,
) -> Result<T, KeywordError> {
    lookup(value).ok_or_else(|| KeywordError::UnknownName {
        what,
        value: value.to_string(),
    })
}

/// Lower creation bound for `since:` (relative) and `from:` (absolute)
pub(crate) fn parse_created_from(
    keyword: Keyword,
    value: &str,
    clock: &dyn TimeSource,
) -> Result<DateTime<Utc>, KeywordError> {
    match keyword {
        Keyword::Since => Ok(resolve_since(value, clock)?),
        Keyword::From => Ok(parse_absolute_date(value)?),
        other => Err(KeywordError::NotApplicable(other.name())),
    }
}
