//! Search string parser
//!
//! # Process
//!
//! 1. Tokenize the raw string (see [`tokenize`])
//! 2. For each `keyword:value` word, try the kind's keyword table, then the
//!    field catalog
//! 3. Everything left over is joined with single spaces into the free text
//!
//! A recognized keyword with a malformed value (`team-id:abc`, `since:5x`)
//! never fails the search: the token is demoted to free text and parsing
//! carries on with the next token.

use log::{debug, trace};

use crate::models::FieldDefinition;
use crate::search::fields::resolve_field;
use crate::search::keywords::Keyword;
use crate::search::query::{IssueQuery, SearchQuery, TestCaseQuery, TestCaseRunQuery, TestRunQuery};
use crate::search::tokenizer::{tokenize, RawToken};
use crate::utils::{SystemClock, TimeSource};

/// Parses search strings against a field catalog and a clock.
///
/// Holds only shared references, so one parser can serve any number of
/// threads.
#[derive(Clone, Copy)]
pub struct SearchParser<'a> {
    fields: &'a [FieldDefinition],
    clock: &'a dyn TimeSource,
}

impl<'a> SearchParser<'a> {
    /// Parser over `fields` using the system clock
    pub fn new(fields: &'a [FieldDefinition]) -> Self {
        Self {
            fields,
            clock: &SystemClock,
        }
    }

    pub fn with_clock(self, clock: &'a dyn TimeSource) -> Self {
        Self { clock, ..self }
    }

    /// Parse `text` into a query of kind `Q`
    pub fn parse<Q: SearchQuery>(&self, text: &str) -> Q {
        let mut query = Q::default();
        let mut leftover: Vec<String> = Vec::new();

        for token in tokenize(text) {
            trace!("search token: {:?}", token);
            let consumed = match token.keyword_pair() {
                Some((keyword, value)) => self.dispatch(&mut query, keyword, value),
                None => false,
            };
            if !consumed {
                leftover.push(match token {
                    RawToken::Phrase(text) => text,
                    RawToken::Word { text, .. } => text,
                });
            }
        }

        query.set_text(if leftover.is_empty() {
            None
        } else {
            Some(leftover.join(" "))
        });
        query
    }

    /// Returns true when the token was consumed as a structured filter
    fn dispatch<Q: SearchQuery>(&self, query: &mut Q, keyword: &str, value: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }

        if let Some(builtin) = Keyword::from_name(keyword).filter(|k| Q::KEYWORDS.contains(k)) {
            return match query.apply(builtin, value, self.clock) {
                Ok(()) => true,
                Err(err) => {
                    debug!("'{}:{}' kept as free text: {}", keyword, value, err);
                    false
                }
            };
        }

        match resolve_field(self.fields, keyword, value) {
            Some(filter) => {
                query.push_field(filter);
                true
            }
            None => false,
        }
    }
}

/// Parse a test case search
pub fn parse_test_case_query(text: &str, fields: &[FieldDefinition], clock: &dyn TimeSource) -> TestCaseQuery {
    SearchParser::new(fields).with_clock(clock).parse(text)
}

/// Parse a test case run search
pub fn parse_test_case_run_query(
    text: &str,
    fields: &[FieldDefinition],
    clock: &dyn TimeSource,
) -> TestCaseRunQuery {
    SearchParser::new(fields).with_clock(clock).parse(text)
}

/// Parse an issue search
pub fn parse_issue_query(text: &str, fields: &[FieldDefinition], clock: &dyn TimeSource) -> IssueQuery {
    SearchParser::new(fields).with_clock(clock).parse(text)
}

/// Parse a test run search
pub fn parse_test_run_query(text: &str, fields: &[FieldDefinition], clock: &dyn TimeSource) -> TestRunQuery {
    SearchParser::new(fields).with_clock(clock).parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, IssueType, TestExecutionType, TestResult};
    use crate::search::metric::{ComparisonOp, MetricComparison};
    use crate::utils::FixedClock;
    use chrono::{Datelike, Duration, TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap())
    }

    fn catalog() -> Vec<FieldDefinition> {
        vec![FieldDefinition::new(123, "Milestone", EntityKind::TestCase)]
    }

    #[test]
    fn test_empty_query() {
        let query: TestCaseQuery = SearchParser::new(&[]).parse("   ");
        assert_eq!(query, TestCaseQuery::default());
        assert!(query.is_empty());
    }

    #[test]
    fn test_keyword_consumes_only_its_token() {
        let query = parse_test_case_query("state:open Hello", &[], &clock());
        assert_eq!(query.state.as_deref(), Some("open"));
        assert_eq!(query.text.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_is_manual() {
        let query = parse_test_case_query("is:manual Hello", &[], &clock());
        assert_eq!(query.execution_type, Some(TestExecutionType::Manual));
        assert_eq!(query.text.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_from_date() {
        let query = parse_test_case_query("from:2025-05-20", &[], &clock());
        let from = query.created_from.unwrap();
        assert_eq!((from.year(), from.month(), from.day()), (2025, 5, 20));
        assert!(query.text.is_none());
    }

    #[test]
    fn test_since_relative_to_clock() {
        let clock = clock();
        for (literal, expected) in [
            ("5h", Duration::hours(5)),
            ("4d", Duration::days(4)),
            ("2w", Duration::days(14)),
            ("120s", Duration::seconds(120)),
        ] {
            let query = parse_test_case_run_query(&format!("since:{}", literal), &[], &clock);
            assert_eq!(query.created_from, Some(clock.0 - expected), "{}", literal);
        }
    }

    #[test]
    fn test_malformed_values_become_text() {
        let query = parse_test_case_query("team-id:abc since:5x login", &[], &clock());
        assert_eq!(query.team_id, None);
        assert_eq!(query.created_from, None);
        assert_eq!(query.text.as_deref(), Some("team-id:abc since:5x login"));
    }

    #[test]
    fn test_last_keyword_wins() {
        let query = parse_test_case_query("state:draft state:review", &[], &clock());
        assert_eq!(query.state.as_deref(), Some("review"));
        assert!(query.text.is_none());
    }

    #[test]
    fn test_bad_repeat_keeps_earlier_value() {
        let query = parse_test_case_query("team-id:4 team-id:x", &[], &clock());
        assert_eq!(query.team_id, Some(4));
        assert_eq!(query.text.as_deref(), Some("team-id:x"));
    }

    #[test]
    fn test_field_resolution_uses_catalog() {
        let query = parse_test_case_query("milestone:1.0", &catalog(), &clock());
        assert_eq!(query.fields.len(), 1);
        assert_eq!(query.fields[0].field_definition_id, 123);
        assert_eq!(query.fields[0].string_value, "1.0");
        assert!(query.text.is_none());
    }

    #[test]
    fn test_field_filters_accumulate() {
        let query = parse_test_case_query("milestone:1.0 milestone:2.0", &catalog(), &clock());
        let values: Vec<&str> = query.fields.iter().map(|f| f.string_value.as_str()).collect();
        assert_eq!(values, vec!["1.0", "2.0"]);
    }

    #[test]
    fn test_builtin_keyword_is_not_shadowed_by_field() {
        let catalog = vec![FieldDefinition::new(9, "State", EntityKind::TestCase)];
        let query = parse_test_case_query("state:open", &catalog, &clock());
        assert_eq!(query.state.as_deref(), Some("open"));
        assert!(query.fields.is_empty());
    }

    #[test]
    fn test_failed_builtin_does_not_fall_through_to_field() {
        let catalog = vec![FieldDefinition::new(9, "team-id", EntityKind::TestCase)];
        let query = parse_test_case_query("team-id:abc", &catalog, &clock());
        assert!(query.fields.is_empty());
        assert_eq!(query.text.as_deref(), Some("team-id:abc"));
    }

    #[test]
    fn test_keyword_of_other_kind_is_unrecognized() {
        // `result` is a test case run keyword
        let query = parse_test_case_query("result:passed", &[], &clock());
        assert_eq!(query.text.as_deref(), Some("result:passed"));
    }

    #[test]
    fn test_keyword_of_other_kind_can_be_a_field() {
        let catalog = vec![FieldDefinition::new(44, "Result", EntityKind::TestCase)];
        let query = parse_test_case_query("result:ok", &catalog, &clock());
        assert_eq!(query.fields[0].field_definition_id, 44);
    }

    #[test]
    fn test_result_is_case_insensitive() {
        let query = parse_test_case_run_query("result:FAILED", &[], &clock());
        assert_eq!(query.result, Some(TestResult::Failed));
        let query = parse_test_case_run_query("result:flaky", &[], &clock());
        assert_eq!(query.result, None);
        assert_eq!(query.text.as_deref(), Some("result:flaky"));
    }

    #[test]
    fn test_metric_operator_longest_match() {
        let query = parse_test_case_run_query("metric:duration>=5", &[], &clock());
        let metric = query.metric.unwrap();
        assert_eq!(metric.name, "duration");
        assert_eq!(
            metric.comparison,
            Some(MetricComparison {
                op: ComparisonOp::Gte,
                threshold: 5.0
            })
        );
        assert!(query.text.is_none());
    }

    #[test]
    fn test_assigned_to_and_unassigned_exclude_each_other() {
        let query = parse_test_case_run_query("assigned-to:alice unassigned:yes", &[], &clock());
        assert_eq!(query.assigned_to_user, None);
        assert_eq!(query.unassigned, Some(true));

        let query = parse_test_case_run_query("unassigned:yes assigned-to:alice", &[], &clock());
        assert_eq!(query.assigned_to_user.as_deref(), Some("alice"));
        assert_eq!(query.unassigned, None);

        let query = parse_issue_query("unassigned:maybe", &[], &clock());
        assert_eq!(query.unassigned, None);
        assert_eq!(query.text.as_deref(), Some("unassigned:maybe"));
    }

    #[test]
    fn test_issue_keywords() {
        let query = parse_issue_query("is:incident origin:jira id:ISS-7 crash on save", &[], &clock());
        assert_eq!(query.issue_type, Some(IssueType::Incident));
        assert_eq!(query.external_system_name.as_deref(), Some("jira"));
        assert_eq!(query.external_display_id.as_deref(), Some("ISS-7"));
        assert_eq!(query.text.as_deref(), Some("crash on save"));
    }

    #[test]
    fn test_test_run_completed() {
        let query = parse_test_run_query("completed:no nightly", &[], &clock());
        assert_eq!(query.completed, Some(false));
        assert_eq!(query.text.as_deref(), Some("nightly"));
    }

    #[test]
    fn test_keyword_names_ignore_case() {
        let query = parse_test_case_query("STATE:Open", &[], &clock());
        assert_eq!(query.state.as_deref(), Some("Open"));
    }

    #[test]
    fn test_quoted_phrases_are_text() {
        let query = parse_test_case_query("\"state:open\" \"login  page\"", &[], &clock());
        assert_eq!(query.state, None);
        assert_eq!(query.text.as_deref(), Some("state:open login  page"));
    }

    #[test]
    fn test_stray_quote_does_not_swallow_later_keywords() {
        let query = parse_test_case_query("O\"Brien state:open team-id:3", &[], &clock());
        assert_eq!(query.state.as_deref(), Some("open"));
        assert_eq!(query.team_id, Some(3));
        assert_eq!(query.text.as_deref(), Some("O\"Brien"));

        let query = parse_test_case_run_query("\"oops result:failed", &[], &clock());
        assert_eq!(query.result, Some(TestResult::Failed));
        assert_eq!(query.text.as_deref(), Some("\"oops"));
    }

    #[test]
    fn test_scope_id_keywords() {
        let query = parse_test_case_query("testsuite-id:12 project-id:4", &[], &clock());
        assert_eq!(query.test_suite_id, Some(12));
        assert_eq!(query.project_id, Some(4));
        assert_eq!(query.text, None);

        let query = parse_test_case_run_query("testsuite-id:12 testrun-id:7 project-id:4", &[], &clock());
        assert_eq!(query.test_suite_id, Some(12));
        assert_eq!(query.test_run_id, Some(7));
        assert_eq!(query.project_id, Some(4));

        let query = parse_test_run_query("testrun-id:7 project-id:4", &[], &clock());
        assert_eq!(query.test_run_id, Some(7));
        assert_eq!(query.project_id, Some(4));

        let query = parse_issue_query("project-id:4", &[], &clock());
        assert_eq!(query.project_id, Some(4));
    }

    #[test]
    fn test_malformed_scope_ids_become_text() {
        let query = parse_test_case_query("testsuite-id:x project-id:1.5", &[], &clock());
        assert_eq!(query.test_suite_id, None);
        assert_eq!(query.project_id, None);
        assert_eq!(query.text.as_deref(), Some("testsuite-id:x project-id:1.5"));

        let query = parse_test_run_query("testrun-id:seven", &[], &clock());
        assert_eq!(query.test_run_id, None);
        assert_eq!(query.text.as_deref(), Some("testrun-id:seven"));

        let query = parse_test_case_run_query("testrun-id: project-id:-", &[], &clock());
        assert_eq!(query.test_run_id, None);
        assert_eq!(query.project_id, None);
    }

    #[test]
    fn test_quoted_keyword_value() {
        let query = parse_test_case_query("state:\"In Review\" x", &[], &clock());
        assert_eq!(query.state.as_deref(), Some("In Review"));
        assert_eq!(query.text.as_deref(), Some("x"));
    }

    #[test]
    fn test_empty_keyword_or_value_is_text() {
        let query = parse_test_case_query(":open state:", &[], &clock());
        assert_eq!(query.state, None);
        assert_eq!(query.text.as_deref(), Some(":open state:"));
    }

    #[test]
    fn test_parser_does_not_touch_paging() {
        let query: TestCaseQuery = SearchParser::new(&[]).parse("state:open");
        assert_eq!(query.page(), (0, crate::search::query::DEFAULT_PAGE_SIZE));
    }
}
