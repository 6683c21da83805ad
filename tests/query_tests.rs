// Query language behaviour through the public API

use chrono::{Duration, TimeZone, Utc};

use testlens::filter::{assemble, matches_all, FilterSpecification, Predicate, Property, QueryAssembler};
use testlens::models::{EntityKind, FieldDefinition, TestCase, TestCaseRun, TestExecutionType, TestResult, TestRun};
use testlens::search::{
    parse_issue_query, parse_test_case_query, parse_test_case_run_query, parse_test_run_query, ComparisonOp,
    SearchParser, SearchQuery, TestCaseQuery,
};
use testlens::utils::FixedClock;

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap())
}

fn catalog() -> Vec<FieldDefinition> {
    vec![FieldDefinition::new(123, "Milestone", EntityKind::TestCase)]
}

#[test]
fn test_plain_text_is_kept_verbatim() {
    let query = parse_test_case_query("flaky   login  page", &[], &clock());
    assert_eq!(query.text.as_deref(), Some("flaky login page"));
    assert!(query.specifications().is_empty());
}

#[test]
fn test_relative_times_resolve_against_clock() {
    let now = clock().0;
    for (literal, expected) in [
        ("5h", Duration::hours(5)),
        ("4d", Duration::days(4)),
        ("2w", Duration::weeks(2)),
        ("120s", Duration::seconds(120)),
    ] {
        let query = parse_test_case_run_query(&format!("since:{}", literal), &[], &clock());
        assert_eq!(query.created_from, Some(now - expected), "{}", literal);
        assert_eq!(query.text, None);
    }
}

#[test]
fn test_keyword_consumes_only_its_token() {
    let query = parse_test_case_query("state:Ongoing login page", &[], &clock());
    assert_eq!(query.state.as_deref(), Some("Ongoing"));
    assert_eq!(query.text.as_deref(), Some("login page"));
}

#[test]
fn test_metric_operator_is_longest_match() {
    let query = parse_test_case_run_query("metric:duration>=2.5", &[], &clock());
    let metric = query.metric.unwrap();
    assert_eq!(metric.name, "duration");
    let comparison = metric.comparison.unwrap();
    assert_eq!(comparison.op, ComparisonOp::Gte);
    assert_eq!(comparison.threshold, 2.5);
}

#[test]
fn test_catalog_field_resolution() {
    let query = parse_test_case_query("milestone:1.0", &catalog(), &clock());
    assert_eq!(query.fields.len(), 1);
    assert_eq!(query.fields[0].field_definition_id, 123);
    assert_eq!(query.fields[0].string_value, "1.0");

    // Without the catalog entry the token is plain text
    let query = parse_test_case_query("milestone:1.0", &[], &clock());
    assert_eq!(query.text.as_deref(), Some("milestone:1.0"));
}

#[test]
fn test_malformed_id_degrades_to_text() {
    let query = parse_test_case_query("team-id:abc Hello", &[], &clock());
    assert_eq!(query.team_id, None);
    assert_eq!(query.text.as_deref(), Some("team-id:abc Hello"));
}

#[test]
fn test_execution_type_with_text() {
    let query = parse_test_case_query("is:manual Hello", &[], &clock());
    assert_eq!(query.execution_type, Some(TestExecutionType::Manual));
    assert_eq!(query.text.as_deref(), Some("Hello"));
}

#[test]
fn test_absolute_from_date() {
    let query = parse_issue_query("from:2025-05-20", &[], &clock());
    assert_eq!(query.created_from, Some(Utc.with_ymd_and_hms(2025, 5, 20, 0, 0, 0).unwrap()));
}

#[test]
fn test_keywords_outside_the_kind_are_text() {
    // result: belongs to test case runs only
    let query = parse_test_run_query("result:failed completed:yes", &[], &clock());
    assert_eq!(query.completed, Some(true));
    assert_eq!(query.text.as_deref(), Some("result:failed"));

    let query = parse_test_case_run_query("result:failed", &[], &clock());
    assert_eq!(query.result, Some(TestResult::Failed));
}

#[test]
fn test_assembly_is_ordered_and_conjunctive() {
    let query: TestCaseQuery = SearchParser::new(&catalog())
        .with_clock(&clock())
        .parse("login is:manual milestone:1.0");
    let specs = QueryAssembler::new().tenant("acme").project(1).build(&query);

    let predicates: Vec<&Predicate> = specs.iter().map(FilterSpecification::predicate).collect();
    assert_eq!(
        predicates,
        vec![
            FilterSpecification::<TestCase>::tenant("acme").predicate(),
            FilterSpecification::<TestCase>::project(1).predicate(),
            FilterSpecification::<TestCase>::equals(Property::ExecutionType, "Manual").predicate(),
            FilterSpecification::<TestCase>::field_value(123, "1.0").predicate(),
            FilterSpecification::<TestCase>::text("login").predicate(),
        ]
    );

    let mut case = TestCase::new(1, "Login page");
    case.tenant_id = "acme".to_string();
    case.project_id = Some(1);
    case.fields = vec![testlens::models::FieldValue::new(123, "1.0")];
    assert!(matches_all(&specs, &case));

    // Tenant filter is never dropped, even when everything else matches
    case.tenant_id = "other".to_string();
    assert!(!matches_all(&specs, &case));
}

#[test]
fn test_empty_query_still_scopes_by_tenant() {
    let query = parse_test_case_run_query("", &[], &clock());
    assert!(query.is_empty());
    let specs = assemble(vec![FilterSpecification::tenant("acme")], &query);
    assert_eq!(specs.len(), 1);

    let run = TestCaseRun::new(1, "anything");
    assert!(!matches_all(&specs, &run));
}

#[test]
fn test_testrun_id_selects_that_run() {
    let query = parse_test_run_query("testrun-id:7", &[], &clock());
    let specs = QueryAssembler::new().tenant("default").build(&query);

    let runs: Vec<TestRun> = (5..10).map(|id| TestRun::new(id, "nightly")).collect();
    let selected: Vec<i64> = runs
        .iter()
        .filter(|run| matches_all(&specs, *run))
        .map(|run| run.id)
        .collect();
    assert_eq!(selected, vec![7]);
}

#[test]
fn test_stray_quote_keeps_following_filters() {
    let query = parse_test_case_query("O\"Brien state:open", &[], &clock());
    let specs = QueryAssembler::new().tenant("default").build(&query);

    let mut open = TestCase::new(1, "Greets O\"Brien");
    open.state = Some("open".to_string());
    let mut closed = TestCase::new(2, "Greets O\"Brien");
    closed.state = Some("closed".to_string());

    assert!(matches_all(&specs, &open));
    assert!(!matches_all(&specs, &closed));
}
