// In-memory evaluation and SQL push-down must select the same rows

use chrono::{TimeZone, Utc};
use rusqlite::Connection;

use testlens::db::DbConnection;
use testlens::filter::{filter_in_memory, FilterSpecification, Predicate, Property, Searchable};
use testlens::models::{
    FieldValue, Issue, IssueType, Metric, TestCase, TestCaseRun, TestExecutionType, TestResult, TestRun,
};
use testlens::repo::{Record, SearchRepo};
use testlens::search::parse_metric_expression;

const MAY_20: i64 = 1_747_742_400;

fn ids<T: Searchable>(entities: &[T]) -> Vec<i64> {
    entities.iter().map(|entity| entity.id()).collect()
}

/// Assert both forms agree and return the selected ids
fn agree<T: Record + std::fmt::Debug>(conn: &Connection, specs: &[FilterSpecification<T>]) -> Vec<i64> {
    let in_memory = filter_in_memory(SearchRepo::list_all::<T>(conn).unwrap(), specs);
    let pushed_down = SearchRepo::search(conn, specs, 0, 1000).unwrap();
    assert_eq!(ids(&in_memory), ids(&pushed_down), "specs: {:?}", specs);
    assert_eq!(SearchRepo::count(conn, specs).unwrap(), in_memory.len() as i64);
    ids(&in_memory)
}

fn seed_test_cases(conn: &Connection) {
    let mut a = TestCase::new(1, "Login with password");
    a.project_id = Some(1);
    a.team_id = Some(5);
    a.path_ids = vec![10, 11];
    a.state = Some("Ready".to_string());
    a.description = Some("Uses the ÜBER form".to_string());
    a.external_display_id = Some("TC-1".to_string());
    a.created_ts = MAY_20;
    a.fields = vec![FieldValue::new(123, "1.0"), FieldValue::new(124, "High")];

    let mut b = TestCase::new(2, "login via SSO");
    b.project_id = Some(1);
    b.path_ids = vec![10];
    b.execution_type = TestExecutionType::Automated;
    b.created_ts = MAY_20 - 86_400;
    b.fields = vec![FieldValue::new(123, "2.0")];

    let mut c = TestCase::new(3, "Logout");
    c.project_id = Some(2);
    c.path_ids = vec![110];
    c.tenant_id = "other".to_string();
    c.state = Some("ready".to_string());
    c.created_ts = MAY_20 + 60;

    for case in [a, b, c] {
        SearchRepo::insert(conn, &case).unwrap();
    }
}

fn seed_runs(conn: &Connection) {
    let mut a = TestCaseRun::new(1, "Checkout #1");
    a.result = TestResult::Failed;
    a.assigned_to_user_name = Some("jdoe".to_string());
    a.test_run_id = Some(7);
    a.metrics = vec![Metric::new("duration", 12.5), Metric::new("memory", 512.0)];
    a.created_ts = MAY_20;

    let mut b = TestCaseRun::new(2, "Checkout #2");
    b.result = TestResult::Passed;
    b.test_run_id = Some(7);
    b.metrics = vec![Metric::new("duration", 5.0)];
    b.created_ts = MAY_20;

    let mut c = TestCaseRun::new(3, "Search #1");
    c.result = TestResult::NoRun;
    c.created_ts = MAY_20;

    for run in [a, b, c] {
        SearchRepo::insert(conn, &run).unwrap();
    }
}

fn seed_issues_and_test_runs(conn: &Connection) {
    let mut a = Issue::new(1, "Crash on login");
    a.issue_type = IssueType::Incident;
    a.external_system_name = Some("jira".to_string());
    a.created_ts = MAY_20;
    let mut b = Issue::new(2, "Typo");
    b.assigned_to = Some("amy".to_string());
    b.description = Some("login page typo".to_string());
    b.created_ts = MAY_20;
    SearchRepo::insert(conn, &a).unwrap();
    SearchRepo::insert(conn, &b).unwrap();

    let mut nightly = TestRun::new(7, "Nightly");
    nightly.completed = true;
    nightly.created_ts = MAY_20;
    let mut rc = TestRun::new(8, "Release candidate");
    rc.created_ts = MAY_20;
    SearchRepo::insert(conn, &nightly).unwrap();
    SearchRepo::insert(conn, &rc).unwrap();
}

fn fixture() -> Connection {
    let conn = DbConnection::connect_in_memory().unwrap();
    seed_test_cases(&conn);
    seed_runs(&conn);
    seed_issues_and_test_runs(&conn);
    conn
}

#[test]
fn test_equals_variants_agree() {
    let conn = fixture();
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::tenant("default")]), vec![1, 2]);
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::project(2)]), vec![3]);
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::equals(Property::TeamId, 5)]), vec![1]);
    // State comparison is exact
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::equals(Property::State, "Ready")]), vec![1]);
    assert_eq!(
        agree::<TestCase>(&conn, &[FilterSpecification::equals(Property::ExecutionType, "Automated")]),
        vec![2]
    );
    assert_eq!(
        agree::<TestCaseRun>(&conn, &[FilterSpecification::equals(Property::Result, "Failed")]),
        vec![1]
    );
    assert_eq!(agree::<TestRun>(&conn, &[FilterSpecification::equals(Property::Completed, true)]), vec![7]);
    assert_eq!(agree::<TestRun>(&conn, &[FilterSpecification::equals(Property::Completed, false)]), vec![8]);
    assert_eq!(agree::<TestRun>(&conn, &[FilterSpecification::equals(Property::Id, 8)]), vec![8]);
}

#[test]
fn test_type_mismatch_and_unmapped_properties_agree() {
    let conn = fixture();
    assert!(agree::<TestCase>(&conn, &[FilterSpecification::equals(Property::TeamId, "5")]).is_empty());
    // Test cases have no result column
    assert!(agree::<TestCase>(&conn, &[FilterSpecification::equals(Property::Result, "Failed")]).is_empty());
    assert_eq!(
        agree::<TestCase>(&conn, &[FilterSpecification::presence(Property::Result, false)]),
        vec![1, 2, 3]
    );
    assert!(agree::<TestRun>(&conn, &[FilterSpecification::in_path(10)]).is_empty());
}

#[test]
fn test_contains_and_text_agree() {
    let conn = fixture();
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::text("LOGIN")]), vec![1, 2]);
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::text("tc-1")]), vec![1]);
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::text("über")]), Vec::<i64>::new());
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::text("ÜBER")]), vec![1]);
    assert_eq!(agree::<Issue>(&conn, &[FilterSpecification::text("login")]), vec![1, 2]);
    assert_eq!(agree::<TestRun>(&conn, &[FilterSpecification::text("night")]), vec![7]);
    assert_eq!(
        agree::<Issue>(&conn, &[FilterSpecification::contains(Property::ExternalSystemName, "JI")]),
        vec![1]
    );
}

#[test]
fn test_presence_agrees() {
    let conn = fixture();
    assert_eq!(
        agree::<TestCaseRun>(&conn, &[FilterSpecification::presence(Property::AssignedTo, false)]),
        vec![2, 3]
    );
    assert_eq!(
        agree::<Issue>(&conn, &[FilterSpecification::presence(Property::AssignedTo, true)]),
        vec![2]
    );
    assert_eq!(
        agree::<TestCase>(&conn, &[FilterSpecification::presence(Property::State, true)]),
        vec![1, 3]
    );
}

#[test]
fn test_on_or_after_agrees() {
    let conn = fixture();
    let bound = Utc.timestamp_opt(MAY_20, 0).unwrap();
    assert_eq!(
        agree::<TestCase>(&conn, &[FilterSpecification::on_or_after(Property::Created, bound)]),
        vec![1, 3]
    );
    let later = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    assert!(agree::<TestRun>(&conn, &[FilterSpecification::on_or_after(Property::Created, later)]).is_empty());
}

#[test]
fn test_in_path_matches_whole_ids_only() {
    let conn = fixture();
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::in_path(10)]), vec![1, 2]);
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::in_path(11)]), vec![1]);
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::in_path(110)]), vec![3]);
    assert!(agree::<TestCase>(&conn, &[FilterSpecification::in_path(1)]).is_empty());
}

#[test]
fn test_metric_conditions_agree() {
    let conn = fixture();
    let cases: [(&str, Vec<i64>); 8] = [
        ("duration", vec![1, 2]),
        ("duration>5", vec![1]),
        ("duration>=5", vec![1, 2]),
        ("duration<=5", vec![2]),
        ("duration==12.5", vec![1]),
        ("duration!=5", vec![1]),
        ("memory<100", vec![]),
        ("cpu", vec![]),
    ];
    for (expression, expected) in cases {
        let condition = parse_metric_expression(expression).unwrap();
        assert_eq!(
            agree::<TestCaseRun>(&conn, &[FilterSpecification::metric(condition)]),
            expected,
            "{}",
            expression
        );
    }
    // Only test case runs carry metrics
    let condition = parse_metric_expression("duration").unwrap();
    assert!(agree::<TestCase>(&conn, &[FilterSpecification::metric(condition)]).is_empty());
}

#[test]
fn test_field_values_agree() {
    let conn = fixture();
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::field_value(123, "1.0")]), vec![1]);
    assert_eq!(agree::<TestCase>(&conn, &[FilterSpecification::field_value(123, "2.0")]), vec![2]);
    assert!(agree::<TestCase>(&conn, &[FilterSpecification::field_value(124, "high")]).is_empty());
    // Same owner id, different kind
    assert!(agree::<TestCaseRun>(&conn, &[FilterSpecification::field_value(123, "1.0")]).is_empty());
}

#[test]
fn test_conjunctions_agree() {
    let conn = fixture();
    let specs = vec![
        FilterSpecification::<TestCase>::tenant("default"),
        FilterSpecification::in_path(10),
        FilterSpecification::field_value(123, "1.0"),
        FilterSpecification::text("login"),
    ];
    assert_eq!(agree(&conn, &specs), vec![1]);

    let nested = FilterSpecification::<TestCaseRun>::new(Predicate::All(vec![
        Predicate::All(vec![]),
        FilterSpecification::<TestCaseRun>::equals(Property::TestRunId, 7).into_predicate(),
    ]));
    assert_eq!(agree(&conn, &[nested]), vec![1, 2]);
    assert_eq!(agree::<Issue>(&conn, &[]), vec![1, 2]);
}
