// JSON dataset import

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::cli::error::UserError;
use crate::models::{FieldDefinition, Issue, TestCase, TestCaseRun, TestRun};
use crate::repo::{FieldDefinitionRepo, SearchRepo};

/// Contents of an import file. Every section is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub field_definitions: Vec<FieldDefinition>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub test_case_runs: Vec<TestCaseRun>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub test_runs: Vec<TestRun>,
}

/// Per-section counts of imported records
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub field_definitions: usize,
    pub test_cases: usize,
    pub test_case_runs: usize,
    pub issues: usize,
    pub test_runs: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.field_definitions + self.test_cases + self.test_case_runs + self.issues + self.test_runs
    }
}

/// Read and decode an import file; unreadable or malformed files are user errors
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| UserError::new(format!("Cannot read {}: {}", path.display(), e)))?;
    let dataset = serde_json::from_str(&content)
        .map_err(|e| UserError::new(format!("Invalid dataset {}: {}", path.display(), e)))?;
    Ok(dataset)
}

/// Store the whole dataset in one transaction
pub fn import_dataset(conn: &Connection, dataset: &Dataset) -> Result<ImportSummary> {
    let tx = conn.unchecked_transaction()?;

    for definition in &dataset.field_definitions {
        FieldDefinitionRepo::create(&tx, definition)?;
    }
    for case in &dataset.test_cases {
        SearchRepo::insert(&tx, case)?;
    }
    for run in &dataset.test_case_runs {
        SearchRepo::insert(&tx, run)?;
    }
    for issue in &dataset.issues {
        SearchRepo::insert(&tx, issue)?;
    }
    for run in &dataset.test_runs {
        SearchRepo::insert(&tx, run)?;
    }

    tx.commit().context("Failed to commit import")?;

    let summary = ImportSummary {
        field_definitions: dataset.field_definitions.len(),
        test_cases: dataset.test_cases.len(),
        test_case_runs: dataset.test_case_runs.len(),
        issues: dataset.issues.len(),
        test_runs: dataset.test_runs.len(),
    };
    info!("Imported {} records", summary.total());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::{EntityKind, TestResult};

    const DATASET: &str = r#"{
        "field_definitions": [
            {"id": 10, "name": "Milestone", "target": "test-case", "project_id": 1}
        ],
        "test_cases": [
            {"id": 1, "name": "Login", "project_id": 1, "path_ids": [2, 5],
             "fields": [{"field_definition_id": 10, "string_value": "1.0"}]}
        ],
        "test_case_runs": [
            {"id": 1, "name": "Login #1", "result": "Failed",
             "metrics": [{"name": "duration", "value": 4.2}]}
        ]
    }"#;

    #[test]
    fn test_import_dataset() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let dataset: Dataset = serde_json::from_str(DATASET).unwrap();
        let summary = import_dataset(&conn, &dataset).unwrap();
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.issues, 0);

        let cases = SearchRepo::list_all::<TestCase>(&conn).unwrap();
        assert_eq!(cases[0].path_ids, vec![2, 5]);
        assert_eq!(cases[0].fields.len(), 1);

        let runs = SearchRepo::list_all::<TestCaseRun>(&conn).unwrap();
        assert_eq!(runs[0].result, TestResult::Failed);
        assert_eq!(runs[0].metrics[0].value, 4.2);

        let catalog = FieldDefinitionRepo::list_for(&conn, "default", Some(1), EntityKind::TestCase).unwrap();
        assert_eq!(catalog[0].id, 10);
    }

    #[test]
    fn test_failed_import_leaves_nothing_behind() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let dataset: Dataset = serde_json::from_str(
            r#"{"test_cases": [{"id": 1, "name": "A"}, {"id": 1, "name": "B"}]}"#,
        )
        .unwrap();
        assert!(import_dataset(&conn, &dataset).is_err());
        assert!(SearchRepo::list_all::<TestCase>(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_user_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_dataset(&path).unwrap_err();
        assert!(err.downcast_ref::<UserError>().is_some());
    }
}
