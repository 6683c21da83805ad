use rusqlite::{Connection, Row};

use crate::models::{FieldValue, Metric, TestCaseRun, TestResult};
use crate::repo::search::{decode_named, Record};

impl Record for TestCaseRun {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "team_id",
        "project_id",
        "test_suite_id",
        "test_run_id",
        "test_case_id",
        "name",
        "state",
        "result",
        "assigned_to_user_name",
        "created_ts",
    ];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TestCaseRun {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            team_id: row.get(2)?,
            project_id: row.get(3)?,
            test_suite_id: row.get(4)?,
            test_run_id: row.get(5)?,
            test_case_id: row.get(6)?,
            name: row.get(7)?,
            state: row.get(8)?,
            result: decode_named(row, 9, TestResult::from_name)?,
            assigned_to_user_name: row.get(10)?,
            created_ts: row.get(11)?,
            metrics: Vec::new(),
            fields: Vec::new(),
        })
    }

    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO test_case_runs (id, tenant_id, team_id, project_id, test_suite_id, test_run_id,
                    test_case_id, name, state, result, assigned_to_user_name, created_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                self.id,
                self.tenant_id,
                self.team_id,
                self.project_id,
                self.test_suite_id,
                self.test_run_id,
                self.test_case_id,
                self.name,
                self.state,
                self.result.as_str(),
                self.assigned_to_user_name,
                self.created_ts,
            ],
        )?;
        Ok(())
    }

    fn set_fields(&mut self, fields: Vec<FieldValue>) {
        self.fields = fields;
    }

    fn set_metrics(&mut self, metrics: Vec<Metric>) {
        self.metrics = metrics;
    }
}
