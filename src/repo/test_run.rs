use rusqlite::{Connection, Row};

use crate::models::{FieldValue, TestRun};
use crate::repo::search::Record;

impl Record for TestRun {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "team_id",
        "project_id",
        "name",
        "state",
        "completed",
        "created_ts",
    ];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TestRun {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            team_id: row.get(2)?,
            project_id: row.get(3)?,
            name: row.get(4)?,
            state: row.get(5)?,
            completed: row.get(6)?,
            created_ts: row.get(7)?,
            fields: Vec::new(),
        })
    }

    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO test_runs (id, tenant_id, team_id, project_id, name, state, completed, created_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                self.id,
                self.tenant_id,
                self.team_id,
                self.project_id,
                self.name,
                self.state,
                self.completed,
                self.created_ts,
            ],
        )?;
        Ok(())
    }

    fn set_fields(&mut self, fields: Vec<FieldValue>) {
        self.fields = fields;
    }
}
