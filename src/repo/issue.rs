use rusqlite::{Connection, Row};

use crate::models::{FieldValue, Issue, IssueType};
use crate::repo::search::{decode_named, Record};

impl Record for Issue {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "team_id",
        "project_id",
        "external_display_id",
        "external_system_name",
        "title",
        "description",
        "state",
        "issue_type",
        "assigned_to",
        "created_ts",
    ];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Issue {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            team_id: row.get(2)?,
            project_id: row.get(3)?,
            external_display_id: row.get(4)?,
            external_system_name: row.get(5)?,
            title: row.get(6)?,
            description: row.get(7)?,
            state: row.get(8)?,
            issue_type: decode_named(row, 9, IssueType::from_name)?,
            assigned_to: row.get(10)?,
            created_ts: row.get(11)?,
            fields: Vec::new(),
        })
    }

    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO issues (id, tenant_id, team_id, project_id, external_display_id,
                    external_system_name, title, description, state, issue_type, assigned_to, created_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                self.id,
                self.tenant_id,
                self.team_id,
                self.project_id,
                self.external_display_id,
                self.external_system_name,
                self.title,
                self.description,
                self.state,
                self.issue_type.as_str(),
                self.assigned_to,
                self.created_ts,
            ],
        )?;
        Ok(())
    }

    fn set_fields(&mut self, fields: Vec<FieldValue>) {
        self.fields = fields;
    }
}
