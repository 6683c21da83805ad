use rusqlite::{Connection, Row};

use crate::models::{decode_path, encode_path, FieldValue, TestCase, TestExecutionType};
use crate::repo::search::{decode_named, Record};

impl Record for TestCase {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "team_id",
        "project_id",
        "test_suite_id",
        "path",
        "external_display_id",
        "name",
        "description",
        "state",
        "execution_type",
        "created_ts",
    ];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TestCase {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            team_id: row.get(2)?,
            project_id: row.get(3)?,
            test_suite_id: row.get(4)?,
            path_ids: decode_path(&row.get::<_, String>(5)?),
            external_display_id: row.get(6)?,
            name: row.get(7)?,
            description: row.get(8)?,
            state: row.get(9)?,
            execution_type: decode_named(row, 10, TestExecutionType::from_name)?,
            created_ts: row.get(11)?,
            fields: Vec::new(),
        })
    }

    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO test_cases (id, tenant_id, team_id, project_id, test_suite_id, path,
                    external_display_id, name, description, state, execution_type, created_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                self.id,
                self.tenant_id,
                self.team_id,
                self.project_id,
                self.test_suite_id,
                encode_path(&self.path_ids),
                self.external_display_id,
                self.name,
                self.description,
                self.state,
                self.execution_type.as_str(),
                self.created_ts,
            ],
        )?;
        Ok(())
    }

    fn set_fields(&mut self, fields: Vec<FieldValue>) {
        self.fields = fields;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::repo::SearchRepo;

    #[test]
    fn test_test_case_round_trip() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let mut case = TestCase::new(11, "Checkout");
        case.path_ids = vec![1, 4];
        case.execution_type = TestExecutionType::Hybrid;
        case.description = Some("Pays with a card".to_string());
        case.fields = vec![FieldValue::new(3, "1.0")];
        SearchRepo::insert(&conn, &case).unwrap();

        let stored = SearchRepo::list_all::<TestCase>(&conn).unwrap();
        assert_eq!(stored, vec![case]);
    }
}
