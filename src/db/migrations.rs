use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn)?;

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::debug!("Applied schema migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: searchable entity tables
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE test_cases (
            id INTEGER PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            team_id INTEGER NULL,
            project_id INTEGER NULL,
            test_suite_id INTEGER NULL,
            path TEXT NOT NULL DEFAULT '/',
            external_display_id TEXT NULL,
            name TEXT NOT NULL,
            description TEXT NULL,
            state TEXT NULL,
            execution_type TEXT NOT NULL CHECK(execution_type IN ('Manual','Automated','Hybrid')),
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;
    // Note: path holds folder ancestors as '/1/4/9/', root first

    tx.execute(
        "CREATE TABLE test_case_runs (
            id INTEGER PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            team_id INTEGER NULL,
            project_id INTEGER NULL,
            test_suite_id INTEGER NULL,
            test_run_id INTEGER NULL,
            test_case_id INTEGER NULL,
            name TEXT NOT NULL,
            state TEXT NULL,
            result TEXT NOT NULL,
            assigned_to_user_name TEXT NULL,
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE issues (
            id INTEGER PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            team_id INTEGER NULL,
            project_id INTEGER NULL,
            external_display_id TEXT NULL,
            external_system_name TEXT NULL,
            title TEXT NOT NULL,
            description TEXT NULL,
            state TEXT NULL,
            issue_type TEXT NOT NULL CHECK(issue_type IN ('Issue','Incident')),
            assigned_to TEXT NULL,
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE test_runs (
            id INTEGER PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            team_id INTEGER NULL,
            project_id INTEGER NULL,
            name TEXT NOT NULL,
            state TEXT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    for (table, column) in [
        ("test_cases", "tenant_id"),
        ("test_cases", "project_id"),
        ("test_case_runs", "tenant_id"),
        ("test_case_runs", "test_run_id"),
        ("issues", "tenant_id"),
        ("test_runs", "tenant_id"),
    ] {
        tx.execute(
            &format!("CREATE INDEX idx_{table}_{column} ON {table}({column})"),
            [],
        )?;
    }

    Ok(())
}

/// Migration v2: custom field catalog, field values and metrics
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE field_definitions (
            id INTEGER PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            project_id INTEGER NULL,
            name TEXT NOT NULL,
            trait_type TEXT NOT NULL,
            target TEXT NOT NULL CHECK(target IN ('test-case','test-case-run','issue','test-run'))
        )",
        [],
    )?;
    // Note: project_id NULL means the definition applies to every project of the tenant

    // owner_kind + owner_id point at a row of one of the entity tables
    tx.execute(
        "CREATE TABLE field_values (
            id INTEGER PRIMARY KEY,
            owner_kind TEXT NOT NULL,
            owner_id INTEGER NOT NULL,
            field_definition_id INTEGER NOT NULL REFERENCES field_definitions(id),
            string_value TEXT NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_field_values_owner ON field_values(owner_kind, owner_id)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE metrics (
            id INTEGER PRIMARY KEY,
            owner_kind TEXT NOT NULL,
            owner_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            value REAL NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_metrics_owner ON metrics(owner_kind, owner_id)",
        [],
    )?;

    Ok(())
}
