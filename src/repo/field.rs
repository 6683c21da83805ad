use rusqlite::{Connection, Row};
use anyhow::{Context, Result};

use crate::models::{EntityKind, FieldDefinition, FieldValue, TraitType};
use crate::repo::search::decode_named;

/// Field definition catalog
pub struct FieldDefinitionRepo;

impl FieldDefinitionRepo {
    /// Store a definition. An id of 0 lets the database assign one.
    pub fn create(conn: &Connection, definition: &FieldDefinition) -> Result<FieldDefinition> {
        let id = (definition.id != 0).then_some(definition.id);
        conn.execute(
            "INSERT INTO field_definitions (id, tenant_id, project_id, name, trait_type, target)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                id,
                definition.tenant_id,
                definition.project_id,
                definition.name,
                definition.trait_type.as_str(),
                definition.target.as_str(),
            ],
        )
        .with_context(|| format!("Failed to create field definition: {}", definition.name))?;

        Ok(FieldDefinition {
            id: conn.last_insert_rowid(),
            ..definition.clone()
        })
    }

    /// Catalog for one tenant, project and entity kind, in id order.
    /// Tenant-wide definitions (no project) are included.
    pub fn list_for(
        conn: &Connection,
        tenant_id: &str,
        project_id: Option<i64>,
        kind: EntityKind,
    ) -> Result<Vec<FieldDefinition>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, trait_type, target, tenant_id, project_id
             FROM field_definitions
             WHERE tenant_id = ?1 AND target = ?2 AND (project_id IS NULL OR project_id = ?3)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![tenant_id, kind.as_str(), project_id],
            Self::row_to_definition,
        )?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load field definitions")
    }

    /// Every definition of a tenant, optionally narrowed to one kind
    pub fn list_all(
        conn: &Connection,
        tenant_id: &str,
        kind: Option<EntityKind>,
    ) -> Result<Vec<FieldDefinition>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, trait_type, target, tenant_id, project_id
             FROM field_definitions
             WHERE tenant_id = ?1 AND (?2 IS NULL OR target = ?2)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![tenant_id, kind.map(|k| k.as_str())],
            Self::row_to_definition,
        )?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load field definitions")
    }

    fn row_to_definition(row: &Row) -> rusqlite::Result<FieldDefinition> {
        Ok(FieldDefinition {
            id: row.get(0)?,
            name: row.get(1)?,
            trait_type: decode_named(row, 2, TraitType::from_name)?,
            target: decode_named(row, 3, EntityKind::from_str)?,
            tenant_id: row.get(4)?,
            project_id: row.get(5)?,
        })
    }
}

/// Field values owned by entities
pub struct FieldValueRepo;

impl FieldValueRepo {
    pub fn add(conn: &Connection, kind: EntityKind, owner_id: i64, value: &FieldValue) -> Result<()> {
        conn.execute(
            "INSERT INTO field_values (owner_kind, owner_id, field_definition_id, string_value)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![kind.as_str(), owner_id, value.field_definition_id, value.string_value],
        )
        .with_context(|| {
            format!(
                "Failed to add field {} to {} {}",
                value.field_definition_id, kind, owner_id
            )
        })?;
        Ok(())
    }

    pub fn list_for_owner(conn: &Connection, kind: EntityKind, owner_id: i64) -> Result<Vec<FieldValue>> {
        let mut stmt = conn.prepare_cached(
            "SELECT field_definition_id, string_value FROM field_values
             WHERE owner_kind = ?1 AND owner_id = ?2 ORDER BY id",
        )?;
        let rows = stmt.query_map(rusqlite::params![kind.as_str(), owner_id], |row| {
            Ok(FieldValue {
                field_definition_id: row.get(0)?,
                string_value: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
