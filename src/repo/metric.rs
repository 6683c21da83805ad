use rusqlite::Connection;
use anyhow::{Context, Result};

use crate::models::{EntityKind, Metric};

/// Metrics owned by entities
pub struct MetricRepo;

impl MetricRepo {
    pub fn add(conn: &Connection, kind: EntityKind, owner_id: i64, metric: &Metric) -> Result<()> {
        if !metric.value.is_finite() {
            anyhow::bail!(
                "Metric '{}' on {} {} has a non-finite value",
                metric.name,
                kind,
                owner_id
            );
        }
        conn.execute(
            "INSERT INTO metrics (owner_kind, owner_id, name, value) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![kind.as_str(), owner_id, metric.name, metric.value],
        )
        .with_context(|| format!("Failed to add metric '{}' to {} {}", metric.name, kind, owner_id))?;
        Ok(())
    }

    pub fn list_for_owner(conn: &Connection, kind: EntityKind, owner_id: i64) -> Result<Vec<Metric>> {
        let mut stmt = conn.prepare_cached(
            "SELECT name, value FROM metrics WHERE owner_kind = ?1 AND owner_id = ?2 ORDER BY id",
        )?;
        let rows = stmt.query_map(rusqlite::params![kind.as_str(), owner_id], |row| {
            Ok(Metric {
                name: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
