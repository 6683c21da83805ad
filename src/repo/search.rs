use rusqlite::{Connection, Row};
use anyhow::{Context, Result};
use log::debug;

use crate::filter::{FilterSpecification, Searchable, SqlClause, TABLE_ALIAS};
use crate::models::{FieldValue, Metric};
use crate::repo::field::FieldValueRepo;
use crate::repo::metric::MetricRepo;

/// A searchable entity that maps to one row of its table
pub trait Record: Searchable + Sized {
    /// Selected columns, in the order `from_row` reads them
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row) -> rusqlite::Result<Self>;

    /// Insert the entity row (without fields and metrics)
    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()>;

    fn set_fields(&mut self, fields: Vec<FieldValue>);

    fn set_metrics(&mut self, _metrics: Vec<Metric>) {}
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized stored value '{0}'")]
struct UnknownStoredValue(String);

/// Decode a stored enum name, failing the row if it is not recognized
pub(crate) fn decode_named<T>(
    row: &Row,
    index: usize,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let name: String = row.get(index)?;
    parse(&name).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(UnknownStoredValue(name)),
        )
    })
}

/// Repository executing specification lists against the entity tables
pub struct SearchRepo;

impl SearchRepo {
    /// Insert an entity together with its field values and metrics.
    /// Not transactional on its own; bulk loads wrap calls in one transaction.
    pub fn insert<T: Record>(conn: &Connection, entity: &T) -> Result<()> {
        entity
            .insert_row(conn)
            .with_context(|| format!("Failed to insert {} {}", T::KIND, entity.id()))?;
        for field in entity.fields() {
            FieldValueRepo::add(conn, T::KIND, entity.id(), field)?;
        }
        for metric in entity.metrics() {
            MetricRepo::add(conn, T::KIND, entity.id(), metric)?;
        }
        Ok(())
    }

    /// One page of entities matching every specification, ordered by id
    pub fn search<T: Record>(
        conn: &Connection,
        specs: &[FilterSpecification<T>],
        offset: usize,
        count: usize,
    ) -> Result<Vec<T>> {
        let mut clause = where_clause(specs);
        clause.sql.push_str(" LIMIT ? OFFSET ?");
        clause.params.push(rusqlite::types::Value::Integer(to_i64(count)));
        clause.params.push(rusqlite::types::Value::Integer(to_i64(offset)));
        Self::select(conn, &clause)
    }

    /// Number of entities matching every specification
    pub fn count<T: Record>(conn: &Connection, specs: &[FilterSpecification<T>]) -> Result<i64> {
        let clause = where_clause(specs);
        let sql = format!(
            "SELECT COUNT(*) FROM {} {} WHERE {}",
            T::TABLE,
            TABLE_ALIAS,
            clause.sql
        );
        debug!("count sql: {}", sql);
        conn.query_row(&sql, rusqlite::params_from_iter(clause.params.iter()), |row| row.get(0))
            .with_context(|| format!("Failed to count {} rows", T::KIND))
    }

    /// Every stored entity of the kind, ordered by id
    pub fn list_all<T: Record>(conn: &Connection) -> Result<Vec<T>> {
        Self::select(conn, &where_clause::<T>(&[]))
    }

    fn select<T: Record>(conn: &Connection, clause: &SqlClause) -> Result<Vec<T>> {
        let columns: Vec<String> = T::COLUMNS
            .iter()
            .map(|column| format!("{}.{}", TABLE_ALIAS, column))
            .collect();
        let sql = format!(
            "SELECT {} FROM {} {} WHERE {}",
            columns.join(", "),
            T::TABLE,
            TABLE_ALIAS,
            clause.sql
        );
        debug!("search sql: {}", sql);

        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("Failed to prepare search over {}", T::TABLE))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(clause.params.iter()), T::from_row)?;

        let mut entities = Vec::new();
        for row in rows {
            let mut entity = row?;
            entity.set_fields(FieldValueRepo::list_for_owner(conn, T::KIND, entity.id())?);
            entity.set_metrics(MetricRepo::list_for_owner(conn, T::KIND, entity.id())?);
            entities.push(entity);
        }
        Ok(entities)
    }
}

/// Conjunction of all specifications, followed by the id ordering
fn where_clause<T: Searchable>(specs: &[FilterSpecification<T>]) -> SqlClause {
    let mut clause = FilterSpecification::all(specs.iter().cloned()).to_sql();
    clause.sql.push_str(&format!(" ORDER BY {}.id", TABLE_ALIAS));
    clause
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
