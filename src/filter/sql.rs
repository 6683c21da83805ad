//! SQL push-down form of filter specifications
//!
//! Renders a [`Predicate`] into a SQLite `WHERE` fragment with positional `?`
//! parameters. The entity table is expected under the alias `t`; metrics and
//! field values are matched with correlated `EXISTS` subqueries.
//!
//! Unmapped properties render as `NULL`, which gives them the same meaning as a
//! missing value in the in-memory form. Text comparisons go through `lower()`,
//! which folds ASCII only, matching the in-memory comparison.

use rusqlite::types::Value as SqlValue;

use crate::filter::spec::{Predicate, Property, Searchable, Value, ValueKind};

/// Alias under which the searched table must appear
pub const TABLE_ALIAS: &str = "t";

/// A `WHERE` fragment and its parameters, in placeholder order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlClause {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl SqlClause {
    fn push_param(&mut self, value: SqlValue) {
        self.params.push(value);
    }
}

/// Render `predicate` against the columns of `T`
pub fn render<T: Searchable>(predicate: &Predicate) -> SqlClause {
    let mut clause = SqlClause::default();
    let sql = write_predicate::<T>(predicate, &mut clause);
    clause.sql = sql;
    clause
}

fn column<T: Searchable>(property: Property) -> String {
    match T::column(property) {
        Some(name) => format!("{}.{}", TABLE_ALIAS, name),
        None => "NULL".to_string(),
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Int(v) => SqlValue::Integer(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
    }
}

fn write_predicate<T: Searchable>(predicate: &Predicate, clause: &mut SqlClause) -> String {
    match predicate {
        Predicate::Equals { property, value } => {
            if value.kind() != property.value_kind() {
                return "0".to_string();
            }
            clause.push_param(to_sql_value(value));
            format!("{} = ?", column::<T>(*property))
        }
        Predicate::Contains { property, needle } => {
            if property.value_kind() != ValueKind::Text {
                return "0".to_string();
            }
            clause.push_param(SqlValue::Text(needle.clone()));
            format!("instr(lower({}), lower(?)) > 0", column::<T>(*property))
        }
        Predicate::Presence { property, present } => {
            let test = if *present { "IS NOT NULL" } else { "IS NULL" };
            format!("{} {}", column::<T>(*property), test)
        }
        Predicate::OnOrAfter { property, bound } => {
            if property.value_kind() != ValueKind::Int {
                return "0".to_string();
            }
            clause.push_param(SqlValue::Integer(bound.timestamp()));
            format!("{} >= ?", column::<T>(*property))
        }
        Predicate::InPath { folder_id } => match T::PATH_COLUMN {
            Some(path) => {
                clause.push_param(SqlValue::Text(format!("/{}/", folder_id)));
                format!("instr({}.{}, ?) > 0", TABLE_ALIAS, path)
            }
            None => "0".to_string(),
        },
        Predicate::Metric(condition) => {
            clause.push_param(SqlValue::Text(T::KIND.as_str().to_string()));
            clause.push_param(SqlValue::Text(condition.name.clone()));
            let mut sql = format!(
                "EXISTS (SELECT 1 FROM metrics m WHERE m.owner_kind = ? AND m.owner_id = {}.id AND m.name = ?",
                TABLE_ALIAS
            );
            if let Some(comparison) = &condition.comparison {
                clause.push_param(SqlValue::Real(comparison.threshold));
                sql.push_str(&format!(" AND m.value {} ?", comparison.op.sql_symbol()));
            }
            sql.push(')');
            sql
        }
        Predicate::FieldValue {
            field_definition_id,
            value,
        } => {
            clause.push_param(SqlValue::Text(T::KIND.as_str().to_string()));
            clause.push_param(SqlValue::Integer(*field_definition_id));
            clause.push_param(SqlValue::Text(value.clone()));
            format!(
                "EXISTS (SELECT 1 FROM field_values f WHERE f.owner_kind = ? AND f.owner_id = {}.id \
                 AND f.field_definition_id = ? AND f.string_value = ?)",
                TABLE_ALIAS
            )
        }
        Predicate::Text(needle) => {
            if T::TEXT_COLUMNS.is_empty() {
                return "0".to_string();
            }
            let parts: Vec<String> = T::TEXT_COLUMNS
                .iter()
                .map(|name| {
                    clause.push_param(SqlValue::Text(needle.clone()));
                    format!("instr(lower({}.{}), lower(?)) > 0", TABLE_ALIAS, name)
                })
                .collect();
            format!("({})", parts.join(" OR "))
        }
        Predicate::All(predicates) => {
            if predicates.is_empty() {
                return "1".to_string();
            }
            let parts: Vec<String> = predicates
                .iter()
                .map(|p| format!("({})", write_predicate::<T>(p, clause)))
                .collect();
            parts.join(" AND ")
        }
    }
}
