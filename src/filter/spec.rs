//! Filter specification model
//!
//! A [`FilterSpecification`] is a typed predicate over one entity kind. The
//! predicate itself is the closed [`Predicate`] enum; the same node drives both
//! the in-memory check ([`FilterSpecification::is_match`]) and the SQL push-down
//! form ([`FilterSpecification::to_sql`]), so the two cannot drift apart.
//!
//! # Matching rules
//!
//! - `Equals` compares exactly (case-sensitive for text)
//! - `Contains` and `Text` fold ASCII case on both sides. Letters outside
//!   ASCII compare exactly, so `école` does not match `ÉCOLE`; SQLite's
//!   built-in `lower()` has the same limit and the two forms stay in step
//! - `Presence` tests for a missing value (e.g. no assignee)
//! - `OnOrAfter` is an inclusive lower bound on a Unix-seconds property
//! - `InPath` tests membership in the entity's materialized folder path
//! - `Metric` matches if *any* metric with the name satisfies the comparison
//! - `FieldValue` matches if *any* custom field value is equal
//! - `All` is an ordered conjunction; an empty conjunction matches everything
//!
//! A property the entity kind does not carry behaves like a missing value, and
//! a value whose type does not fit the property never matches.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};

use crate::filter::sql::{self, SqlClause};
use crate::models::{EntityKind, FieldValue, Metric};
use crate::search::metric::MetricCondition;

/// Scalar properties a filter can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Id,
    TenantId,
    TeamId,
    ProjectId,
    TestSuiteId,
    TestRunId,
    TestCaseId,
    ExternalDisplayId,
    ExternalSystemName,
    Name,
    State,
    Result,
    ExecutionType,
    IssueType,
    AssignedTo,
    Completed,
    Created,
}

/// Storage type of a property or filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Text,
    Bool,
}

impl Property {
    pub const ALL: [Property; 17] = [
        Property::Id,
        Property::TenantId,
        Property::TeamId,
        Property::ProjectId,
        Property::TestSuiteId,
        Property::TestRunId,
        Property::TestCaseId,
        Property::ExternalDisplayId,
        Property::ExternalSystemName,
        Property::Name,
        Property::State,
        Property::Result,
        Property::ExecutionType,
        Property::IssueType,
        Property::AssignedTo,
        Property::Completed,
        Property::Created,
    ];

    pub fn value_kind(&self) -> ValueKind {
        match self {
            Property::Id
            | Property::TeamId
            | Property::ProjectId
            | Property::TestSuiteId
            | Property::TestRunId
            | Property::TestCaseId
            | Property::Created => ValueKind::Int,
            Property::Completed => ValueKind::Bool,
            Property::TenantId
            | Property::ExternalDisplayId
            | Property::ExternalSystemName
            | Property::Name
            | Property::State
            | Property::Result
            | Property::ExecutionType
            | Property::IssueType
            | Property::AssignedTo => ValueKind::Text,
        }
    }
}

/// A property value borrowed from an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Int(i64),
    Text(&'a str),
    Bool(bool),
}

/// A filter operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Text(_) => ValueKind::Text,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    fn equals(&self, scalar: Scalar<'_>) -> bool {
        match (self, scalar) {
            (Value::Int(a), Scalar::Int(b)) => *a == b,
            (Value::Text(a), Scalar::Text(b)) => a == b,
            (Value::Bool(a), Scalar::Bool(b)) => *a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Entity side of the filter model.
///
/// `property` must return `Some` only for properties that `column` maps; the
/// SQL form treats unmapped properties as `NULL` and relies on that.
pub trait Searchable {
    const KIND: EntityKind;
    const TABLE: &'static str;
    /// Columns searched by free text, in the same order as [`Searchable::text_values`]
    const TEXT_COLUMNS: &'static [&'static str];
    /// Column holding the encoded folder path, if the entity lives in folders
    const PATH_COLUMN: Option<&'static str> = None;

    fn column(property: Property) -> Option<&'static str>;

    fn id(&self) -> i64;

    fn property(&self, property: Property) -> Option<Scalar<'_>>;

    fn text_values(&self) -> Vec<Option<&str>>;

    fn path_ids(&self) -> &[i64] {
        &[]
    }

    fn metrics(&self) -> &[Metric] {
        &[]
    }

    fn fields(&self) -> &[FieldValue];
}

/// Closed set of predicate nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals { property: Property, value: Value },
    Contains { property: Property, needle: String },
    Presence { property: Property, present: bool },
    OnOrAfter { property: Property, bound: DateTime<Utc> },
    InPath { folder_id: i64 },
    Metric(MetricCondition),
    FieldValue { field_definition_id: i64, value: String },
    Text(String),
    All(Vec<Predicate>),
}

/// ASCII case-insensitive substring test; `lower()` in SQLite folds the same range
pub(crate) fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

impl Predicate {
    /// Evaluate against one entity
    pub fn evaluate<T: Searchable>(&self, entity: &T) -> bool {
        match self {
            Predicate::Equals { property, value } => {
                value.kind() == property.value_kind()
                    && entity
                        .property(*property)
                        .map(|scalar| value.equals(scalar))
                        .unwrap_or(false)
            }
            Predicate::Contains { property, needle } => match entity.property(*property) {
                Some(Scalar::Text(text)) => contains_ignore_ascii_case(text, needle),
                _ => false,
            },
            Predicate::Presence { property, present } => {
                entity.property(*property).is_some() == *present
            }
            Predicate::OnOrAfter { property, bound } => match entity.property(*property) {
                Some(Scalar::Int(ts)) => ts >= bound.timestamp(),
                _ => false,
            },
            Predicate::InPath { folder_id } => entity.path_ids().contains(folder_id),
            Predicate::Metric(condition) => entity
                .metrics()
                .iter()
                .any(|metric| condition.matches(metric)),
            Predicate::FieldValue {
                field_definition_id,
                value,
            } => entity.fields().iter().any(|field| {
                field.field_definition_id == *field_definition_id && field.string_value == *value
            }),
            Predicate::Text(needle) => entity
                .text_values()
                .into_iter()
                .flatten()
                .any(|text| contains_ignore_ascii_case(text, needle)),
            Predicate::All(predicates) => predicates.iter().all(|p| p.evaluate(entity)),
        }
    }
}

/// Typed predicate over entity type `T`
pub struct FilterSpecification<T> {
    predicate: Predicate,
    entity: PhantomData<fn(&T) -> bool>,
}

impl<T> FilterSpecification<T> {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            entity: PhantomData,
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn into_predicate(self) -> Predicate {
        self.predicate
    }

    pub fn equals(property: Property, value: impl Into<Value>) -> Self {
        Self::new(Predicate::Equals {
            property,
            value: value.into(),
        })
    }

    pub fn contains(property: Property, needle: &str) -> Self {
        Self::new(Predicate::Contains {
            property,
            needle: needle.to_string(),
        })
    }

    pub fn presence(property: Property, present: bool) -> Self {
        Self::new(Predicate::Presence { property, present })
    }

    pub fn on_or_after(property: Property, bound: DateTime<Utc>) -> Self {
        Self::new(Predicate::OnOrAfter { property, bound })
    }

    pub fn in_path(folder_id: i64) -> Self {
        Self::new(Predicate::InPath { folder_id })
    }

    pub fn metric(condition: MetricCondition) -> Self {
        Self::new(Predicate::Metric(condition))
    }

    pub fn field_value(field_definition_id: i64, value: &str) -> Self {
        Self::new(Predicate::FieldValue {
            field_definition_id,
            value: value.to_string(),
        })
    }

    pub fn text(needle: &str) -> Self {
        Self::new(Predicate::Text(needle.to_string()))
    }

    /// Ordered conjunction of `specs`
    pub fn all(specs: impl IntoIterator<Item = FilterSpecification<T>>) -> Self {
        Self::new(Predicate::All(
            specs.into_iter().map(FilterSpecification::into_predicate).collect(),
        ))
    }

    /// Tenant scope; built by the calling layer, never by the parser
    pub fn tenant(tenant_id: &str) -> Self {
        Self::equals(Property::TenantId, tenant_id)
    }

    /// Project scope; built by the calling layer, never by the parser
    pub fn project(project_id: i64) -> Self {
        Self::equals(Property::ProjectId, project_id)
    }
}

impl<T: Searchable> FilterSpecification<T> {
    pub fn is_match(&self, entity: &T) -> bool {
        self.predicate.evaluate(entity)
    }

    /// Push-down form; `t` is the table alias the clause expects
    pub fn to_sql(&self) -> SqlClause {
        sql::render::<T>(&self.predicate)
    }
}

impl<T> Clone for FilterSpecification<T> {
    fn clone(&self) -> Self {
        Self::new(self.predicate.clone())
    }
}

impl<T> PartialEq for FilterSpecification<T> {
    fn eq(&self, other: &Self) -> bool {
        self.predicate == other.predicate
    }
}

impl<T> fmt::Debug for FilterSpecification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterSpecification")
            .field(&self.predicate)
            .finish()
    }
}
