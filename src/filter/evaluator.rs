//! Query assembly and in-memory evaluation
//!
//! # Assembly order
//!
//! 1. Mandatory filters from the calling layer (tenant, project scope), in the
//!    order they were added
//! 2. Structured filters from the parsed query
//! 3. One free-text filter, if the query has leftover text
//!
//! The list is an implicit conjunction.

use crate::filter::spec::{FilterSpecification, Searchable};
use crate::search::query::SearchQuery;

/// Collects the caller's mandatory filters and combines them with a parsed query
pub struct QueryAssembler<T> {
    mandatory: Vec<FilterSpecification<T>>,
}

impl<T> Default for QueryAssembler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryAssembler<T> {
    pub fn new() -> Self {
        Self {
            mandatory: Vec::new(),
        }
    }

    pub fn tenant(self, tenant_id: &str) -> Self {
        self.with(FilterSpecification::tenant(tenant_id))
    }

    pub fn project(self, project_id: i64) -> Self {
        self.with(FilterSpecification::project(project_id))
    }

    pub fn with(mut self, spec: FilterSpecification<T>) -> Self {
        self.mandatory.push(spec);
        self
    }

    pub fn build<Q>(&self, query: &Q) -> Vec<FilterSpecification<T>>
    where
        Q: SearchQuery<Entity = T>,
    {
        assemble(self.mandatory.clone(), query)
    }
}

/// Mandatory filters, then the query's structured filters, then its free text
pub fn assemble<Q: SearchQuery>(
    mandatory: Vec<FilterSpecification<Q::Entity>>,
    query: &Q,
) -> Vec<FilterSpecification<Q::Entity>> {
    let mut specs = mandatory;
    specs.extend(query.specifications());
    if let Some(text) = query.text() {
        specs.push(FilterSpecification::text(text));
    }
    specs
}

/// True if every specification matches; an empty list matches everything
pub fn matches_all<T: Searchable>(specs: &[FilterSpecification<T>], entity: &T) -> bool {
    specs.iter().all(|spec| spec.is_match(entity))
}

/// Keep the entities matching every specification, in input order
pub fn filter_in_memory<T: Searchable>(
    entities: impl IntoIterator<Item = T>,
    specs: &[FilterSpecification<T>],
) -> Vec<T> {
    entities
        .into_iter()
        .filter(|entity| matches_all(specs, entity))
        .collect()
}
