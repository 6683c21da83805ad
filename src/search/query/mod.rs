//! Per-kind query value objects
//!
//! A query is built once from a search string, handed to a repository and
//! dropped. The parser fills it through [`SearchQuery`]; afterwards it is only
//! read.

pub mod test_case;
pub mod test_case_run;
pub mod issue;
pub mod test_run;

pub use test_case::TestCaseQuery;
pub use test_case_run::TestCaseRunQuery;
pub use issue::IssueQuery;
pub use test_run::TestRunQuery;

use crate::filter::{FilterSpecification, Searchable};
use crate::search::fields::FieldFilter;
use crate::search::keywords::{Keyword, KeywordError};
use crate::utils::TimeSource;

/// Page size used until the caller sets one
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Builder side of a query value object
pub trait SearchQuery: Default {
    type Entity: Searchable;

    /// Keyword table for this kind
    const KEYWORDS: &'static [Keyword];

    /// Apply one recognized keyword. Must not modify the query on error.
    fn apply(&mut self, keyword: Keyword, value: &str, clock: &dyn TimeSource) -> Result<(), KeywordError>;

    fn push_field(&mut self, filter: FieldFilter);

    fn set_text(&mut self, text: Option<String>);

    fn text(&self) -> Option<&str>;

    fn fields(&self) -> &[FieldFilter];

    fn page(&self) -> (usize, usize);

    fn set_page(&mut self, offset: usize, count: usize);

    /// Structured filters in attribute order, then field filters; free text excluded
    fn specifications(&self) -> Vec<FilterSpecification<Self::Entity>>;

    /// True when nothing was parsed: no text, no attributes, no fields
    fn is_empty(&self) -> bool {
        self.text().is_none() && self.specifications().is_empty()
    }
}

pub(crate) fn field_specifications<T>(fields: &[FieldFilter]) -> impl Iterator<Item = FilterSpecification<T>> + '_ {
    fields
        .iter()
        .map(|f| FilterSpecification::field_value(f.field_definition_id, &f.string_value))
}
