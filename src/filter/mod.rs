pub mod spec;
pub mod sql;
pub mod evaluator;

pub use spec::*;
pub use sql::{SqlClause, TABLE_ALIAS};
pub use evaluator::*;
