//! Search query language
//!
//! Turns a raw search string such as
//!
//! ```text
//! state:Ongoing result:failed since:2w milestone:1.0 "login page"
//! ```
//!
//! into a per-entity-kind query value object. Structured `keyword:value`
//! tokens set query attributes; everything else becomes free text.

pub mod tokenizer;
pub mod keywords;
pub mod fields;
pub mod metric;
pub mod query;
pub mod parser;

pub use tokenizer::{tokenize, RawToken};
pub use keywords::{Keyword, KeywordError};
pub use fields::{resolve_field, FieldFilter};
pub use metric::{parse_metric_expression, ComparisonOp, MetricComparison, MetricCondition, MetricParseError};
pub use query::*;
pub use parser::*;
