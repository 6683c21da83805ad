//! Testlens - search query language and filter specifications for test management data
//!
//! This library provides:
//! - A tokenizer and keyword parser turning search strings into per-kind query objects
//! - Dynamic resolution of project-configured fields and relative time literals
//! - Metric threshold expressions (`metric:duration>=2.5`)
//! - Typed filter specifications evaluated in memory or rendered as SQLite `WHERE` clauses
//! - A SQLite-backed repository layer and the `testlens` command line
//!
//! # Example
//!
//! ```
//! use testlens::models::{EntityKind, FieldDefinition, TestCase};
//! use testlens::search::{SearchParser, SearchQuery, TestCaseQuery};
//! use testlens::filter::{matches_all, QueryAssembler};
//!
//! let catalog = vec![FieldDefinition::new(123, "Milestone", EntityKind::TestCase)];
//! let query: TestCaseQuery = SearchParser::new(&catalog).parse("is:manual milestone:1.0 login");
//! assert_eq!(query.text(), Some("login"));
//!
//! let specs = QueryAssembler::new().tenant("default").build(&query);
//! let case = TestCase::new(1, "Login page");
//! assert!(!matches_all(&specs, &case)); // no milestone field set
//! ```

pub mod config;
pub mod db;
pub mod models;
pub mod repo;
pub mod cli;
pub mod utils;
pub mod filter;
pub mod search;
