pub mod search;
pub mod field;
pub mod metric;
pub mod test_case;
pub mod test_case_run;
pub mod issue;
pub mod test_run;

pub use search::*;
pub use field::*;
pub use metric::*;
