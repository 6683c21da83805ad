// Core data models for testlens
// These structs represent the searchable domain entities

pub mod kind;
pub mod field;
pub mod metric;
pub mod result;
pub mod test_case;
pub mod test_case_run;
pub mod issue;
pub mod test_run;

pub use kind::*;
pub use field::*;
pub use metric::*;
pub use result::*;
pub use test_case::*;
pub use test_case_run::*;
pub use issue::*;
pub use test_run::*;

/// Tenant assigned to entities that do not name one
pub const DEFAULT_TENANT: &str = "default";

pub(crate) fn default_tenant() -> String {
    DEFAULT_TENANT.to_string()
}
