use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of entity that accept search queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    TestCase,
    TestCaseRun,
    Issue,
    TestRun,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::TestCase,
        EntityKind::TestCaseRun,
        EntityKind::Issue,
        EntityKind::TestRun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::TestCase => "test-case",
            EntityKind::TestCaseRun => "test-case-run",
            EntityKind::Issue => "issue",
            EntityKind::TestRun => "test-run",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "test-case" => Some(EntityKind::TestCase),
            "test-case-run" => Some(EntityKind::TestCaseRun),
            "issue" => Some(EntityKind::Issue),
            "test-run" => Some(EntityKind::TestRun),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
