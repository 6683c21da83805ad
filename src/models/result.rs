use serde::{Deserialize, Serialize};

/// Outcome recorded on a test case run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestResult {
    NoRun,
    Passed,
    Failed,
    Blocked,
    Skipped,
    Hold,
    Error,
}

impl TestResult {
    pub const ALL: [TestResult; 7] = [
        TestResult::NoRun,
        TestResult::Passed,
        TestResult::Failed,
        TestResult::Blocked,
        TestResult::Skipped,
        TestResult::Hold,
        TestResult::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestResult::NoRun => "NoRun",
            TestResult::Passed => "Passed",
            TestResult::Failed => "Failed",
            TestResult::Blocked => "Blocked",
            TestResult::Skipped => "Skipped",
            TestResult::Hold => "Hold",
            TestResult::Error => "Error",
        }
    }

    /// Case-insensitive lookup by canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|result| result.as_str().eq_ignore_ascii_case(name))
    }
}

impl Default for TestResult {
    fn default() -> Self {
        TestResult::NoRun
    }
}

/// How a test case is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestExecutionType {
    Manual,
    Automated,
    Hybrid,
}

impl TestExecutionType {
    pub const ALL: [TestExecutionType; 3] = [
        TestExecutionType::Manual,
        TestExecutionType::Automated,
        TestExecutionType::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestExecutionType::Manual => "Manual",
            TestExecutionType::Automated => "Automated",
            TestExecutionType::Hybrid => "Hybrid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl Default for TestExecutionType {
    fn default() -> Self {
        TestExecutionType::Manual
    }
}

/// Issue classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    Issue,
    Incident,
}

impl IssueType {
    pub const ALL: [IssueType; 2] = [IssueType::Issue, IssueType::Incident];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Issue => "Issue",
            IssueType::Incident => "Incident",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl Default for IssueType {
    fn default() -> Self {
        IssueType::Issue
    }
}
