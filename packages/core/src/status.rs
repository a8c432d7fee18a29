// ABOUTME: Test status taxonomy for squad/module records
// ABOUTME: Closed set of backend status strings with a tolerant fallback for unknown values

use serde::{Deserialize, Serialize};
use std::fmt;

pub const STATUS_IN_PROGRESS: &str = "em andamento";
pub const STATUS_DONE: &str = "concluído";
pub const STATUS_BLOCKED: &str = "bloqueado";
pub const STATUS_DONE_WITH_BUGS: &str = "concluido com bugs";

/// Status of a squad/module record.
///
/// The backend stores the raw string, so the exact spelling matters
/// (`concluído` carries an accent, `concluido com bugs` does not).
/// Anything outside the taxonomy is kept verbatim in [`TestStatus::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TestStatus {
    #[default]
    InProgress,
    Done,
    Blocked,
    DoneWithBugs,
    Other(String),
}

/// Presentation hint for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Warning,
    Danger,
    Defect,
    Neutral,
}

impl TestStatus {
    /// The four statuses of the taxonomy, in display order.
    pub const KNOWN: [TestStatus; 4] = [
        TestStatus::InProgress,
        TestStatus::Done,
        TestStatus::Blocked,
        TestStatus::DoneWithBugs,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TestStatus::InProgress => STATUS_IN_PROGRESS,
            TestStatus::Done => STATUS_DONE,
            TestStatus::Blocked => STATUS_BLOCKED,
            TestStatus::DoneWithBugs => STATUS_DONE_WITH_BUGS,
            TestStatus::Other(raw) => raw,
        }
    }

    /// Parses a raw status. Surrounding whitespace is ignored; an empty value
    /// reads as in progress, which is what the backend stores by default.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | STATUS_IN_PROGRESS => TestStatus::InProgress,
            STATUS_DONE => TestStatus::Done,
            STATUS_BLOCKED => TestStatus::Blocked,
            STATUS_DONE_WITH_BUGS => TestStatus::DoneWithBugs,
            _ => TestStatus::Other(raw.to_string()),
        }
    }

    /// Counts toward completion.
    pub fn is_concluded(&self) -> bool {
        matches!(self, TestStatus::Done | TestStatus::DoneWithBugs)
    }

    pub fn is_defect(&self) -> bool {
        matches!(self, TestStatus::DoneWithBugs)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TestStatus::Other(_))
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            TestStatus::Done => StatusTone::Success,
            TestStatus::InProgress => StatusTone::Warning,
            TestStatus::Blocked => StatusTone::Danger,
            TestStatus::DoneWithBugs => StatusTone::Defect,
            TestStatus::Other(_) => StatusTone::Neutral,
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TestStatus {
    fn from(raw: String) -> Self {
        TestStatus::parse(&raw)
    }
}

impl From<&str> for TestStatus {
    fn from(raw: &str) -> Self {
        TestStatus::parse(raw)
    }
}

impl From<TestStatus> for String {
    fn from(status: TestStatus) -> Self {
        match status {
            TestStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}
