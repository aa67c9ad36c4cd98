//! Test-run reporting utilities.
//!
//! Pure transformations over test-run records:
//!
//! - [`log`]: parse runner log lines into [`LogEntry`] records and summarize
//!   them per test
//! - [`triage`]: group identical failures by signature
//! - [`diff`]: compare two result sets to find regressions and fixes

pub mod diff;
pub mod log;
pub mod triage;

use std::fmt;

pub use diff::{DiffResult, TestResult};
pub use log::{FormatError, FormatErrorKind, LogEntry, TestSummary};
pub use triage::Failure;

/// Status reported for one test run.
///
/// Parsing is case-insensitive; anything other than PASS or FAIL is kept
/// verbatim as [`Status::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The test passed.
    Pass,
    /// The test failed.
    Fail,
    /// Any other status (SKIP, BLOCKED, ...).
    Other(String),
}

impl Status {
    /// Parse a status token.
    ///
    /// ```
    /// use riptide::report::Status;
    ///
    /// assert_eq!(Status::parse("pass"), Status::Pass);
    /// assert_eq!(Status::parse("SKIP"), Status::Other("SKIP".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("PASS") {
            Status::Pass
        } else if s.eq_ignore_ascii_case("FAIL") {
            Status::Fail
        } else {
            Status::Other(s.to_string())
        }
    }

    /// Returns true for [`Status::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Status::Pass)
    }

    /// Returns true for [`Status::Fail`].
    pub fn is_fail(&self) -> bool {
        matches!(self, Status::Fail)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => f.write_str("PASS"),
            Status::Fail => f.write_str("FAIL"),
            Status::Other(s) => f.write_str(s),
        }
    }
}

/// Identifies a test across runs: suite plus test name.
///
/// Displays as `Suite|Test`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestKey {
    /// Suite name.
    pub suite: String,
    /// Test name.
    pub test: String,
}

impl TestKey {
    /// Create a key.
    pub fn new(suite: impl Into<String>, test: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
        }
    }
}

impl fmt::Display for TestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.suite, self.test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(Status::parse("PASS"), Status::Pass);
        assert_eq!(Status::parse("Fail"), Status::Fail);
        assert!(Status::parse("fail").is_fail());
        assert!(!Status::parse("skip").is_pass());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(TestKey::new("Checkout", "AddToCart").to_string(), "Checkout|AddToCart");
    }
}
