//! Day-over-day result comparison.
//!
//! Each of today's results is classified against yesterday's result for the
//! same `Suite|Test` key (compared case-insensitively):
//!
//! | today | yesterday        | classification  |
//! |-------|------------------|-----------------|
//! | FAIL  | missing or PASS  | new failure     |
//! | FAIL  | FAIL             | still failing   |
//! | PASS  | FAIL             | fixed           |
//!
//! Every other combination is left unclassified.

use std::collections::HashMap;

use super::{Status, TestKey};

/// One test's result in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestResult {
    /// Suite name.
    pub suite: String,
    /// Test name.
    pub test: String,
    /// Result status.
    pub status: Status,
}

impl TestResult {
    /// Create a result, parsing `status` case-insensitively.
    pub fn new(suite: impl Into<String>, test: impl Into<String>, status: &str) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
            status: Status::parse(status),
        }
    }

    /// The `Suite|Test` key.
    pub fn key(&self) -> TestKey {
        TestKey::new(&self.suite, &self.test)
    }

    fn lookup_key(&self) -> String {
        self.key().to_string().to_lowercase()
    }
}

/// Today's results split by how they changed since yesterday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffResult {
    /// Failing today, passing or absent yesterday.
    pub new_failures: Vec<TestResult>,
    /// Passing today, failing yesterday.
    pub fixed: Vec<TestResult>,
    /// Failing both days.
    pub still_failing: Vec<TestResult>,
}

impl DiffResult {
    /// Returns true if nothing regressed.
    pub fn is_clean(&self) -> bool {
        self.new_failures.is_empty()
    }
}

/// Compare `today` against `yesterday`.
///
/// Each output list preserves the order of `today`. If `yesterday` holds the
/// same key more than once, the last entry wins.
///
/// # Examples
///
/// ```
/// use riptide::report::diff::compute;
/// use riptide::report::TestResult;
///
/// let yesterday = [TestResult::new("Checkout", "ApplyCoupon", "FAIL")];
/// let today = [
///     TestResult::new("Checkout", "ApplyCoupon", "PASS"),
///     TestResult::new("Search", "AdvancedSearch", "FAIL"),
/// ];
///
/// let diff = compute(&yesterday, &today);
/// assert_eq!(diff.fixed.len(), 1);
/// assert_eq!(diff.new_failures[0].test, "AdvancedSearch");
/// ```
pub fn compute(yesterday: &[TestResult], today: &[TestResult]) -> DiffResult {
    let previous: HashMap<String, &Status> = yesterday
        .iter()
        .map(|r| (r.lookup_key(), &r.status))
        .collect();

    let mut diff = DiffResult::default();
    for result in today {
        let before = previous.get(&result.lookup_key()).copied();
        match (&result.status, before) {
            (Status::Fail, None | Some(Status::Pass)) => diff.new_failures.push(result.clone()),
            (Status::Fail, Some(Status::Fail)) => diff.still_failing.push(result.clone()),
            (Status::Pass, Some(Status::Fail)) => diff.fixed.push(result.clone()),
            _ => {}
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        new_failures = diff.new_failures.len(),
        fixed = diff.fixed.len(),
        still_failing = diff.still_failing.len(),
        "computed result diff"
    );

    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(results: &[TestResult]) -> Vec<String> {
        results.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_regression_scenario() {
        let yesterday = [
            TestResult::new("Checkout", "ApplyCoupon", "FAIL"),
            TestResult::new("Checkout", "AddToCart", "PASS"),
            TestResult::new("Search", "BasicSearch", "PASS"),
        ];
        let today = [
            TestResult::new("Checkout", "ApplyCoupon", "PASS"),
            TestResult::new("Checkout", "AddToCart", "FAIL"),
            TestResult::new("Search", "BasicSearch", "PASS"),
            TestResult::new("Search", "AdvancedSearch", "FAIL"),
        ];

        let diff = compute(&yesterday, &today);

        assert_eq!(
            keys(&diff.new_failures),
            vec!["Checkout|AddToCart", "Search|AdvancedSearch"]
        );
        assert_eq!(keys(&diff.fixed), vec!["Checkout|ApplyCoupon"]);
        assert!(diff.still_failing.is_empty());
        assert!(!diff.is_clean());
    }

    #[test]
    fn test_keys_compare_case_insensitively() {
        let yesterday = [TestResult::new("checkout", "applycoupon", "fail")];
        let today = [TestResult::new("Checkout", "ApplyCoupon", "FAIL")];

        let diff = compute(&yesterday, &today);
        assert_eq!(diff.still_failing.len(), 1);
        assert!(diff.new_failures.is_empty());
    }

    #[test]
    fn test_other_statuses_are_unclassified() {
        let yesterday = [
            TestResult::new("A", "skipped", "SKIP"),
            TestResult::new("A", "b", "FAIL"),
        ];
        let today = [
            TestResult::new("A", "skipped", "PASS"),
            TestResult::new("A", "b", "SKIP"),
            TestResult::new("A", "new", "PASS"),
        ];

        assert_eq!(compute(&yesterday, &today), DiffResult::default());
    }

    #[test]
    fn test_fail_after_other_status_is_unclassified() {
        let yesterday = [TestResult::new("A", "b", "SKIP")];
        let today = [TestResult::new("A", "b", "FAIL")];

        // only a missing or passing predecessor makes a new failure
        assert!(compute(&yesterday, &today).new_failures.is_empty());
    }

    #[test]
    fn test_duplicate_yesterday_keys_last_wins() {
        let yesterday = [
            TestResult::new("A", "b", "PASS"),
            TestResult::new("A", "b", "FAIL"),
        ];
        let today = [TestResult::new("A", "b", "PASS")];

        assert_eq!(compute(&yesterday, &today).fixed.len(), 1);
    }
}
