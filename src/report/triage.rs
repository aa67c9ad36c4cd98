//! Failure deduplication.
//!
//! Identical failures share a signature: suite, test, reason and stack trace.
//! Grouping them shows which distinct problems a run actually hit and how often.

use std::collections::HashMap;
use std::fmt;

/// A single failed test run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Failure {
    /// Suite name.
    pub suite: String,
    /// Test name.
    pub test: String,
    /// Failure category (Timeout, Assertion, ...).
    pub reason: String,
    /// Stack trace or other location fingerprint.
    pub stack: String,
}

impl Failure {
    /// Create a failure record.
    pub fn new(
        suite: impl Into<String>,
        test: impl Into<String>,
        reason: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
            reason: reason.into(),
            stack: stack.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}|{}", self.suite, self.test, self.reason, self.stack)
    }
}

/// Group failures with identical signatures.
///
/// Groups are ordered by descending size. Groups of equal size keep the order
/// in which their first member appeared.
///
/// # Examples
///
/// ```
/// use riptide::report::triage::group_by_signature;
/// use riptide::report::Failure;
///
/// let groups = group_by_signature(vec![
///     Failure::new("Search", "BasicSearch", "Timeout", "stackC"),
///     Failure::new("Checkout", "ApplyCoupon", "Timeout", "stackA"),
///     Failure::new("Checkout", "ApplyCoupon", "Timeout", "stackA"),
/// ]);
///
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].len(), 2);
/// assert_eq!(groups[1][0].test, "BasicSearch");
/// ```
pub fn group_by_signature<I>(failures: I) -> Vec<Vec<Failure>>
where
    I: IntoIterator<Item = Failure>,
{
    let mut index: HashMap<Failure, usize> = HashMap::new();
    let mut groups: Vec<Vec<Failure>> = Vec::new();

    for failure in failures {
        match index.get(&failure) {
            Some(&i) => groups[i].push(failure),
            None => {
                index.insert(failure.clone(), groups.len());
                groups.push(vec![failure]);
            }
        }
    }

    // stable sort keeps first-seen order among equal sizes
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Failure> {
        vec![
            Failure::new("Checkout", "ApplyCoupon", "Timeout", "stackA"),
            Failure::new("Checkout", "ApplyCoupon", "Timeout", "stackA"),
            Failure::new("Checkout", "ApplyCoupon", "Assertion", "stackB"),
            Failure::new("Search", "BasicSearch", "Timeout", "stackC"),
        ]
    }

    #[test]
    fn test_groups_identical_signatures() {
        let groups = group_by_signature(sample());

        assert_eq!(groups.len(), 3);
        assert_eq!(groups.iter().map(Vec::len).max(), Some(2));
        assert_eq!(groups[0][0].stack, "stackA");
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let groups = group_by_signature(sample());

        assert_eq!(groups[1][0].reason, "Assertion");
        assert_eq!(groups[2][0].suite, "Search");
    }

    #[test]
    fn test_stack_is_part_of_signature() {
        let groups = group_by_signature(vec![
            Failure::new("A", "B", "Timeout", "s1"),
            Failure::new("A", "B", "Timeout", "s2"),
        ]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_signature(Vec::new()).is_empty());
    }

    #[test]
    fn test_display_signature() {
        let f = Failure::new("Checkout", "ApplyCoupon", "Timeout", "stackA");
        assert_eq!(f.to_string(), "Checkout|ApplyCoupon|Timeout|stackA");
    }
}
