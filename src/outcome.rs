//! Pass/fail outcomes of a single unit of work.
//!
//! An [`Outcome`] is what one invocation of a retried unit of work reports.
//! It is a plain value: the retry executor inspects it, records it and hands
//! the most recent one back to the caller, but never builds or alters one
//! itself.
//!
//! # Examples
//!
//! ```
//! use riptide::Outcome;
//!
//! let pass = Outcome::pass();
//! let fail = Outcome::fail("Timeout");
//!
//! assert!(pass.is_pass());
//! assert_eq!(fail.reason(), Some("Timeout"));
//! ```

use std::fmt;
use std::time::Duration;

/// Result of one attempt at a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// The attempt passed.
    Pass,
    /// The attempt failed for the given reason.
    Fail(String),
}

impl Outcome {
    /// Create a passing outcome.
    #[inline]
    pub fn pass() -> Self {
        Outcome::Pass
    }

    /// Create a failing outcome with a reason.
    ///
    /// ```
    /// use riptide::Outcome;
    ///
    /// assert_eq!(Outcome::fail("Network"), Outcome::Fail("Network".to_string()));
    /// ```
    #[inline]
    pub fn fail(reason: impl Into<String>) -> Self {
        Outcome::Fail(reason.into())
    }

    /// Returns true for [`Outcome::Pass`].
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    /// Returns true for [`Outcome::Fail`].
    #[inline]
    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }

    /// The failure reason, if this outcome is a failure.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Pass => None,
            Outcome::Fail(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail(reason) => write!(f, "FAIL({})", reason),
        }
    }
}

/// One attempt made by a [`RetryExecutor`](crate::retry::RetryExecutor).
///
/// Handed to the executor's `on_attempt` hook as soon as the attempt's outcome
/// is known, and collected into a [`RetryReport`](crate::retry::RetryReport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// What the work reported.
    pub outcome: Outcome,
    /// Backoff slept before this attempt (zero for the first).
    pub delay: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_has_no_reason() {
        assert!(Outcome::pass().is_pass());
        assert!(!Outcome::pass().is_fail());
        assert_eq!(Outcome::pass().reason(), None);
    }

    #[test]
    fn test_fail_keeps_reason() {
        let outcome = Outcome::fail("Assertion");
        assert!(outcome.is_fail());
        assert_eq!(outcome.reason(), Some("Assertion"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Outcome::Pass.to_string(), "PASS");
        assert_eq!(Outcome::fail("Timeout").to_string(), "FAIL(Timeout)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let outcome = Outcome::fail("Network");
        let json = serde_json::to_string(&outcome).unwrap();
        let back: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
