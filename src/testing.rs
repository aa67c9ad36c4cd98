//! Testing utilities for code built on riptide.
//!
//! This module provides a scripted work source for driving the retry
//! executor through a fixed sequence of outcomes, plus assertion macros for
//! outcomes and validations.
//!
//! # Examples
//!
//! ## ScriptedWork
//!
//! ```rust
//! use riptide::testing::ScriptedWork;
//! use riptide::{Outcome, RetryConfig, RetryExecutor};
//!
//! # tokio_test::block_on(async {
//! let work = ScriptedWork::new([Outcome::fail("Network"), Outcome::pass()]);
//!
//! let outcome = RetryExecutor::new(RetryConfig::new(3))
//!     .run(|| work.attempt())
//!     .await
//!     .unwrap();
//!
//! assert!(outcome.is_pass());
//! assert_eq!(work.invocations(), 2);
//! # });
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use riptide::{assert_fail, assert_pass, Outcome};
//!
//! assert_pass!(Outcome::pass());
//! assert_fail!(Outcome::fail("Timeout"), "Timeout");
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{self, Ready};

use crate::Outcome;

/// Reason reported once a [`ScriptedWork`] has run out of outcomes.
pub const SCRIPT_EXHAUSTED: &str = "script exhausted";

/// A unit of work that replays a fixed sequence of outcomes.
///
/// Each call to [`attempt`](ScriptedWork::attempt) yields the next scripted
/// outcome and counts the invocation. Once the script is used up every
/// further attempt fails with [`SCRIPT_EXHAUSTED`].
#[derive(Debug)]
pub struct ScriptedWork {
    script: Mutex<VecDeque<Outcome>>,
    invocations: AtomicU32,
}

impl ScriptedWork {
    /// Create a work source replaying `outcomes` in order.
    pub fn new<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            invocations: AtomicU32::new(0),
        }
    }

    /// Run one attempt.
    pub fn attempt(&self) -> Ready<Outcome> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let next = self.script().pop_front();
        future::ready(next.unwrap_or_else(|| Outcome::fail(SCRIPT_EXHAUSTED)))
    }

    /// How many attempts have been made.
    pub fn invocations(&self) -> u32 {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Outcomes not yet replayed.
    pub fn remaining(&self) -> usize {
        self.script().len()
    }

    // Recovers the script after a panicking holder poisoned the lock.
    fn script(&self) -> MutexGuard<'_, VecDeque<Outcome>> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Assert that an outcome passed.
///
/// # Example
///
/// ```rust
/// use riptide::{assert_pass, Outcome};
///
/// assert_pass!(Outcome::pass());
/// ```
#[macro_export]
macro_rules! assert_pass {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Pass => {}
            $crate::Outcome::Fail(reason) => {
                panic!("Expected Pass, got Fail: {:?}", reason);
            }
        }
    };
}

/// Assert that an outcome failed, optionally with a specific reason.
///
/// # Example
///
/// ```rust
/// use riptide::{assert_fail, Outcome};
///
/// assert_fail!(Outcome::fail("Timeout"));
/// assert_fail!(Outcome::fail("Timeout"), "Timeout");
/// ```
#[macro_export]
macro_rules! assert_fail {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Fail(_) => {}
            $crate::Outcome::Pass => {
                panic!("Expected Fail, got Pass");
            }
        }
    };
    ($outcome:expr, $reason:expr) => {
        match $outcome {
            $crate::Outcome::Fail(reason) => {
                assert_eq!(reason, $reason);
            }
            $crate::Outcome::Pass => {
                panic!("Expected Fail({:?}), got Pass", $reason);
            }
        }
    };
}

/// Assert that a validation succeeds.
///
/// This macro will panic if the validation is a `Failure`.
///
/// # Example
///
/// ```rust
/// use riptide::{Validation, assert_success};
///
/// let val = Validation::<_, Vec<String>>::success(42);
/// assert_success!(val);
/// ```
#[macro_export]
macro_rules! assert_success {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Success(_) => {}
            $crate::Validation::Failure(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
}

/// Assert that a validation fails.
///
/// This macro will panic if the validation is a `Success`.
///
/// # Example
///
/// ```rust
/// use riptide::{Validation, assert_failure};
///
/// let val = Validation::<i32, _>::failure(vec!["error".to_string()]);
/// assert_failure!(val);
/// ```
#[macro_export]
macro_rules! assert_failure {
    ($validation:expr) => {
        match $validation {
            $crate::Validation::Failure(_) => {}
            $crate::Validation::Success(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

/// Assert that a validation fails with specific errors.
///
/// This macro will panic if the validation is a `Success` or if the errors
/// don't match the expected errors.
///
/// # Example
///
/// ```rust
/// use riptide::{Validation, assert_validation_errors};
///
/// let val = Validation::<i32, _>::failure(vec!["error1", "error2"]);
/// assert_validation_errors!(val, vec!["error1", "error2"]);
/// ```
#[macro_export]
macro_rules! assert_validation_errors {
    ($validation:expr, $expected:expr) => {
        match $validation {
            $crate::Validation::Failure(errors) => {
                assert_eq!(errors, $expected);
            }
            $crate::Validation::Success(v) => {
                panic!(
                    "Expected Failure with errors {:?}, got Success: {:?}",
                    $expected, v
                );
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for Outcome {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(Outcome::Pass),
            prop::sample::select(vec!["Timeout", "Network", "Assertion", "Crash"])
                .prop_map(Outcome::fail),
        ]
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Validation;

    #[tokio::test]
    async fn scripted_work_replays_in_order() {
        let work = ScriptedWork::new([Outcome::fail("Timeout"), Outcome::pass()]);

        assert_eq!(work.attempt().await, Outcome::fail("Timeout"));
        assert_eq!(work.remaining(), 1);
        assert_eq!(work.attempt().await, Outcome::Pass);
        assert_eq!(work.attempt().await, Outcome::fail(SCRIPT_EXHAUSTED));
        assert_eq!(work.invocations(), 3);
    }

    #[tokio::test]
    async fn scripted_work_survives_poisoned_lock() {
        let work = std::sync::Arc::new(ScriptedWork::new([
            Outcome::fail("Network"),
            Outcome::pass(),
        ]));

        let poisoner = std::sync::Arc::clone(&work);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.script.lock().unwrap();
            panic!("poison the script lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(work.script.is_poisoned());

        assert_eq!(work.remaining(), 2);
        assert_eq!(work.attempt().await, Outcome::fail("Network"));
        assert_eq!(work.attempt().await, Outcome::Pass);
    }

    #[test]
    fn assert_pass_macro() {
        assert_pass!(Outcome::pass());
    }

    #[test]
    fn assert_fail_macro_with_reason() {
        assert_fail!(Outcome::fail("Network"), "Network");
    }

    #[test]
    #[should_panic(expected = "Expected Pass, got Fail")]
    fn assert_pass_panics_on_fail() {
        assert_pass!(Outcome::fail("Timeout"));
    }

    #[test]
    #[should_panic(expected = "Expected Fail, got Pass")]
    fn assert_fail_panics_on_pass() {
        assert_fail!(Outcome::pass());
    }

    #[test]
    fn assert_success_macro() {
        let val = Validation::<_, Vec<String>>::success(42);
        assert_success!(val);
    }

    #[test]
    fn assert_failure_macro() {
        let val = Validation::<i32, _>::failure(vec!["error".to_string()]);
        assert_failure!(val);
    }

    #[test]
    fn assert_validation_errors_macro() {
        let val = Validation::<i32, _>::failure(vec!["error1", "error2"]);
        assert_validation_errors!(val, vec!["error1", "error2"]);
    }

    #[test]
    #[should_panic(expected = "Expected Failure with errors")]
    fn assert_validation_errors_panics_on_success() {
        let val = Validation::<_, Vec<String>>::success(42);
        assert_validation_errors!(val, vec!["error".to_string()]);
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use super::*;

        proptest! {
            #[test]
            fn outcome_arbitrary_generates_known_reasons(outcome in any::<Outcome>()) {
                match outcome.reason() {
                    None => prop_assert!(outcome.is_pass()),
                    Some(reason) => prop_assert!(!reason.is_empty()),
                }
            }
        }
    }
}
