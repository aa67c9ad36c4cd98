//! # Riptide
//!
//! Retry and timeout primitives for flaky test automation.
//!
//! Riptide runs a unit of asynchronous work until it passes or a retry policy
//! gives up, and bounds any unit of work with a deadline. Around those two
//! executors it ships the pure helpers a test pipeline needs: log parsing and
//! per-test summaries, failure triage, run-config validation and
//! day-over-day result diffing.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::time::Duration;
//! use riptide::{with_timeout, Backoff, Outcome, RetryConfig, RetryExecutor};
//!
//! # tokio_test::block_on(async {
//! let config = RetryConfig::new(3)
//!     .with_backoff(Backoff::exponential(Duration::from_millis(1)))
//!     .transient_reasons(["Timeout", "Network"]);
//!
//! // wrap each attempt in its own deadline
//! let outcome = RetryExecutor::new(config)
//!     .run(|| async {
//!         match with_timeout(async { Ok::<_, ()>(()) }, Duration::from_secs(1)).await {
//!             Ok(_) => Outcome::pass(),
//!             Err(e) if e.is_timeout() => Outcome::fail("Timeout"),
//!             Err(_) => Outcome::fail("Crash"),
//!         }
//!     })
//!     .await
//!     .unwrap();
//!
//! assert!(outcome.is_pass());
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`retry`]: retry policy, backoff schedules, retry and timeout executors
//! - [`report`]: log parsing, failure triage, result diffing
//! - [`config`]: run-configuration validation
//! - [`validation`]: error-accumulating [`Validation`]
//! - [`testing`]: scripted work and assertion macros

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod outcome;
pub mod report;
pub mod retry;
pub mod semigroup;
pub mod testing;
pub mod validation;

// Re-exports
pub use outcome::{AttemptRecord, Outcome};
pub use retry::{
    retry, with_timeout, with_timeout_millis, Backoff, BackoffStrategy, Completed, ConfigError,
    JitterStrategy, RetryConfig, RetryError, RetryExecutor, RetryReport, TimeoutConfig,
    TimeoutError, TimeoutExecutor,
};
pub use semigroup::Semigroup;
pub use validation::Validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{RunConfig, validate as validate_config};
    pub use crate::outcome::{AttemptRecord, Outcome};
    pub use crate::retry::{
        retry, with_timeout, with_timeout_millis, Backoff, RetryConfig, RetryError,
        RetryExecutor, RetryReport, TimeoutConfig, TimeoutError, TimeoutExecutor,
    };
    pub use crate::semigroup::Semigroup;
    pub use crate::validation::Validation;
}
