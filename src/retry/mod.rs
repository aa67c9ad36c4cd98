//! Retry-with-backoff and deadline primitives.
//!
//! Two independent building blocks:
//!
//! - [`RetryExecutor`] re-runs pass/fail work until it passes, attempts run
//!   out, or a failure is judged non-transient, sleeping per a [`Backoff`]
//!   schedule between attempts.
//! - [`TimeoutExecutor`] races a unit of work against a deadline and an
//!   optional cancellation token.
//!
//! Configuration is plain data ([`RetryConfig`], [`TimeoutConfig`]) so it is
//! easy to build, clone and inspect. Composition is left to the caller: wrap
//! each attempt in a timeout and map the timeout into a failed outcome.
//!
//! # Quick Start
//!
//! ```rust
//! use riptide::{with_timeout, Backoff, Outcome, RetryConfig, RetryExecutor};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let executor = RetryExecutor::new(
//!     RetryConfig::new(3)
//!         .transient_reasons(["Timeout"])
//!         .with_backoff(Backoff::exponential(Duration::from_millis(1))),
//! );
//!
//! let outcome = executor
//!     .run(|| async {
//!         match with_timeout(async { Ok::<_, String>(()) }, Duration::from_secs(1)).await {
//!             Ok(_) => Outcome::pass(),
//!             Err(e) if e.is_timeout() => Outcome::fail("Timeout"),
//!             Err(e) => Outcome::fail(e.to_string()),
//!         }
//!     })
//!     .await
//!     .unwrap();
//!
//! assert!(outcome.is_pass());
//! # });
//! ```
//!
//! # Backoff Strategies
//!
//! - **Constant**: Fixed delay between attempts
//! - **Linear**: Delay increases linearly (10ms, 20ms, 30ms, ...)
//! - **Exponential**: Delay doubles each retry (100ms, 200ms, 400ms, ...)
//! - **Fibonacci**: Delay follows Fibonacci sequence
//! - **Custom / Millis**: Any function of the attempt number
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature to randomize delays:
//!
//! ```toml
//! riptide = { version = "...", features = ["jitter"] }
//! ```
//!
//! # Error Types
//!
//! - [`ConfigError`]: Invalid attempt bound or timeout
//! - [`RetryError`]: Run cancelled, misconfigured, or the work raised an error
//! - [`TimeoutError`]: Deadline elapsed, misconfigured, or the work raised an error

mod error;
mod executor;
mod policy;
mod timeout;

pub use error::{ConfigError, RetryError, TimeoutError};
pub use executor::{retry, RetryExecutor, RetryReport};
pub use policy::{Backoff, BackoffStrategy, JitterStrategy, RetryConfig};
pub use timeout::{with_timeout, with_timeout_millis, Completed, TimeoutConfig, TimeoutExecutor};
