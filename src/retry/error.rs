//! Error types for retry and timeout operations.

use std::convert::Infallible;
use std::time::Duration;

/// Invalid arguments handed to a retry or timeout primitive.
///
/// Always reported before any work is started and never retried.
///
/// # Examples
///
/// ```rust
/// use riptide::{ConfigError, RetryConfig};
///
/// let config = RetryConfig::new(0);
/// assert_eq!(config.validate(), Err(ConfigError::ZeroAttempts));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_attempts` was zero.
    ZeroAttempts,
    /// The timeout was zero or negative.
    NonPositiveTimeout {
        /// The rejected timeout, in milliseconds.
        millis: i64,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroAttempts => write!(f, "max_attempts must be at least 1"),
            Self::NonPositiveTimeout { millis } => {
                write!(f, "timeout must be positive, got {}ms", millis)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned by a [`RetryExecutor`](super::RetryExecutor) run.
///
/// A failing [`Outcome`](crate::Outcome) is *not* an error: exhausted or
/// non-transient failures come back as `Ok(Outcome::Fail(..))`. This type only
/// covers runs that ended without a final outcome.
///
/// `E` is the error type of fallible work passed to
/// [`try_run`](super::RetryExecutor::try_run); it defaults to
/// [`Infallible`] for work that can only pass or fail.
///
/// # Examples
///
/// ```rust
/// use riptide::{Outcome, RetryConfig, RetryError, RetryExecutor};
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let token = CancellationToken::new();
/// token.cancel();
///
/// let executor = RetryExecutor::new(RetryConfig::new(3)).with_cancellation(token);
/// let result = executor.run(|| async { Outcome::pass() }).await;
///
/// assert_eq!(result, Err(RetryError::Cancelled { attempts: 0 }));
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E = Infallible> {
    /// The retry configuration was invalid; no attempt was made.
    Config(ConfigError),
    /// Cancellation was observed at a checkpoint.
    Cancelled {
        /// Attempts that completed before cancellation was observed.
        attempts: u32,
    },
    /// The work itself raised an error, which is never retried.
    Work(E),
}

impl<E> RetryError<E> {
    /// Returns true if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true if the configuration was rejected.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Extract the work error, if that is what ended the run.
    pub fn into_work_error(self) -> Option<E> {
        match self {
            Self::Work(e) => Some(e),
            Self::Config(_) | Self::Cancelled { .. } => None,
        }
    }
}

impl<E> From<ConfigError> for RetryError<E> {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid retry configuration: {}", e),
            Self::Cancelled { attempts } => {
                write!(f, "retry cancelled after {} attempts", attempts)
            }
            Self::Work(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Cancelled { .. } => None,
            Self::Work(e) => Some(e),
        }
    }
}

/// Error returned when timed work does not complete.
///
/// Wraps either a timeout, a rejected duration, or an error raised by the
/// work itself before the deadline.
///
/// # Examples
///
/// ```rust
/// use riptide::{with_timeout, TimeoutError};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let result = with_timeout(
///     async {
///         tokio::time::sleep(Duration::from_secs(10)).await;
///         Ok::<_, String>(42)
///     },
///     Duration::from_millis(10),
/// )
/// .await;
///
/// match result {
///     Err(TimeoutError::Timeout { duration }) => {
///         assert_eq!(duration, Duration::from_millis(10));
///     }
///     _ => panic!("Expected timeout"),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError<E> {
    /// The timeout duration was not positive; the work was never started.
    Config(ConfigError),
    /// The deadline elapsed first.
    Timeout {
        /// The timeout duration that was exceeded.
        duration: Duration,
    },
    /// The work failed before the deadline.
    Inner(E),
    /// The cancellation token fired before the work or the deadline.
    Cancelled {
        /// Time spent waiting before cancellation.
        elapsed: Duration,
    },
}

impl<E> TimeoutError<E> {
    /// Create a timeout error.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Create an inner error.
    pub fn inner(error: E) -> Self {
        Self::Inner(error)
    }

    /// Returns true if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if this is an inner error.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    /// Returns true if the duration was rejected.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if the wait was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Get the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Timeout { .. } | Self::Config(_) | Self::Cancelled { .. } => None,
        }
    }
}

impl<E> From<ConfigError> for TimeoutError<E> {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid timeout: {}", e),
            Self::Timeout { duration } => write!(f, "operation timed out after {:?}", duration),
            Self::Inner(e) => write!(f, "{}", e),
            Self::Cancelled { elapsed } => write!(f, "operation cancelled after {:?}", elapsed),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Timeout { .. } | Self::Cancelled { .. } => None,
            Self::Inner(e) => Some(e),
        }
    }
}
