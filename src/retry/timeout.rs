//! Deadline-bounded execution.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{ConfigError, TimeoutError};

/// A validated, strictly positive timeout.
///
/// # Examples
///
/// ```rust
/// use riptide::{ConfigError, TimeoutConfig};
/// use std::time::Duration;
///
/// assert!(TimeoutConfig::new(Duration::from_millis(200)).is_ok());
/// assert_eq!(
///     TimeoutConfig::from_millis(-1),
///     Err(ConfigError::NonPositiveTimeout { millis: -1 })
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    duration: Duration,
}

impl TimeoutConfig {
    /// Accept any non-zero duration.
    pub fn new(duration: Duration) -> Result<Self, ConfigError> {
        if duration.is_zero() {
            return Err(ConfigError::NonPositiveTimeout { millis: 0 });
        }
        Ok(Self { duration })
    }

    /// Accept a positive number of milliseconds.
    pub fn from_millis(millis: i64) -> Result<Self, ConfigError> {
        match u64::try_from(millis) {
            Ok(ms) if ms > 0 => Ok(Self {
                duration: Duration::from_millis(ms),
            }),
            _ => Err(ConfigError::NonPositiveTimeout { millis }),
        }
    }

    /// Get the duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// Work that finished before its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed<T> {
    /// What the work produced.
    pub value: T,
    /// How long the work took.
    pub elapsed: Duration,
}

impl<T> Completed<T> {
    /// Extract the value.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Races a unit of work against a deadline.
///
/// The work and a timer are awaited together; whichever becomes ready first
/// decides the result. The work is polled first, so if both are ready at the
/// same instant the real result wins over the timeout.
///
/// When the deadline wins the work future is dropped and whatever it would
/// have produced is discarded. To let the work keep running past the
/// deadline, spawn it and pass the `JoinHandle` instead.
///
/// An optional [`CancellationToken`] ends the wait early with
/// [`TimeoutError::Cancelled`]. The work still wins a tie against it.
///
/// # Example
///
/// ```rust
/// use riptide::{TimeoutConfig, TimeoutExecutor};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let executor = TimeoutExecutor::new(TimeoutConfig::new(Duration::from_millis(200)).unwrap());
///
/// let fast = executor
///     .run(async {
///         tokio::time::sleep(Duration::from_millis(20)).await;
///         Ok::<_, String>("done")
///     })
///     .await;
///
/// assert_eq!(fast.unwrap().into_value(), "done");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct TimeoutExecutor {
    config: TimeoutConfig,
    cancel: Option<CancellationToken>,
}

impl TimeoutExecutor {
    /// Create an executor with a validated timeout.
    pub fn new(config: TimeoutConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Stop waiting as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.config.duration()
    }

    /// Await `work`, failing with [`TimeoutError::Timeout`] at the deadline.
    ///
    /// An error returned by the work before the deadline is passed through as
    /// [`TimeoutError::Inner`]. Cancellation ends the wait with
    /// [`TimeoutError::Cancelled`] and drops the work.
    pub async fn run<Fut, T, E>(&self, work: Fut) -> Result<Completed<T>, TimeoutError<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let duration = self.config.duration();
        let start = Instant::now();
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => futures::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            result = work => {
                let elapsed = start.elapsed();
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    ok = result.is_ok(),
                    "work finished before deadline"
                );
                result
                    .map(|value| Completed { value, elapsed })
                    .map_err(TimeoutError::Inner)
            }
            _ = cancelled => {
                let elapsed = start.elapsed();
                #[cfg(feature = "tracing")]
                tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "wait cancelled");
                Err(TimeoutError::Cancelled { elapsed })
            }
            _ = tokio::time::sleep(duration) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(timeout_ms = duration.as_millis() as u64, "work timed out");
                Err(TimeoutError::Timeout { duration })
            }
        }
    }
}

/// Await `work` for at most `duration`.
///
/// A zero duration fails with [`TimeoutError::Config`] without polling the
/// work.
///
/// ```rust
/// use riptide::with_timeout;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let slow = with_timeout(
///     async {
///         tokio::time::sleep(Duration::from_millis(200)).await;
///         Ok::<_, String>(())
///     },
///     Duration::from_millis(20),
/// )
/// .await;
///
/// assert!(slow.unwrap_err().is_timeout());
/// # });
/// ```
pub async fn with_timeout<Fut, T, E>(
    work: Fut,
    duration: Duration,
) -> Result<Completed<T>, TimeoutError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    let config = TimeoutConfig::new(duration)?;
    TimeoutExecutor::new(config).run(work).await
}

/// Await `work` for at most `millis` milliseconds.
///
/// Zero or negative values fail with [`TimeoutError::Config`] without polling
/// the work.
pub async fn with_timeout_millis<Fut, T, E>(
    work: Fut,
    millis: i64,
) -> Result<Completed<T>, TimeoutError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    let config = TimeoutConfig::from_millis(millis)?;
    TimeoutExecutor::new(config).run(work).await
}
