//! The retry loop.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::RetryError;
use super::policy::RetryConfig;
use crate::outcome::{AttemptRecord, Outcome};

type AttemptHook = Arc<dyn Fn(&AttemptRecord) + Send + Sync>;

/// Full account of a retry run that reached a final outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReport {
    /// The outcome of the last attempt, exactly as the work returned it.
    pub outcome: Outcome,
    /// Every attempt, in order.
    pub attempts: Vec<AttemptRecord>,
    /// Total time spent, including backoff.
    pub total_duration: Duration,
}

impl RetryReport {
    /// Number of times the work was invoked.
    pub fn attempt_count(&self) -> u32 {
        self.attempts.len() as u32
    }

    /// Backoff delays applied between attempts, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.attempts.iter().skip(1).map(|a| a.delay).collect()
    }

    /// Extract the final outcome, discarding metadata.
    pub fn into_outcome(self) -> Outcome {
        self.outcome
    }
}

/// Runs a unit of work until it passes, attempts run out, or a failure is
/// judged non-transient.
///
/// Each attempt invokes the work factory afresh. Attempts are strictly
/// sequential: attempt `n + 1` starts only once attempt `n` has reported and
/// its backoff delay has fully elapsed. The returned outcome is always the one
/// produced by the last attempt.
///
/// An optional [`CancellationToken`] is checked before every attempt and
/// raced against every backoff sleep. Work already in flight is never
/// interrupted.
///
/// # Example
///
/// ```rust
/// use riptide::{Backoff, Outcome, RetryConfig, RetryExecutor};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let runs = AtomicU32::new(0);
/// let executor = RetryExecutor::new(
///     RetryConfig::new(3)
///         .transient_reasons(["Timeout", "Network"])
///         .with_backoff(Backoff::linear(Duration::from_millis(1))),
/// );
///
/// let outcome = executor
///     .run(|| async {
///         if runs.fetch_add(1, Ordering::SeqCst) < 2 {
///             Outcome::fail("Timeout")
///         } else {
///             Outcome::pass()
///         }
///     })
///     .await
///     .unwrap();
///
/// assert!(outcome.is_pass());
/// assert_eq!(runs.load(Ordering::SeqCst), 3);
/// # });
/// ```
#[derive(Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    cancel: Option<CancellationToken>,
    on_attempt: Option<AttemptHook>,
}

impl RetryExecutor {
    /// Create an executor for the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            cancel: None,
            on_attempt: None,
        }
    }

    /// Observe `token` at every checkpoint.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Call `hook` after every attempt, before any backoff.
    ///
    /// The hook is synchronous and should not block; use it for logging or
    /// metrics.
    pub fn on_attempt<H>(mut self, hook: H) -> Self
    where
        H: Fn(&AttemptRecord) + Send + Sync + 'static,
    {
        self.on_attempt = Some(Arc::new(hook));
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run pass/fail work, returning the final outcome.
    pub async fn run<F, Fut>(&self, mut work: F) -> Result<Outcome, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        self.try_run(move || {
            let attempt = work();
            async move { Ok::<_, Infallible>(attempt.await) }
        })
        .await
    }

    /// Run pass/fail work, returning the final outcome with every attempt.
    pub async fn run_with_report<F, Fut>(&self, mut work: F) -> Result<RetryReport, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        self.try_run_with_report(move || {
            let attempt = work();
            async move { Ok::<_, Infallible>(attempt.await) }
        })
        .await
    }

    /// Run work that may also raise its own error.
    ///
    /// An `Err` from the work ends the run immediately as
    /// [`RetryError::Work`]; only `Ok(Outcome::Fail(..))` is ever retried.
    pub async fn try_run<F, Fut, E>(&self, work: F) -> Result<Outcome, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Outcome, E>>,
    {
        self.try_run_with_report(work)
            .await
            .map(RetryReport::into_outcome)
    }

    /// Run fallible work, returning the final outcome with every attempt.
    pub async fn try_run_with_report<F, Fut, E>(
        &self,
        mut work: F,
    ) -> Result<RetryReport, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Outcome, E>>,
    {
        self.config.validate()?;

        let start = Instant::now();
        let max_attempts = self.config.max_attempts();
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut attempt = 1u32;
        let mut delay = Duration::ZERO;

        loop {
            if self.is_cancelled() {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempt, "retry cancelled before attempt");
                return Err(RetryError::Cancelled {
                    attempts: attempt - 1,
                });
            }

            let outcome = work().await.map_err(RetryError::Work)?;

            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                outcome = %outcome,
                "attempt finished"
            );

            let record = AttemptRecord {
                attempt,
                outcome,
                delay,
            };
            if let Some(hook) = &self.on_attempt {
                hook(&record);
            }
            attempts.push(record);

            let last = &attempts[attempts.len() - 1].outcome;
            let retryable = match last {
                Outcome::Pass => {
                    #[cfg(feature = "tracing")]
                    if attempt > 1 {
                        tracing::info!(attempts = attempt, "passed after retry");
                    }
                    false
                }
                Outcome::Fail(_) if attempt >= max_attempts => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempts = attempt, outcome = %last, "retry attempts exhausted");
                    false
                }
                Outcome::Fail(reason) => {
                    let transient = self.config.is_transient(reason);
                    #[cfg(feature = "tracing")]
                    if !transient {
                        tracing::warn!(attempt, reason = %reason, "non-transient failure");
                    }
                    transient
                }
            };

            if !retryable {
                let outcome = last.clone();
                return Ok(RetryReport {
                    outcome,
                    attempts,
                    total_duration: start.elapsed(),
                });
            }

            let prev_delay = (attempt > 1).then_some(delay);
            delay = self.config.backoff().delay_with_jitter(attempt, prev_delay);

            if !self.sleep(delay).await {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempt, "retry cancelled during backoff");
                return Err(RetryError::Cancelled { attempts: attempt });
            }

            attempt += 1;
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Sleep for `delay`, returning false if cancelled first.
    async fn sleep(&self, delay: Duration) -> bool {
        match &self.cancel {
            _ if delay.is_zero() => true,
            None => {
                tokio::time::sleep(delay).await;
                true
            }
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => false,
                    _ = tokio::time::sleep(delay) => true,
                }
            }
        }
    }
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .field("on_attempt", &self.on_attempt.is_some())
            .finish()
    }
}

/// Run `work` under `config` without cancellation.
///
/// Shorthand for `RetryExecutor::new(config).run(work)`.
pub async fn retry<F, Fut>(config: RetryConfig, work: F) -> Result<Outcome, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome>,
{
    RetryExecutor::new(config).run(work).await
}
