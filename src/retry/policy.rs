//! Backoff schedules and retry configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::ConfigError;

type DelayFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;
type MillisFn = Arc<dyn Fn(u32) -> i64 + Send + Sync>;
type TransientFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A backoff schedule: how long to wait after a failed attempt.
///
/// Schedules are pure data. [`delay_for_attempt`](Backoff::delay_for_attempt)
/// maps the number of the attempt that just failed (starting at 1) to the
/// delay applied before the next one.
///
/// # Examples
///
/// ```rust
/// use riptide::Backoff;
/// use std::time::Duration;
///
/// // Exponential backoff capped at 500ms
/// let backoff = Backoff::exponential(Duration::from_millis(100))
///     .with_max_delay(Duration::from_millis(500));
///
/// assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(100));
/// assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(400));
/// assert_eq!(backoff.delay_for_attempt(4), Duration::from_millis(500));
/// ```
#[derive(Clone)]
pub struct Backoff {
    strategy: BackoffStrategy,
    max_delay: Option<Duration>,
    jitter: JitterStrategy,
}

/// How the raw delay grows with the attempt number.
#[derive(Clone)]
pub enum BackoffStrategy {
    /// Fixed delay after every attempt.
    Constant(Duration),
    /// Delay increases linearly: base * n.
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay doubles: base * 2^(n-1).
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay follows Fibonacci sequence: base * fib(n).
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
    /// Caller-supplied schedule.
    Custom(DelayFn),
    /// Caller-supplied schedule in signed milliseconds; negatives become zero.
    Millis(MillisFn),
}

impl fmt::Debug for BackoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(d) => f.debug_tuple("Constant").field(d).finish(),
            Self::Linear { base } => f.debug_struct("Linear").field("base", base).finish(),
            Self::Exponential { base } => {
                f.debug_struct("Exponential").field("base", base).finish()
            }
            Self::Fibonacci { base } => f.debug_struct("Fibonacci").field("base", base).finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
            Self::Millis(_) => f.write_str("Millis(<fn>)"),
        }
    }
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
    /// Random delay between 0 and calculated delay (AWS recommended).
    Full,
    /// Decorrelated jitter (AWS style).
    Decorrelated,
}

impl Backoff {
    /// No delay between attempts.
    pub fn none() -> Self {
        Self::constant(Duration::ZERO)
    }

    /// Fixed delay after every failed attempt.
    pub fn constant(delay: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Constant(delay))
    }

    /// Linearly increasing delay: base * n.
    ///
    /// ```rust
    /// use riptide::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::linear(Duration::from_millis(10));
    /// assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(10));
    /// assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(20));
    /// ```
    pub fn linear(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Linear { base })
    }

    /// Doubling delay: base * 2^(n-1).
    pub fn exponential(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Exponential { base })
    }

    /// Fibonacci delay: base * fib(n), giving 1, 1, 2, 3, 5, ... times base.
    pub fn fibonacci(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Fibonacci { base })
    }

    /// Arbitrary schedule over the failed attempt number.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Self::with_strategy(BackoffStrategy::Custom(Arc::new(f)))
    }

    /// Arbitrary schedule in signed milliseconds.
    ///
    /// Negative results are clamped to zero rather than rejected.
    ///
    /// ```rust
    /// use riptide::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::from_millis(|n| 10 - 20 * i64::from(n));
    /// assert_eq!(backoff.delay_for_attempt(1), Duration::ZERO);
    /// ```
    pub fn from_millis<F>(f: F) -> Self
    where
        F: Fn(u32) -> i64 + Send + Sync + 'static,
    {
        Self::with_strategy(BackoffStrategy::Millis(Arc::new(f)))
    }

    fn with_strategy(strategy: BackoffStrategy) -> Self {
        Self {
            strategy,
            max_delay: None,
            jitter: JitterStrategy::None,
        }
    }

    /// Cap every delay, including jittered ones, at `d`.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add ±`factor` proportional jitter (clamped to 0.0..=1.0, non-finite
    /// values disable jitter).
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter = JitterStrategy::Proportional(jitter_factor(factor));
        self
    }

    /// Use full jitter: a random delay between 0 and the calculated delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Use decorrelated jitter: random between the base delay and 3x the previous delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_decorrelated_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Decorrelated;
        self
    }

    /// Get the strategy.
    pub fn strategy(&self) -> &BackoffStrategy {
        &self.strategy
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Delay to apply after failed attempt `attempt` (1-indexed), before jitter.
    ///
    /// Attempt `0` is treated as attempt `1`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let n = attempt.max(1);

        let base_delay = match &self.strategy {
            BackoffStrategy::Constant(d) => *d,
            BackoffStrategy::Linear { base } => base.saturating_mul(n),
            BackoffStrategy::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(n - 1))
            }
            BackoffStrategy::Fibonacci { base } => base.saturating_mul(fibonacci(n)),
            BackoffStrategy::Custom(f) => f(n),
            BackoffStrategy::Millis(f) => Duration::from_millis(u64::try_from(f(n)).unwrap_or(0)),
        };

        match self.max_delay {
            Some(max) => base_delay.min(max),
            None => base_delay,
        }
    }

    /// Delay with jitter applied.
    ///
    /// This is used internally by the retry executor.
    #[doc(hidden)]
    pub fn delay_with_jitter(&self, attempt: u32, prev_delay: Option<Duration>) -> Duration {
        let base_delay = self.delay_for_attempt(attempt);
        self.jitter.apply(base_delay, prev_delay, self.max_delay)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backoff")
            .field("strategy", &self.strategy)
            .field("max_delay", &self.max_delay)
            .field("jitter", &self.jitter)
            .finish()
    }
}

impl JitterStrategy {
    /// Apply jitter to a base delay.
    ///
    /// # Arguments
    ///
    /// * `base_delay` - The calculated delay before jitter
    /// * `prev_delay` - The previous delay (for decorrelated jitter)
    /// * `max_delay` - Optional cap on the final delay
    pub fn apply(
        &self,
        base_delay: Duration,
        #[cfg_attr(not(feature = "jitter"), allow(unused_variables))] prev_delay: Option<Duration>,
        max_delay: Option<Duration>,
    ) -> Duration {
        let jittered = match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let mut rng = rand::rng();
                let base_millis = base_delay.as_millis() as f64;
                let jitter_range = base_millis * jitter_factor(*factor);
                let min = (base_millis - jitter_range).max(0.0);
                let max = base_millis + jitter_range;
                let jittered_millis = rng.random_range(min..=max);
                Duration::from_millis(jittered_millis as u64)
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                let max_millis = base_delay.as_millis() as u64;
                if max_millis == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::rng().random_range(0..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Full => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Decorrelated => {
                use rand::Rng;
                let prev = prev_delay.unwrap_or(base_delay);
                let base_millis = base_delay.as_millis() as u64;
                let max_millis = prev.as_millis().saturating_mul(3) as u64;
                if max_millis <= base_millis {
                    base_delay
                } else {
                    Duration::from_millis(rand::rng().random_range(base_millis..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Decorrelated => base_delay,
        };

        match max_delay {
            Some(max) => jittered.min(max),
            None => jittered,
        }
    }
}

fn jitter_factor(factor: f64) -> f64 {
    if factor.is_finite() {
        factor.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Calculate the nth Fibonacci number.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let temp = a.saturating_add(b);
        a = b;
        b = temp;
    }
    b
}

/// Everything a [`RetryExecutor`](super::RetryExecutor) needs to know about
/// one run: the attempt bound, which failures are transient, and the backoff
/// schedule.
///
/// By default every failure is treated as transient and attempts follow each
/// other without delay.
///
/// # Examples
///
/// ```rust
/// use riptide::{Backoff, RetryConfig};
/// use std::time::Duration;
///
/// let config = RetryConfig::new(3)
///     .transient_reasons(["Timeout", "Network"])
///     .with_backoff(Backoff::linear(Duration::from_millis(10)));
///
/// assert_eq!(config.max_attempts(), 3);
/// assert!(config.is_transient("Timeout"));
/// assert!(!config.is_transient("Assertion"));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct RetryConfig {
    max_attempts: u32,
    backoff: Backoff,
    is_transient: TransientFn,
}

impl RetryConfig {
    /// Allow up to `max_attempts` attempts in total (including the first).
    ///
    /// Zero is accepted here and rejected by [`validate`](Self::validate) when a
    /// run starts.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::none(),
            is_transient: Arc::new(|_| true),
        }
    }

    /// Set the backoff schedule.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Only retry failures whose reason satisfies `predicate`.
    pub fn retry_if<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.is_transient = Arc::new(predicate);
        self
    }

    /// Only retry failures whose reason is exactly one of `reasons`.
    pub fn transient_reasons<I, S>(self, reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reasons: Vec<String> = reasons.into_iter().map(Into::into).collect();
        self.retry_if(move |reason| reasons.iter().any(|r| r == reason))
    }

    /// Get the attempt bound.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the backoff schedule.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Whether a failure with this reason may be retried.
    pub fn is_transient(&self, reason: &str) -> bool {
        (self.is_transient)(reason)
    }

    /// Check the attempt bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            Err(ConfigError::ZeroAttempts)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}
