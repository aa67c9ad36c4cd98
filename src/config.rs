//! Run-configuration validation.
//!
//! A test run is configured from a flat map of string keys to optional string
//! values (as read from JSON, environment or CLI flags). [`validate`] checks
//! every rule and reports *all* violations at once through [`Validation`]:
//!
//! - `baseUrl`: required, an absolute URI
//! - `timeoutMs`: required, an integer in `1..=120000`
//! - `retries`: required, an integer in `0..=5`
//! - `env`: optional; when present and not blank, one of `dev`, `staging`, `prod`
//!
//! Blank values are treated as missing.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use riptide::config::{validate, Env};
//!
//! let cfg: HashMap<String, Option<String>> = [
//!     ("baseUrl", Some("https://example.test")),
//!     ("timeoutMs", Some("5000")),
//!     ("retries", Some("2")),
//!     ("env", Some("staging")),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
//! .collect();
//!
//! let run = validate(&cfg).into_result().unwrap();
//! assert_eq!(run.env, Some(Env::Staging));
//! assert_eq!(run.retry_config().max_attempts(), 3);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use crate::retry::{ConfigError, RetryConfig, TimeoutConfig};
use crate::Validation;

const TIMEOUT_RANGE: RangeInclusive<i32> = 1..=120_000;
const RETRIES_RANGE: RangeInclusive<i32> = 0..=5;

/// Deployment environment a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Env {
    /// Local or shared development.
    Dev,
    /// Pre-production.
    Staging,
    /// Production.
    Prod,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Env::Dev),
            "staging" => Ok(Env::Staging),
            "prod" => Ok(Env::Prod),
            _ => Err("env must be one of: dev, staging, prod".to_string()),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Env::Dev => "dev",
            Env::Staging => "staging",
            Env::Prod => "prod",
        })
    }
}

/// A validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Absolute base URI of the system under test.
    pub base_url: String,
    /// Per-attempt timeout in milliseconds, within `1..=120000`.
    pub timeout_ms: u32,
    /// Retries after the first attempt, within `0..=5`.
    pub retries: u32,
    /// Target environment, if given.
    pub env: Option<Env>,
}

impl RunConfig {
    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }

    /// Timeout settings for a [`TimeoutExecutor`](crate::TimeoutExecutor).
    ///
    /// # Errors
    ///
    /// Only fails if `timeout_ms` was set to zero after validation.
    pub fn timeout_config(&self) -> Result<TimeoutConfig, ConfigError> {
        TimeoutConfig::new(self.timeout())
    }

    /// Retry settings allowing `retries + 1` attempts.
    ///
    /// Every failure counts as transient and there is no backoff; refine the
    /// result with [`RetryConfig::retry_if`] and [`RetryConfig::with_backoff`].
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.retries.saturating_add(1))
    }
}

/// Validate a raw run configuration, accumulating every error.
pub fn validate(cfg: &HashMap<String, Option<String>>) -> Validation<RunConfig, Vec<String>> {
    Validation::<RunConfig, Vec<String>>::all((
        check_base_url(cfg),
        check_int(cfg, "timeoutMs", TIMEOUT_RANGE),
        check_int(cfg, "retries", RETRIES_RANGE),
        check_env(cfg),
    ))
    .map(|(base_url, timeout_ms, retries, env)| RunConfig {
        base_url,
        timeout_ms,
        retries,
        env,
    })
}

/// Validate and return just the error messages, in rule order.
///
/// An empty list means the configuration is valid.
pub fn validate_errors(cfg: &HashMap<String, Option<String>>) -> Vec<String> {
    match validate(cfg) {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors,
    }
}

fn get<'a>(cfg: &'a HashMap<String, Option<String>>, key: &str) -> Option<&'a str> {
    cfg.get(key)
        .and_then(|v| v.as_deref())
        .filter(|v| !v.trim().is_empty())
}

fn check_base_url(cfg: &HashMap<String, Option<String>>) -> Validation<String, Vec<String>> {
    match get(cfg, "baseUrl") {
        None => Validation::failure(vec!["baseUrl is required".to_string()]),
        Some(raw) => match url::Url::parse(raw.trim()) {
            Ok(_) => Validation::success(raw.trim().to_string()),
            Err(_) => Validation::failure(vec!["baseUrl must be an absolute URI".to_string()]),
        },
    }
}

fn check_int(
    cfg: &HashMap<String, Option<String>>,
    key: &str,
    range: RangeInclusive<i32>,
) -> Validation<u32, Vec<String>> {
    let parsed = get(cfg, key).and_then(|raw| raw.trim().parse::<i32>().ok());
    let value = match parsed {
        Some(value) => value,
        None => {
            return Validation::failure(vec![format!(
                "{} is required and must be an integer",
                key
            )])
        }
    };

    match u32::try_from(value) {
        Ok(v) if range.contains(&value) => Validation::success(v),
        _ => Validation::failure(vec![format!(
            "{} must be between {} and {}",
            key,
            range.start(),
            range.end()
        )]),
    }
}

fn check_env(cfg: &HashMap<String, Option<String>>) -> Validation<Option<Env>, Vec<String>> {
    match get(cfg, "env") {
        None => Validation::success(None),
        Some(raw) => Validation::from_result(raw.parse::<Env>().map(Some).map_err(|e| vec![e])),
    }
}
