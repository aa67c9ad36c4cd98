//! Test runner log parsing and per-test aggregation.
//!
//! Runner logs look like:
//!
//! ```text
//! 2025-12-17T10:01:00Z INFO  Suite=Checkout Test=AddToCart DurationMs=120 Status=PASS
//! 2025-12-17T10:01:02Z WARN  Suite=Checkout Test=ApplyCoupon DurationMs=470 Status=FAIL Error=Timeout
//! ```
//!
//! A timestamp and level come first, followed by `key=value` tokens in any
//! order. Runs of whitespace are ignored, keys are case-insensitive and tokens
//! without a key are skipped. `Suite`, `Test`, `DurationMs` and `Status` are
//! required; `Error` is optional.
//!
//! # Examples
//!
//! ```
//! use riptide::report::log::{parse, summarize_by_test};
//! use riptide::report::TestKey;
//!
//! let entries = parse([
//!     "2025-12-17T10:01:03Z INFO  Suite=Search   Test=BasicSearch DurationMs=80  Status=PASS",
//!     "2025-12-17T10:01:04Z INFO  Suite=Search   Test=BasicSearch DurationMs=90  Status=PASS",
//! ])
//! .unwrap();
//!
//! let summary = summarize_by_test(&entries);
//! let basic = &summary[&TestKey::new("Search", "BasicSearch")];
//! assert_eq!(basic.pass_count, 2);
//! assert_eq!(basic.avg_duration_ms, 85.0);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::{Status, TestKey};

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    /// When the run finished, normalized to UTC.
    pub timestamp: DateTime<Utc>,
    /// Log level (INFO, WARN, ...).
    pub level: String,
    /// Suite name.
    pub suite: String,
    /// Test name.
    pub test: String,
    /// Run duration in milliseconds.
    pub duration_ms: i32,
    /// Reported status.
    pub status: Status,
    /// Error category, if the line carried one.
    pub error: Option<String>,
}

impl LogEntry {
    /// The `Suite|Test` key for this entry.
    pub fn key(&self) -> TestKey {
        TestKey::new(&self.suite, &self.test)
    }
}

/// Pass/fail counts and mean duration for one test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestSummary {
    /// Runs with status PASS.
    pub pass_count: u32,
    /// Runs with status FAIL.
    pub fail_count: u32,
    /// Mean duration over all runs, whatever their status.
    pub avg_duration_ms: f64,
}

/// What was wrong with a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// Fewer than six whitespace-separated tokens.
    TooFewFields,
    /// The first token is not a timestamp.
    BadTimestamp,
    /// A required key is absent.
    MissingField(&'static str),
    /// `DurationMs` is not an integer.
    BadDuration,
}

/// A log line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    kind: FormatErrorKind,
    line: String,
    line_number: Option<usize>,
}

impl FormatError {
    fn new(kind: FormatErrorKind, line: &str) -> Self {
        Self {
            kind,
            line: line.to_string(),
            line_number: None,
        }
    }

    fn at_line(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// What was wrong.
    pub fn kind(&self) -> &FormatErrorKind {
        &self.kind
    }

    /// The offending line.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// 1-based position of the line, when parsed as part of a batch.
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FormatErrorKind::TooFewFields => write!(f, "Invalid log line")?,
            FormatErrorKind::BadTimestamp => write!(f, "Bad timestamp")?,
            FormatErrorKind::MissingField(key) => write!(f, "Missing {}", key)?,
            FormatErrorKind::BadDuration => write!(f, "Bad DurationMs")?,
        }
        if let Some(n) = self.line_number {
            write!(f, " at line {}", n)?;
        }
        write!(f, ": {}", self.line)
    }
}

impl std::error::Error for FormatError {}

const MIN_FIELDS: usize = 6;

/// Parse a single log line.
///
/// # Errors
///
/// Returns a [`FormatError`] if the line has too few fields, an unparsable
/// timestamp or duration, or lacks a required key.
pub fn parse_line(line: &str) -> Result<LogEntry, FormatError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < MIN_FIELDS {
        return Err(FormatError::new(FormatErrorKind::TooFewFields, line));
    }

    let timestamp = parse_timestamp(parts[0])
        .ok_or_else(|| FormatError::new(FormatErrorKind::BadTimestamp, line))?;
    let level = parts[1].to_string();

    let fields: HashMap<String, &str> = parts[2..]
        .iter()
        .filter_map(|token| match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => Some((key.to_ascii_lowercase(), value)),
            _ => None,
        })
        .collect();

    let required = |key: &'static str| {
        fields
            .get(&key.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| FormatError::new(FormatErrorKind::MissingField(key), line))
    };

    let suite = required("Suite")?.to_string();
    let test = required("Test")?.to_string();
    let status = Status::parse(required("Status")?);
    let duration_ms = required("DurationMs")?
        .parse::<i32>()
        .map_err(|_| FormatError::new(FormatErrorKind::BadDuration, line))?;
    let error = fields.get("error").map(|e| e.to_string());

    Ok(LogEntry {
        timestamp,
        level,
        suite,
        test,
        duration_ms,
        status,
        error,
    })
}

/// Parse every line, stopping at the first malformed one.
///
/// The returned error carries the 1-based line number.
pub fn parse<I, S>(lines: I) -> Result<Vec<LogEntry>, FormatError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| parse_line(line.as_ref()).map_err(|e| e.at_line(i + 1)))
        .collect()
}

/// Count passes and failures per test and average their durations.
pub fn summarize_by_test(entries: &[LogEntry]) -> BTreeMap<TestKey, TestSummary> {
    let mut runs: BTreeMap<TestKey, Vec<&LogEntry>> = BTreeMap::new();
    for entry in entries {
        runs.entry(entry.key()).or_default().push(entry);
    }

    runs.into_iter()
        .map(|(key, group)| {
            let pass_count = group.iter().filter(|e| e.status.is_pass()).count() as u32;
            let fail_count = group.iter().filter(|e| e.status.is_fail()).count() as u32;
            let total: f64 = group.iter().map(|e| f64::from(e.duration_ms)).sum();
            let summary = TestSummary {
                pass_count,
                fail_count,
                avg_duration_ms: total / group.len() as f64,
            };
            (key, summary)
        })
        .collect()
}

fn parse_timestamp(token: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(token) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
