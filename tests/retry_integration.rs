//! End-to-end scenarios for the retry and timeout executors.
//!
//! These compose the two executors the way a test harness would: every retry
//! attempt is bounded by its own deadline, and a timeout is mapped to a
//! transient failure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use riptide::prelude::*;
use riptide::testing::ScriptedWork;
use riptide::{assert_fail, assert_pass};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn flaky_config(max_attempts: u32) -> RetryConfig {
    RetryConfig::new(max_attempts)
        .with_backoff(Backoff::exponential(Duration::from_millis(10)))
        .transient_reasons(["Timeout", "Network"])
}

#[tokio::test(start_paused = true)]
async fn flaky_test_passes_on_third_attempt() {
    let work = ScriptedWork::new([
        Outcome::fail("Timeout"),
        Outcome::fail("Network"),
        Outcome::pass(),
    ]);

    let start = Instant::now();
    let report = RetryExecutor::new(flaky_config(3))
        .run_with_report(|| work.attempt())
        .await
        .unwrap();

    assert_pass!(report.outcome.clone());
    assert_eq!(work.invocations(), 3);
    assert_eq!(
        report.delays(),
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert!(start.elapsed() < Duration::from_millis(40));
}

#[tokio::test(start_paused = true)]
async fn assertion_failure_is_not_retried() {
    let work = ScriptedWork::new([Outcome::fail("Assertion"), Outcome::pass()]);

    let outcome = RetryExecutor::new(flaky_config(5))
        .run(|| work.attempt())
        .await
        .unwrap();

    assert_fail!(outcome, "Assertion");
    assert_eq!(work.invocations(), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_attempts_time_out_and_are_retried() {
    let calls = Arc::new(AtomicU32::new(0));

    let outcome = RetryExecutor::new(flaky_config(3))
        .run(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                let hang = if n < 3 { 10_000 } else { 5 };
                let attempt = async move {
                    tokio::time::sleep(Duration::from_millis(hang)).await;
                    Ok::<_, String>(())
                };
                match with_timeout(attempt, Duration::from_millis(100)).await {
                    Ok(_) => Outcome::pass(),
                    Err(e) if e.is_timeout() => Outcome::fail("Timeout"),
                    Err(e) => Outcome::fail(e.to_string()),
                }
            }
        })
        .await
        .unwrap();

    assert_pass!(outcome);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_a_long_backoff() {
    let token = CancellationToken::new();
    let work = ScriptedWork::new(vec![Outcome::fail("Network"); 3]);
    let executor = RetryExecutor::new(
        RetryConfig::new(3).with_backoff(Backoff::constant(Duration::from_secs(60))),
    )
    .with_cancellation(token.clone());

    let canceller = tokio::spawn({
        let token = token.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        }
    });

    let start = Instant::now();
    let err = executor.run(|| work.attempt()).await.unwrap_err();
    canceller.await.unwrap();

    assert!(err.is_cancelled());
    assert_eq!(work.invocations(), 1);
    assert!(start.elapsed() < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn attempt_hook_sees_every_attempt_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let work = ScriptedWork::new([Outcome::fail("Timeout"), Outcome::pass()]);

    let executor = RetryExecutor::new(flaky_config(4)).on_attempt({
        let seen = Arc::clone(&seen);
        move |record| seen.lock().unwrap().push((record.attempt, record.outcome.is_pass()))
    });
    executor.run(|| work.attempt()).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(1, false), (2, true)]);
}

#[tokio::test]
async fn run_config_drives_both_executors() {
    let cfg: HashMap<String, Option<String>> = [
        ("baseUrl", Some("https://example.test")),
        ("timeoutMs", Some("50")),
        ("retries", Some("1")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
    .collect();

    let run: RunConfig = validate_config(&cfg).into_result().unwrap();
    let timeouts = TimeoutExecutor::new(run.timeout_config().unwrap());
    let work = ScriptedWork::new([Outcome::fail("Network"), Outcome::pass()]);

    let outcome = RetryExecutor::new(run.retry_config())
        .run(|| async {
            match timeouts.run(async { Ok::<_, ()>(work.attempt().await) }).await {
                Ok(done) => done.into_value(),
                Err(_) => Outcome::fail("Timeout"),
            }
        })
        .await
        .unwrap();

    assert_pass!(outcome);
    assert_eq!(work.invocations(), 2);
}

#[tokio::test]
async fn invalid_configs_fail_before_any_work() {
    let calls = AtomicU32::new(0);

    let err = retry(RetryConfig::new(0), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Outcome::pass() }
    })
    .await
    .unwrap_err();
    assert!(err.is_config());

    let err = with_timeout_millis(
        async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(())
        },
        0,
    )
    .await
    .unwrap_err();
    assert!(err.is_config());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
