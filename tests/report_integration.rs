//! A nightly-run walkthrough over the reporting helpers.

use std::collections::HashMap;

use riptide::config::{validate, validate_errors};
use riptide::report::diff::compute;
use riptide::report::log::{parse, summarize_by_test};
use riptide::report::triage::group_by_signature;
use riptide::report::{Failure, Status, TestKey, TestResult};
use riptide::{assert_failure, assert_success};

const NIGHTLY_LOG: &str = "\
2025-12-17T10:01:00Z INFO  Suite=Checkout Test=AddToCart DurationMs=120 Status=PASS
2025-12-17T10:01:01Z INFO  Suite=Checkout Test=ApplyCoupon DurationMs=450 Status=FAIL Error=Assertion
2025-12-17T10:01:02Z WARN  Suite=Checkout Test=ApplyCoupon DurationMs=470 Status=FAIL Error=Timeout
2025-12-17T10:01:03Z INFO  Suite=Search   Test=BasicSearch DurationMs=80  Status=PASS
2025-12-17T10:01:04Z INFO  Suite=Search   Test=BasicSearch DurationMs=90  Status=PASS";

#[test]
fn log_lines_summarize_per_test() {
    let entries = parse(NIGHTLY_LOG.lines()).unwrap();
    assert_eq!(entries.len(), 5);

    let summary = summarize_by_test(&entries);
    let coupon = &summary[&TestKey::new("Checkout", "ApplyCoupon")];
    assert_eq!((coupon.pass_count, coupon.fail_count), (0, 2));
    assert_eq!(summary[&TestKey::new("Checkout", "AddToCart")].pass_count, 1);
    assert_eq!(
        summary[&TestKey::new("Search", "BasicSearch")].avg_duration_ms,
        85.0
    );
}

#[test]
fn failed_log_entries_feed_triage() {
    let entries = parse(NIGHTLY_LOG.lines()).unwrap();
    let failures = entries
        .iter()
        .filter(|e| e.status == Status::Fail)
        .map(|e| {
            Failure::new(
                &e.suite,
                &e.test,
                e.error.clone().unwrap_or_default(),
                "",
            )
        });

    let groups = group_by_signature(failures);
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.len() == 1));
}

#[test]
fn triage_scenario() {
    let groups = group_by_signature(vec![
        Failure::new("Checkout", "ApplyCoupon", "Timeout", "stackA"),
        Failure::new("Checkout", "ApplyCoupon", "Timeout", "stackA"),
        Failure::new("Checkout", "ApplyCoupon", "Assertion", "stackB"),
        Failure::new("Search", "BasicSearch", "Timeout", "stackC"),
    ]);

    assert_eq!(groups.len(), 3);
    assert_eq!(groups.iter().map(Vec::len).max(), Some(2));
}

#[test]
fn config_scenario() {
    let mut cfg: HashMap<String, Option<String>> = [
        ("baseUrl", "https://example.test"),
        ("timeoutMs", "5000"),
        ("retries", "2"),
        ("env", "staging"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), Some(v.to_string())))
    .collect();

    assert_success!(validate(&cfg));
    assert!(validate_errors(&cfg).is_empty());

    cfg.insert("timeoutMs".to_string(), Some("-1".to_string()));
    assert_failure!(validate(&cfg));
    assert!(!validate_errors(&cfg).is_empty());
}

#[test]
fn diff_scenario() {
    let yesterday = [
        TestResult::new("Checkout", "ApplyCoupon", "FAIL"),
        TestResult::new("Checkout", "AddToCart", "PASS"),
        TestResult::new("Search", "BasicSearch", "PASS"),
    ];
    let today = [
        TestResult::new("Checkout", "ApplyCoupon", "PASS"),
        TestResult::new("Checkout", "AddToCart", "FAIL"),
        TestResult::new("Search", "BasicSearch", "PASS"),
        TestResult::new("Search", "AdvancedSearch", "FAIL"),
    ];

    let diff = compute(&yesterday, &today);

    let new_failures: Vec<String> = diff.new_failures.iter().map(|r| r.key().to_string()).collect();
    assert_eq!(new_failures, vec!["Checkout|AddToCart", "Search|AdvancedSearch"]);
    assert_eq!(diff.fixed.len(), 1);
    assert_eq!(diff.fixed[0].key().to_string(), "Checkout|ApplyCoupon");
    assert!(diff.still_failing.is_empty());
}

#[cfg(feature = "serde")]
#[test]
fn records_serialize_to_json() {
    let entries = parse(NIGHTLY_LOG.lines().take(1)).unwrap();
    let json = serde_json::to_value(&entries[0]).unwrap();
    assert_eq!(json["suite"], "Checkout");
    assert_eq!(json["status"], "Pass");
    assert_eq!(json["timestamp"], "2025-12-17T10:01:00Z");
}
