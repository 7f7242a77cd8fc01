//! Failure injection tests for the resilience layer.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rpc_guard::config::{CircuitBreakerConfig, RetryPolicy};
use rpc_guard::resilience::timeouts::with_attempt_timeout;
use rpc_guard::{
    BreakerError, CircuitBreakerRegistry, CircuitState, ErrorReporter, GuardError, RemoteError,
    RetryExecutor,
};

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay_ms: 1000,
        max_delay_ms: 30_000,
    }
}

#[tokio::test(start_paused = true)]
async fn test_eventual_success_after_timeouts() {
    let reporter = Arc::new(ErrorReporter::new());
    let executor = RetryExecutor::new(policy(), reporter.clone());

    let calls = Arc::new(AtomicU32::new(0));
    let op_calls = calls.clone();

    let result = executor
        .execute_with_retry(
            move || {
                let calls = op_calls.clone();
                async move {
                    let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if call <= 3 {
                        Err(RemoteError::new("timeout connecting to node"))
                    } else {
                        Ok(format!("receipt-{call}"))
                    }
                }
            },
            "submit-message",
            Some(serde_json::json!({"topic": "0.0.4821"})),
        )
        .await;

    assert_eq!(result.unwrap(), "receipt-4");
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    let report = reporter.report();
    assert_eq!(report.history.len(), 3);
    assert_eq!(report.successful_retry_count, 1);
    assert_eq!(report.total_errors, 3);
    assert_eq!(
        report.most_common_error.as_deref(),
        Some("timeout connecting to node")
    );
}

#[tokio::test(start_paused = true)]
async fn test_permanent_status_fails_fast() {
    let reporter = Arc::new(ErrorReporter::new());
    let executor = RetryExecutor::new(policy(), reporter.clone());

    let calls = Arc::new(AtomicU32::new(0));
    let op_calls = calls.clone();

    let result: Result<(), _> = executor
        .execute_with_retry(
            move || {
                let calls = op_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(RemoteError::with_status(
                        "INVALID_ACCOUNT_ID",
                        "account 0.0.999999 not found",
                    ))
                }
            },
            "query-balance",
            None,
        )
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1, "no retries for permanent errors");
    assert!(matches!(
        result.unwrap_err(),
        GuardError::Permanent { attempts: 1, .. }
    ));

    let report = reporter.report();
    assert_eq!(report.error_counts["INVALID_ACCOUNT_ID"], 1);
    assert_eq!(report.successful_retry_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_breaker_wrapping_retry_loop() {
    let registry = CircuitBreakerRegistry::new(CircuitBreakerConfig {
        failure_threshold: 2,
        reset_timeout_ms: 60_000,
    });
    let breaker = registry.breaker("deploy-contract");
    let executor = RetryExecutor::with_policy(RetryPolicy {
        max_retries: 1,
        base_delay_ms: 100,
        max_delay_ms: 1000,
    });

    let calls = Arc::new(AtomicU32::new(0));

    // Two exhausted retry loops are two breaker failures; the circuit opens.
    for _ in 0..2 {
        let op_calls = calls.clone();
        let result: Result<(), _> = breaker
            .execute(|| {
                executor.execute_with_retry(
                    move || {
                        let calls = op_calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Err(RemoteError::with_status("BUSY", "node throttling"))
                        }
                    },
                    "deploy-contract",
                    None,
                )
            })
            .await;
        assert!(matches!(
            result.unwrap_err(),
            BreakerError::Operation(GuardError::Exhausted { attempts: 2, .. })
        ));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(breaker.snapshot().state, CircuitState::Open);

    // Open circuit short-circuits before the retry loop runs at all.
    let op_calls = calls.clone();
    let rejected: Result<(), _> = breaker
        .execute(|| {
            executor.execute_with_retry(
                move || {
                    let calls = op_calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err(RemoteError::with_status("BUSY", "node throttling"))
                    }
                },
                "deploy-contract",
                None,
            )
        })
        .await;
    assert!(rejected.unwrap_err().is_open());
    assert_eq!(calls.load(Ordering::SeqCst), 4, "operation never invoked");

    // After the cooldown a recovered operation closes the circuit again.
    tokio::time::advance(Duration::from_millis(60_001)).await;
    let result = breaker
        .execute(|| {
            executor.execute_with_retry(
                || async { Ok::<_, RemoteError>("deployed") },
                "deploy-contract",
                None,
            )
        })
        .await;
    assert_eq!(result.unwrap(), "deployed");
    let snapshot = breaker.snapshot();
    assert_eq!(snapshot.state, CircuitState::Closed);
    assert_eq!(snapshot.failure_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_attempt_deadline_classifies_transient() {
    let reporter = Arc::new(ErrorReporter::new());
    let executor = RetryExecutor::new(
        RetryPolicy {
            max_retries: 1,
            base_delay_ms: 100,
            max_delay_ms: 1000,
        },
        reporter.clone(),
    );

    let calls = Arc::new(AtomicU32::new(0));
    let op_calls = calls.clone();

    // First attempt hangs past its deadline; second answers promptly.
    let result = executor
        .execute_with_retry(
            move || {
                let calls = op_calls.clone();
                async move {
                    with_attempt_timeout(Duration::from_millis(500), async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            std::future::pending().await
                        } else {
                            Ok(21)
                        }
                    })
                    .await
                }
            },
            "fetch-record",
            None,
        )
        .await;

    assert_eq!(result.unwrap(), 21);
    let report = reporter.report();
    assert_eq!(report.history.len(), 1, "one record per timed-out attempt");
    assert!(report.history[0].message.contains("timed out"));
    assert_eq!(report.successful_retry_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_operations_share_reporter_without_cross_talk() {
    let reporter = Arc::new(ErrorReporter::new());

    let submit = {
        let executor = RetryExecutor::new(policy(), reporter.clone());
        tokio::spawn(async move {
            executor
                .execute_with_retry(
                    || async { Err::<(), _>(RemoteError::with_status("BUSY", "node throttling")) },
                    "submit-message",
                    None,
                )
                .await
        })
    };
    let query = {
        let executor = RetryExecutor::new(policy(), reporter.clone());
        tokio::spawn(async move {
            executor
                .execute_with_retry(
                    || async { Ok::<_, RemoteError>(100u64) },
                    "query-balance",
                    None,
                )
                .await
        })
    };

    let (submit, query) = tokio::join!(submit, query);
    assert!(matches!(
        submit.unwrap().unwrap_err(),
        GuardError::Exhausted { attempts: 4, .. }
    ));
    assert_eq!(query.unwrap().unwrap(), 100);

    let report = reporter.report();
    assert_eq!(report.total_errors, 4);
    assert!(report
        .history
        .iter()
        .all(|record| record.operation_name == "submit-message"));
}
