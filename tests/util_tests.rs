//! Tests for utility modules (retry, timeout).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ferry::config::RetrySettings;
use ferry::error::FerryError;
use ferry::util::retry::RetryPolicy;
use ferry::util::timeout::with_timeout;

fn policy(max_attempts: u32, backoff_ms: u64) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(backoff_ms),
        max_backoff: Duration::from_millis(backoff_ms),
        multiplier: 2.0,
    }
}

#[tokio::test(start_paused = true)]
async fn retry_policy_retries_retryable_errors_until_success() {
    let policy = policy(4, 100);
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_task = attempts.clone();

    let task = tokio::spawn(async move {
        policy
            .execute(|| {
                let attempts = attempts_for_task.clone();
                async move {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(FerryError::gateway("connection reset"))
                    } else {
                        Ok::<_, FerryError>("ok")
                    }
                }
            })
            .await
    });

    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(1)).await;
    let result = task.await.unwrap();

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_policy_stops_immediately_for_non_retryable_errors() {
    let policy = policy(5, 1);
    let attempts = Arc::new(AtomicUsize::new(0));

    let result = policy
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(FerryError::api(400, "bad request"))
            }
        })
        .await;

    match result {
        Err(FerryError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad request");
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_policy_returns_last_error_when_attempts_are_exhausted() {
    let policy = policy(3, 50);
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_task = attempts.clone();

    let task = tokio::spawn(async move {
        policy
            .execute(|| {
                let attempts = attempts_for_task.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(FerryError::RateLimited {
                        retry_after_ms: None,
                    })
                }
            })
            .await
    });

    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(1)).await;
    let result = task.await.unwrap();

    match result {
        Err(FerryError::RateLimited { retry_after_ms }) => assert_eq!(retry_after_ms, None),
        other => panic!("expected rate limit error, got {other:?}"),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_policy_with_zero_attempts_never_runs_the_operation() {
    let policy = policy(0, 1);
    let attempts = Arc::new(AtomicUsize::new(0));

    let result = policy
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FerryError>(())
            }
        })
        .await;

    assert!(matches!(result, Err(FerryError::InvalidState(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
}

#[test]
fn retry_policy_follows_settings() {
    let policy = RetryPolicy::from(&RetrySettings {
        max_attempts: 7,
        initial_backoff_ms: 250,
        max_backoff_ms: 4000,
        multiplier: 3.0,
    });
    assert_eq!(policy.max_attempts, 7);
    assert_eq!(policy.initial_backoff, Duration::from_millis(250));
    assert_eq!(policy.max_backoff, Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn with_timeout_reports_the_deadline() {
    let result = with_timeout(Duration::from_millis(75), async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok::<_, FerryError>(())
    })
    .await;

    match result {
        Err(FerryError::Timeout(ms)) => assert_eq!(ms, 75),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn with_timeout_passes_through_results() {
    let ok = with_timeout(Duration::from_secs(1), async { Ok::<_, FerryError>(5) }).await;
    assert_eq!(ok.unwrap(), 5);

    let err = with_timeout(Duration::from_secs(1), async {
        Err::<(), _>(FerryError::gateway("down"))
    })
    .await;
    assert!(matches!(err, Err(FerryError::Gateway(_))));
}
