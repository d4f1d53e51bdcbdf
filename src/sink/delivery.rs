use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{error, warn};

use super::failure_log::{FailureEntry, FailureLog};
use super::http::RecordSubmitter;

/// Bounded retry with a fixed inter-attempt delay.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryPolicy {
    /// Total submit attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

/// Submit a formatted document, retrying per `policy`. When all attempts
/// fail the document is appended to the failure log instead of being
/// dropped; delivery intent is at-least-once, never exactly-once.
///
/// Returns whether the destination accepted the document. Never returns
/// an error: the event-consumption side must not be disturbed by a dead
/// endpoint.
pub async fn deliver_with_retry(
    sink: &impl RecordSubmitter,
    body: &Value,
    policy: &RetryPolicy,
    failure_log: &FailureLog,
) -> bool {
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts.max(1) {
        match sink.submit(body).await {
            Ok(()) => return true,
            Err(err) => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    destination = sink.destination(),
                    %err,
                    "record delivery failed"
                );
                last_error = err.to_string();
            }
        }
        if attempt < policy.max_attempts {
            sleep(Duration::from_millis(policy.delay_ms)).await;
        }
    }

    let entry = FailureEntry {
        destination: sink.destination().to_string(),
        body: body.clone(),
        error: last_error,
        failed_at: Utc::now(),
    };
    match failure_log.append(&entry) {
        Ok(()) => error!(
            destination = sink.destination(),
            log = %failure_log.path().display(),
            "delivery retries exhausted, record written to failure log"
        ),
        Err(io_err) => error!(
            destination = sink.destination(),
            %io_err,
            "delivery retries exhausted and failure log unwritable, record lost"
        ),
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::error::SinkError;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` submits, then succeeds.
    struct FlakySink {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakySink {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl RecordSubmitter for FlakySink {
        async fn submit(&self, _body: &Value) -> Result<(), SinkError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(SinkError::ApiError {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(())
            }
        }

        fn destination(&self) -> &str {
            "http://test/records"
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn first_attempt_success_skips_retries() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("failed.jsonl"));
        let sink = FlakySink::new(0);

        let delivered = deliver_with_retry(&sink, &json!({}), &fast_policy(3), &log).await;

        assert!(delivered);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
        assert!(!log.path().exists());
    }

    #[tokio::test]
    async fn retries_until_success() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("failed.jsonl"));
        let sink = FlakySink::new(2);

        let delivered = deliver_with_retry(&sink, &json!({}), &fast_policy(3), &log).await;

        assert!(delivered);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
        assert!(!log.path().exists());
    }

    #[tokio::test]
    async fn exhaustion_writes_failure_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("failed.jsonl"));
        let sink = FlakySink::new(u32::MAX);
        let body = json!({"idShort": "Record1-1"});

        let delivered = deliver_with_retry(&sink, &body, &fast_policy(2), &log).await;

        assert!(!delivered);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let entry: FailureEntry = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(entry.destination, "http://test/records");
        assert_eq!(entry.body, body);
        assert!(entry.error.contains("500"));
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("failed.jsonl"));
        let sink = FlakySink::new(0);

        let delivered = deliver_with_retry(&sink, &json!({}), &fast_policy(0), &log).await;

        assert!(delivered);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_ms, 1000);
    }
}
