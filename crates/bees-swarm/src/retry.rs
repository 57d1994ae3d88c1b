//! Bounded retry for one-shot provider calls.

use std::future::Future;
use std::time::Duration;

use bees_cloud::CloudResult;
use tracing::warn;

/// Run `call` up to `attempts` times, retrying only retryable errors.
///
/// The delay doubles after each failure.
pub async fn with_retries<T, F, Fut>(
    operation: &str,
    attempts: u32,
    delay: Duration,
    mut call: F,
) -> CloudResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CloudResult<T>>,
{
    let attempts = attempts.max(1);
    let mut backoff = delay;
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(%operation, attempt, attempts, error = %e, "provider call failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bees_cloud::CloudError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retries("create_tags", 3, Duration::from_millis(1), move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(CloudError::api("create_tags", "flaky"))
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: CloudResult<()> =
            with_retries("create_tags", 2, Duration::from_millis(1), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CloudError::Throttled("create_tags".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: CloudResult<()> =
            with_retries("create_tags", 5, Duration::from_millis(1), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CloudError::rejected("create_tags", "bad tag"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
