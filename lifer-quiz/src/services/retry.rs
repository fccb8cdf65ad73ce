//! Bounded retry with linearly increasing delay
//!
//! Delay grows linearly with the retry count (base, 2x base, 3x base).
//! Retries are local to one operation; the caller decides what a given-up
//! error degrades to.

use std::future::Future;
use std::time::Duration;

/// Run an operation, retrying failures up to `max_retries` times.
///
/// The first attempt runs immediately; retry `n` waits `n * base_delay`
/// first. Returns the last error once the retry budget is spent.
pub async fn retry_linear<F, Fut, T, E>(
    operation_name: &str,
    max_retries: u32,
    base_delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if retry == max_retries {
                    tracing::warn!(
                        operation = operation_name,
                        retries = retry,
                        error = %err,
                        "Giving up after retries"
                    );
                    return Err(err);
                }

                retry += 1;
                let delay = base_delay * retry;
                tracing::debug!(
                    operation = operation_name,
                    retry,
                    ?delay,
                    error = %err,
                    "Attempt failed, will retry after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn succeeds_first_attempt_without_delay() {
        let result: Result<i32, String> =
            retry_linear("test_op", 3, Duration::from_secs(2), || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let mut attempts = 0;

        let result: Result<i32, String> =
            retry_linear("test_op", 3, Duration::from_secs(2), || {
                attempts += 1;
                let attempt = attempts;
                async move {
                    if attempt < 3 {
                        Err("transient".to_string())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_retry_budget() {
        let mut attempts = 0;

        let result: Result<i32, String> =
            retry_linear("test_op", 3, Duration::from_secs(2), || {
                attempts += 1;
                async { Err("still down".to_string()) }
            })
            .await;

        assert_eq!(result.unwrap_err(), "still down");
        // Initial attempt plus three retries
        assert_eq!(attempts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn delays_increase_linearly() {
        let start = tokio::time::Instant::now();
        let mut attempts = 0;

        let _: Result<i32, String> =
            retry_linear("test_op", 3, Duration::from_secs(2), || {
                attempts += 1;
                async { Err("down".to_string()) }
            })
            .await;

        // 2s + 4s + 6s of backoff under paused time
        assert_eq!(start.elapsed(), Duration::from_secs(12));
    }
}
