//! Backoff for WebDriver commands that hit transient failures.
//!
//! Only connection-level problems, driver 5xx responses without an error
//! object, and page-load timeouts are retried. Protocol errors such as an
//! invalid session surface on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::CollectorError;

fn is_retriable(err: &CollectorError) -> bool {
    match err {
        CollectorError::Http(_) | CollectorError::Navigation { .. } => true,
        CollectorError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Delay before retry number `attempt` (zero-based): `base * 2^attempt`.
fn backoff_delay(backoff_base_secs: u64, attempt: u32) -> Duration {
    Duration::from_secs(backoff_base_secs.saturating_mul(1u64 << attempt.min(62)))
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
///
/// The last error is returned once retries run out, so `max_retries = 3`
/// means at most four attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, CollectorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollectorError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) && attempt < max_retries => {
                let delay = backoff_delay(backoff_base_secs, attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "webdriver command failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    fn nav_timeout() -> CollectorError {
        CollectorError::Navigation {
            url: "https://x.com/search?q=%23nifty50".to_owned(),
            reason: "page load timed out".to_owned(),
        }
    }

    fn invalid_session() -> CollectorError {
        CollectorError::WebDriver {
            command: "navigate".to_owned(),
            error: "invalid session id".to_owned(),
            message: "session deleted".to_owned(),
        }
    }

    /// Replays `outcomes` in order and reports how many were consumed.
    async fn replay(
        max_retries: u32,
        outcomes: Vec<Result<&'static str, CollectorError>>,
    ) -> (Result<&'static str, CollectorError>, usize) {
        let total = outcomes.len();
        let queue = Mutex::new(VecDeque::from(outcomes));
        let result = retry_with_backoff(max_retries, 0, || {
            let next = queue.lock().unwrap().pop_front();
            async move { next.unwrap_or(Ok("exhausted script")) }
        })
        .await;
        let remaining = queue.lock().unwrap().len();
        (result, total - remaining)
    }

    #[tokio::test]
    async fn first_success_is_returned_without_retry() {
        let (result, calls) = replay(3, vec![Ok("loaded")]).await;
        assert_eq!(result.unwrap(), "loaded");
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn navigation_timeouts_are_retried_until_success() {
        let (result, calls) =
            replay(3, vec![Err(nav_timeout()), Err(nav_timeout()), Ok("loaded")]).await;
        assert_eq!(result.unwrap(), "loaded");
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn last_error_surfaces_when_retries_run_out() {
        let (result, calls) = replay(
            1,
            vec![Err(nav_timeout()), Err(nav_timeout()), Ok("never reached")],
        )
        .await;
        assert!(matches!(result, Err(CollectorError::Navigation { .. })));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn protocol_errors_fail_immediately() {
        let (result, calls) = replay(3, vec![Err(invalid_session()), Ok("unused")]).await;
        assert!(matches!(result, Err(CollectorError::WebDriver { .. })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn only_driver_server_errors_are_retriable() {
        let status = |status| CollectorError::UnexpectedStatus {
            status,
            url: "http://localhost:9515/session".to_owned(),
        };
        assert!(is_retriable(&status(502)));
        assert!(!is_retriable(&status(404)));
        assert!(!is_retriable(&CollectorError::Extraction("gone".to_owned())));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(5, 0), Duration::from_secs(5));
        assert_eq!(backoff_delay(5, 2), Duration::from_secs(20));
        assert_eq!(backoff_delay(u64::MAX, 10), Duration::from_secs(u64::MAX));
    }
}
