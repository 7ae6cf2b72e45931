//! Single retry policy for transient HTTP failures.
//!
//! Write operations (farming, game claim, friends) answer a non-success status
//! from time to time. They are retried exactly once after a short pause and
//! the second answer is final, whatever it is.

use std::time::Duration;

use log::warn;

use crate::blum::{ApiError, delay::Delay, requester::RawResponse};

/// Pause before the single retry.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Sends a request, and once more after [`RETRY_DELAY`] if the status is not a success.
///
/// Transport errors are not retried. The second response is returned as is,
/// including a non-success one.
///
/// # Arguments
///
/// * `delay` - The sleep strategy of the session.
/// * `label` - Operation name for the logs.
/// * `send` - Issues the request; called once or twice.
pub async fn retry_once<D, F, Fut>(delay: &D, label: &str, mut send: F) -> Result<RawResponse, ApiError>
where
    D: Delay,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RawResponse, ApiError>>,
{
    let response = send().await?;
    if response.is_success() {
        return Ok(response);
    }

    warn!(
        "{} answered {}, retrying once in {}s",
        label,
        response.status,
        RETRY_DELAY.as_secs()
    );
    delay.sleep(RETRY_DELAY).await;

    send().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blum::delay::MockDelay;
    use reqwest::StatusCode;
    use std::cell::Cell;

    fn response(status: StatusCode, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_success_is_not_retried() {
        let mut delay = MockDelay::new();
        delay.expect_sleep().never();
        let calls = Cell::new(0);

        let result = retry_once(&delay, "op", || {
            calls.set(calls.get() + 1);
            async { Ok(response(StatusCode::OK, "OK")) }
        })
        .await
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(result.body, "OK");
    }

    #[tokio::test]
    async fn test_failure_is_retried_once_after_delay() {
        let mut delay = MockDelay::new();
        delay
            .expect_sleep()
            .with(mockall::predicate::eq(RETRY_DELAY))
            .times(1)
            .returning(|_| ());
        let calls = Cell::new(0);

        let result = retry_once(&delay, "op", || {
            calls.set(calls.get() + 1);
            let status = if calls.get() == 1 {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::OK
            };
            async move { Ok(response(status, "OK")) }
        })
        .await
        .unwrap();

        assert_eq!(calls.get(), 2);
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_second_failure_is_returned() {
        let mut delay = MockDelay::new();
        delay.expect_sleep().times(1).returning(|_| ());
        let calls = Cell::new(0);

        let result = retry_once(&delay, "op", || {
            calls.set(calls.get() + 1);
            async { Ok(response(StatusCode::INTERNAL_SERVER_ERROR, "again")) }
        })
        .await
        .unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(result.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(result.body, "again");
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let mut delay = MockDelay::new();
        delay.expect_sleep().never();
        let calls = Cell::new(0);

        let result = retry_once(&delay, "op", || {
            calls.set(calls.get() + 1);
            async { Err(ApiError::MissingField("token")) }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(ApiError::MissingField("token"))));
    }
}
