//! Bounded repeat-until-status helper, used to provoke the service's rate
//! limiter.

use http::StatusCode;

use crate::assertion::Then;
use crate::error::{Error, Result};
use crate::request::Prepared;

pub const RATE_LIMIT_ATTEMPTS: u32 = 5;

/// The first response that carried the expected status.
#[derive(Debug)]
pub struct Observed {
    /// 1-based.
    pub attempt: u32,
    pub then: Then,
}

/// Sends a fresh request built by `make` up to `max_attempts` times, one after
/// another, and stops at the first response whose status is `expected`.
///
/// A transport failure ends polling immediately.
pub async fn until_status<F>(max_attempts: u32, expected: StatusCode, mut make: F) -> Result<Observed>
where
    F: FnMut(u32) -> Prepared,
{
    let mut last_status = None;

    for attempt in 1..=max_attempts {
        let then = make(attempt).execute().await?;
        let status = then.response().status();

        if status == expected {
            log::info!(
                "`{}`: got {} on attempt {attempt}/{max_attempts}",
                then.spec().name(),
                status
            );
            return Ok(Observed { attempt, then });
        }

        log::debug!(
            "`{}`: attempt {attempt}/{max_attempts} returned {status}, wanted {expected}",
            then.spec().name()
        );
        last_status = Some(status);
    }

    let last_status = last_status
        .ok_or_else(|| Error::InvalidRequest("polling needs at least one attempt".to_string()))?;

    Err(Error::StatusNotObserved {
        expected,
        attempts: max_attempts,
        last_status,
    })
}

/// [`until_status`] for `429 Too Many Requests` with [`RATE_LIMIT_ATTEMPTS`].
pub async fn until_rate_limited<F>(make: F) -> Result<Observed>
where
    F: FnMut(u32) -> Prepared,
{
    until_status(RATE_LIMIT_ATTEMPTS, StatusCode::TOO_MANY_REQUESTS, make).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Given;

    #[tokio::test]
    async fn zero_attempts_is_a_usage_error() {
        let result = until_status(0, StatusCode::OK, |_| {
            Given::new().when().get("http://127.0.0.1:9/")
        })
        .await;

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }
}
