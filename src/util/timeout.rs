//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::FerryError;

/// Wrap a fallible future with a deadline reported as `FerryError::Timeout`.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, FerryError>>,
) -> Result<T, FerryError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(FerryError::Timeout(
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}
