//! Retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use crate::config::RetrySettings;
use crate::error::FerryError;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            multiplier: settings.multiplier,
        }
    }
}

impl RetryPolicy {
    /// Execute an async operation, retrying retryable errors.
    ///
    /// Non-retryable errors are returned immediately; the last error is
    /// returned once `max_attempts` is used up.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, FerryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FerryError>>,
    {
        if self.max_attempts == 0 {
            return Err(FerryError::InvalidState(
                "retry policy allows no attempts".to_string(),
            ));
        }

        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            if !error.is_retryable() || attempt >= self.max_attempts {
                return Err(error);
            }

            tracing::warn!(
                attempt,
                max_attempts = self.max_attempts,
                error = %error,
                "Retrying after error"
            );

            // Jitter: 75%–125% of backoff
            let jitter_factor = 0.75 + (rand_factor() * 0.5);
            tokio::time::sleep(Duration::from_secs_f64(
                backoff.as_secs_f64() * jitter_factor,
            ))
            .await;

            backoff = Duration::from_secs_f64(
                (backoff.as_secs_f64() * self.multiplier).min(self.max_backoff.as_secs_f64()),
            );
        }
    }
}

/// Pseudo-random factor in [0, 1) from the clock and thread id.
fn rand_factor() -> f64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .hash(&mut hasher);
    std::thread::current().id().hash(&mut hasher);

    (hasher.finish() % 10_000) as f64 / 10_000.0
}
