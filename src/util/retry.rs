use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Default backoff base: retries sleep 1s, 2s, 4s, ...
pub const DEFAULT_BACKOFF_SECONDS: f64 = 2.0;

/// Runs `operation` up to `attempts` times with exponential backoff.
///
/// Attempts are 1-indexed: after a failed attempt `n < attempts` the policy
/// sleeps `backoff_seconds^(n-1)` seconds (so the first retry waits exactly
/// one second with the default base) and tries again. The error of the final
/// attempt is returned unchanged, so callers see the operation's own error
/// type, never a wrapper.
///
/// `attempts` is clamped to at least 1; the operation always runs at least
/// once, even when a caller passes 0.
pub async fn retry<T, E, F, Fut>(
    mut operation: F,
    attempts: u32,
    backoff_seconds: f64,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                let delay_secs = backoff_seconds.powi(attempt as i32 - 1);
                tracing::debug!(
                    error = %e,
                    attempt = attempt,
                    delay_secs = delay_secs,
                    "Retrying after transient error"
                );
                tokio::time::sleep(Duration::from_secs_f64(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}
