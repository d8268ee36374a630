use std::time::Duration;

use rand::Rng;
use tracing::warn;

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow((attempt - 1) as u32);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    Duration::from_millis(delay_ms.saturating_add(jitter).min(max_ms))
}

/// Run a fallible async operation, retrying transient failures with backoff.
///
/// `is_transient` decides which errors are retried; anything else is returned
/// immediately. The final attempt's error is returned once `max_attempts` is
/// exhausted.
pub async fn with_backoff<T, E, F, Fut>(
    op_name: &str,
    max_attempts: u8,
    base_ms: u64,
    max_ms: u64,
    is_transient: fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u8 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts || !is_transient(&err) {
                    return Err(err);
                }
                let delay = calculate_backoff(attempt, base_ms, max_ms);
                warn!(%err, attempt, delay_ms = delay.as_millis() as u64, "{op_name} failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
