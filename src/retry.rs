use crate::cancel::sleep_unless_cancelled;
use crate::{EngineError, Result, RetryConfig};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// What a retried operation produced, plus how hard we had to work for it.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub value: T,
    /// How many rate-limit retries ran before success.
    pub attempts: u32,
    /// Seconds spent waiting out backoff.
    pub waited_secs: u64,
}

/// Drive `operation` until it succeeds, backing off on rate limits.
///
/// Only [`EngineError::RateLimited`] earns another attempt; every other
/// error returns straight away. Waits grow exponentially from
/// `policy.base_delay` but never undercut the provider's Retry-After hint
/// and never exceed `policy.max_delay`. Each wait is announced through
/// `on_backoff(delay_secs, attempt)` before the sleep starts, and the
/// sleep itself is cancellable, so firing `cancel` abandons the remaining
/// attempts mid-wait.
pub async fn run_with_retries<T, F, Fut, OnBackoff>(
    policy: RetryConfig,
    cancel: watch::Receiver<bool>,
    what: &str,
    mut operation: F,
    mut on_backoff: OnBackoff,
) -> Result<RetryOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    OnBackoff: FnMut(u64, u32),
{
    let mut attempts = 0;
    let mut waited_secs = 0;

    loop {
        match operation().await {
            Ok(value) => {
                return Ok(RetryOutcome {
                    value,
                    attempts,
                    waited_secs,
                });
            }
            Err(EngineError::RateLimited { retry_after }) => {
                if !policy.enabled || attempts >= policy.max_retries {
                    if policy.enabled {
                        log::warn!(
                            "{what}: giving up after {} rate-limit retries",
                            policy.max_retries
                        );
                    }
                    return Err(EngineError::RateLimited { retry_after });
                }

                let delay = backoff_delay(&policy, attempts, retry_after);
                log::info!(
                    "{what}: rate limited, waiting {delay}s before retry {} of {}",
                    attempts + 1,
                    policy.max_retries
                );
                on_backoff(delay, attempts + 1);

                sleep_unless_cancelled(cancel.clone(), Duration::from_secs(delay)).await?;
                attempts += 1;
                waited_secs += delay;
            }
            Err(other) => return Err(other),
        }
    }
}

/// Exponential backoff clamped between the provider's hint and the
/// configured ceiling.
fn backoff_delay(policy: &RetryConfig, attempts: u32, retry_after: u64) -> u64 {
    let exponential = policy
        .base_delay
        .saturating_mul(2_u64.saturating_pow(attempts));
    exponential.max(retry_after).min(policy.max_delay)
}
