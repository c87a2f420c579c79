use crate::{EngineError, Result};
use std::time::Duration;
use tokio::sync::watch;

/// Shared flag for abandoning analysis work that is already in flight.
///
/// Clones observe the same flag, so the engine can hand a token to its
/// retry loop while the caller keeps one to flip. Flipping it wakes any
/// backoff sleep immediately, and `reset` re-arms the token for the next
/// request.
#[derive(Clone, Debug)]
pub struct CancelToken {
    flag: watch::Sender<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (flag, _rx) = watch::channel(false);
        Self { flag }
    }

    /// Ask whatever is currently running to stop.
    pub fn cancel(&self) {
        let _ = self.flag.send(true);
    }

    /// Clear the flag so the token can guard a fresh operation.
    pub fn reset(&self) {
        let _ = self.flag.send(false);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Channel end for tasks that need to observe cancellation.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

fn interrupted() -> EngineError {
    EngineError::Io(std::io::Error::new(
        std::io::ErrorKind::Interrupted,
        "cancelled",
    ))
}

/// Sleep for `duration` unless the token fires first, in which case the
/// sleep ends early with a cancellation error.
pub async fn sleep_unless_cancelled(
    mut cancel: watch::Receiver<bool>,
    duration: Duration,
) -> Result<()> {
    if *cancel.borrow() {
        return Err(interrupted());
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = flag_raised(&mut cancel) => Err(interrupted()),
    }
}

/// Resolves once the flag goes true. If every token is gone nothing can
/// cancel us anymore, so this parks forever and lets the timer win.
async fn flag_raised(cancel: &mut watch::Receiver<bool>) {
    loop {
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        if *cancel.borrow() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_flips_and_resets() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());

        token.reset();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_clones_share_one_flag() {
        let token = CancelToken::new();
        let other = token.clone();

        other.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_sleep_wakes_when_token_fires() {
        let token = CancelToken::new();
        let background = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            background.cancel();
        });

        let started = std::time::Instant::now();
        let outcome = sleep_unless_cancelled(token.watch(), Duration::from_secs(30)).await;

        assert!(outcome.unwrap_err().is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_sleep_rejects_already_fired_token() {
        let token = CancelToken::new();
        token.cancel();

        let outcome = sleep_unless_cancelled(token.watch(), Duration::from_millis(1)).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn test_sleep_finishes_after_token_is_dropped() {
        let receiver = CancelToken::new().watch();
        let outcome = sleep_unless_cancelled(receiver, Duration::from_millis(5)).await;
        assert!(outcome.is_ok());
    }
}
