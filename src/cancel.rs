//! Cooperative cancellation and scan deadlines.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

/// Cooperative cancellation token.
///
/// Clones share state: cancelling one cancels all of them. Besides the
/// polling check, async code can wait on [`CancellationToken::cancelled`].
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled).
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { state: Arc::new(tx) }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation token plus optional deadline for one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanControl {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ScanControl {
    /// No deadline, fresh token.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once cancelled or past the deadline.
    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves when the scan is cancelled or the deadline passes.
    /// Never resolves for a scan with neither.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => {
                let sleep = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline));
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = sleep => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_past_deadline_is_expired() {
        let control = ScanControl::new().with_deadline(Instant::now());
        assert!(control.is_expired());
        assert!(!ScanControl::new().is_expired());
    }

    #[tokio::test]
    async fn test_expired_resolves_on_cancel() {
        let control = ScanControl::new();
        let token = control.token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });
        tokio::time::timeout(Duration::from_secs(5), control.expired())
            .await
            .expect("expired() should resolve after cancel");
    }

    #[tokio::test]
    async fn test_expired_resolves_on_deadline() {
        let control = ScanControl::new().with_timeout(Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(5), control.expired())
            .await
            .expect("expired() should resolve at the deadline");
        assert!(control.is_expired());
    }
}
