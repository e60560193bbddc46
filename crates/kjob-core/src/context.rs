use std::{fmt, time::Duration};

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Cancellable execution context of a run, with an optional deadline.
///
/// The context is "done" once its token is cancelled or its deadline has passed.
/// Cloning shares the same token.
#[derive(Clone, Default)]
pub struct RunContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RunContext {
    /// Context that is never done unless cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Set the deadline to `timeout` from now.
    ///
    /// A timeout too large to represent as an instant leaves the context without a new deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Set an absolute deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline (zero once passed), or `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Cancel the context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| d <= Instant::now())
    }

    /// Resolves once the context is cancelled or the deadline elapses.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = sleep_until(deadline) => {}
                }
            }
            None => self.cancel.cancelled().await,
        }
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use super::RunContext;

    #[tokio::test(start_paused = true)]
    async fn default_context_is_not_done() {
        let ctx = RunContext::new();
        assert!(!ctx.is_done());
        assert!(ctx.remaining().is_none());

        let waited = tokio::time::timeout(Duration::from_secs(60), ctx.done()).await;
        assert!(waited.is_err(), "context without deadline must not finish");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_completes_done() {
        let ctx = RunContext::new().with_timeout(Duration::from_secs(2));
        let start = Instant::now();

        ctx.done().await;

        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(ctx.is_done());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_completes_done() {
        let token = CancellationToken::new();
        let ctx = RunContext::new().with_cancel(token.clone());

        token.cancel();
        ctx.done().await;
        assert!(ctx.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_deadline_is_kept() {
        let now = Instant::now();
        let ctx = RunContext::new()
            .with_deadline(now + Duration::from_secs(5))
            .with_deadline(now + Duration::from_secs(10));

        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_timeout_means_no_deadline() {
        let ctx = RunContext::new().with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_done());

        let bounded = RunContext::new()
            .with_timeout(Duration::from_secs(3))
            .with_timeout(Duration::MAX);
        assert_eq!(bounded.remaining(), Some(Duration::from_secs(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_cancellation() {
        let ctx = RunContext::new();
        let other = ctx.clone();

        other.cancel();
        assert!(ctx.is_done());
    }
}
