use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

/// Deadline and cancellation signal for one send.
///
/// The client facade builds a context per call and passes it to the
/// transport untouched. Transports wrap their network calls in
/// [`run`](Self::run) so that an elapsed deadline or a cancelled token ends
/// the call with [`TransportError::Timeout`] or [`TransportError::Cancelled`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use unimail_transport::SendContext;
///
/// let ctx = SendContext::with_timeout(Duration::from_secs(30));
/// assert!(ctx.remaining().unwrap() <= Duration::from_secs(30));
/// assert!(!ctx.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct SendContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl Default for SendContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SendContext {
    /// A context with no deadline and a fresh cancellation token.
    pub fn new() -> Self {
        Self {
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancellation: CancellationToken::new(),
        }
    }

    /// Use the given token for cancellation.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, or `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline has already passed.
    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| deadline <= Instant::now())
    }

    /// Whether the cancellation token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// The token observed by [`run`](Self::run).
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Drive `future` to completion unless the deadline passes or the
    /// context is cancelled first.
    pub async fn run<F, T>(&self, future: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        let budget = self.remaining().unwrap_or_default();
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, future)
                    .await
                    .unwrap_or_else(|_| Err(TransportError::Timeout(budget))),
                None => future.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(TransportError::Cancelled),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_no_deadline() {
        let ctx = SendContext::new();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_expired());
    }

    #[tokio::test]
    async fn timeout_sets_deadline_in_the_future() {
        let ctx = SendContext::with_timeout(Duration::from_secs(30));
        let remaining = ctx.remaining().unwrap();
        assert!(remaining <= Duration::from_secs(30));
        assert!(remaining > Duration::from_secs(29));
        assert!(!ctx.is_expired());
    }

    #[tokio::test]
    async fn run_returns_inner_result() {
        let ctx = SendContext::with_timeout(Duration::from_secs(5));
        let value = ctx.run(async { Ok::<_, TransportError>(42) }).await.unwrap();
        assert_eq!(value, 42);

        let err = ctx
            .run(async { Err::<(), _>(TransportError::RateLimited) })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::RateLimited));
    }

    #[tokio::test]
    async fn run_times_out() {
        let ctx = SendContext::with_timeout(Duration::from_millis(20));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, TransportError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
        assert!(ctx.is_expired());
    }

    #[tokio::test]
    async fn run_observes_cancellation() {
        let token = CancellationToken::new();
        let ctx = SendContext::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let err = ctx
            .run(std::future::pending::<Result<(), TransportError>>())
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, TransportError::Cancelled));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled_context_fails_fast() {
        let ctx = SendContext::with_timeout(Duration::from_secs(5));
        ctx.cancellation_token().cancel();
        let err = ctx
            .run(async { Ok::<_, TransportError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
    }
}
