use std::time::Duration;

use thiserror::Error;

/// Errors reported by a [`Transport`](crate::Transport).
///
/// Provider crates map their HTTP and auth failures onto these variants.
/// The client facade forwards them unchanged.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Credentials were rejected or a token could not be obtained.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The provider rejected the request due to rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider answered with a non-success response.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The send deadline passed before the provider responded.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the send while it was in flight.
    #[error("send cancelled")]
    Cancelled,

    /// The transport was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A request or response body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Returns `true` if the error is transient and the send may succeed on
    /// retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited
        )
    }

    /// Returns `true` if the send ended because its deadline elapsed or it
    /// was cancelled.
    pub fn is_deadline(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(TransportError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(TransportError::Connection("reset".into()).is_retryable());
        assert!(TransportError::RateLimited.is_retryable());
    }

    #[test]
    fn non_retryable_errors() {
        assert!(!TransportError::Authentication("x".into()).is_retryable());
        assert!(!TransportError::Rejected("x".into()).is_retryable());
        assert!(!TransportError::Cancelled.is_retryable());
        assert!(!TransportError::Configuration("x".into()).is_retryable());
        assert!(!TransportError::Serialization("x".into()).is_retryable());
    }

    #[test]
    fn deadline_errors() {
        assert!(TransportError::Timeout(Duration::from_secs(1)).is_deadline());
        assert!(TransportError::Cancelled.is_deadline());
        assert!(!TransportError::RateLimited.is_deadline());
    }

    #[test]
    fn error_display() {
        let err = TransportError::Timeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "timeout after 500ms");

        let err = TransportError::Rejected("HTTP 400: bad".into());
        assert_eq!(err.to_string(), "request rejected: HTTP 400: bad");

        assert_eq!(TransportError::Cancelled.to_string(), "send cancelled");
    }
}
