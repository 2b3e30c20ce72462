use async_trait::async_trait;
use unimail_core::Message;

use crate::context::SendContext;
use crate::error::TransportError;

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Name of the transport that delivered the message (e.g. `"gmail"`).
    pub provider: &'static str,
    /// Provider-assigned message identifier, when the API returns one.
    pub message_id: Option<String>,
}

impl SendReceipt {
    /// A receipt without a message identifier.
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            message_id: None,
        }
    }

    /// Attach the provider's message identifier.
    #[must_use]
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}

/// A provider that can deliver a validated [`Message`].
///
/// Implementations perform the network call for one email API. The message
/// has already passed [`Message::validate`] when `send` is called. The
/// context carries the caller's deadline and cancellation token; wrap the
/// network work in [`SendContext::run`] so both are honoured.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Deliver `message`.
    async fn send(
        &self,
        ctx: &SendContext,
        message: &Message,
    ) -> Result<SendReceipt, TransportError>;

    /// Short provider name (e.g. `"outlook365"`, `"gmail"`).
    fn name(&self) -> &'static str;
}
