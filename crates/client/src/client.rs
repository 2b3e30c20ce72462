use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use unimail_core::Message;
use unimail_gmail::GmailTransport;
use unimail_outlook::OutlookTransport;
use unimail_transport::{SendContext, SendReceipt, Transport, TransportError};

use crate::config::{EmailConfig, ProviderConfig};
use crate::error::{ConfigError, EmailError};

/// Deadline applied by [`Client::send`].
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends validated messages through one bound [`Transport`].
///
/// Cloning is cheap; clones share the transport and its token cache.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn run() -> Result<(), unimail::EmailError> {
/// use unimail::{Client, EmailConfig, Message, OutlookConfig};
///
/// let config = EmailConfig::outlook(OutlookConfig::new("tenant", "client", "secret"));
/// let client = Client::new(&config)?;
///
/// let message = Message::new("sender@contoso.com", "alice@example.com", "Hello", "Hi Alice");
/// client.send(&message).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Build a client for the provider selected in `config`.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let provider = config.resolve()?;
        Self::from_provider(provider)
    }

    /// Build a client from a resolved provider configuration.
    pub fn from_provider(provider: ProviderConfig) -> Result<Self, EmailError> {
        let transport: Arc<dyn Transport> = match provider {
            ProviderConfig::Outlook(config) => Arc::new(
                OutlookTransport::new(config)
                    .map_err(|e| ConfigError::ProviderInit(TransportError::from(e)))?,
            ),
            ProviderConfig::Gmail(config) => Arc::new(
                GmailTransport::new(config)
                    .map_err(|e| ConfigError::ProviderInit(TransportError::from(e)))?,
            ),
        };
        debug!(provider = transport.name(), "email client ready");
        Ok(Self { transport })
    }

    /// Bind an arbitrary transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Name of the bound transport.
    pub fn provider(&self) -> &'static str {
        self.transport.name()
    }

    /// Send with the [`DEFAULT_SEND_TIMEOUT`] deadline.
    pub async fn send(&self, message: &Message) -> Result<SendReceipt, EmailError> {
        self.send_with_context(message, &SendContext::with_timeout(DEFAULT_SEND_TIMEOUT))
            .await
    }

    /// Send, giving up at `deadline`.
    pub async fn send_with_deadline(
        &self,
        message: &Message,
        deadline: Instant,
    ) -> Result<SendReceipt, EmailError> {
        self.send_with_context(message, &SendContext::with_deadline(deadline))
            .await
    }

    /// Send with a caller-supplied deadline and cancellation token.
    ///
    /// The message is validated first; an invalid message never reaches the
    /// transport. The context is passed to the transport unchanged.
    #[instrument(skip_all, fields(provider = self.transport.name()))]
    pub async fn send_with_context(
        &self,
        message: &Message,
        ctx: &SendContext,
    ) -> Result<SendReceipt, EmailError> {
        message.validate()?;

        debug!(
            to = message.to.len(),
            cc = message.cc.len(),
            bcc = message.bcc.len(),
            attachments = message.attachments.len(),
            "sending message"
        );

        self.transport.send(ctx, message).await.map_err(|err| {
            warn!(error = %err, "send failed");
            EmailError::Transport(err)
        })
    }
}
