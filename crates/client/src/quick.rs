use tracing::debug;
use unimail_core::Message;
use unimail_transport::SendReceipt;

use crate::client::Client;
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{ConfigError, EmailError};

/// Credentials accepted by the one-shot senders.
pub type Credentials = ProviderConfig;

impl ProviderConfig {
    /// Build a client for these credentials and send one plain-text message
    /// with the default deadline.
    pub async fn send(
        self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendReceipt, EmailError> {
        let client = Client::from_provider(self)?;
        client.send(&Message::new(from, to, subject, body)).await
    }
}

/// Send one plain-text message without keeping a client around.
///
/// `provider` must name the provider the credentials belong to; Outlook
/// credentials passed with `"gmail"` are rejected, not reinterpreted.
///
/// ```rust,no_run
/// # async fn run() -> Result<(), unimail::EmailError> {
/// use unimail::{Credentials, OutlookConfig, quick_send};
///
/// quick_send(
///     "outlook365",
///     Credentials::Outlook(OutlookConfig::new("tenant", "client", "secret")),
///     "sender@contoso.com",
///     "alice@example.com",
///     "Hello",
///     "Sent with unimail",
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn quick_send(
    provider: &str,
    credentials: Credentials,
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<SendReceipt, EmailError> {
    let kind: ProviderKind = provider.parse()?;
    if credentials.kind() != kind {
        return Err(ConfigError::CredentialMismatch(kind.as_str().to_owned()).into());
    }
    debug!(provider = kind.as_str(), "quick send");
    credentials.send(from, to, subject, body).await
}
