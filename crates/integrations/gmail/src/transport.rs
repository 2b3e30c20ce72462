use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use reqwest::Client;
use tracing::{debug, info, instrument};
use unimail_core::{Message, mime};
use unimail_transport::{SendContext, SendReceipt, Transport, TransportError};

use crate::auth::RefreshingTokenSource;
use crate::config::GmailConfig;
use crate::error::{GmailError, error_for_status};
use crate::types::{SendRequest, SendResponse};

/// Provider name reported in receipts and logs.
pub const PROVIDER_NAME: &str = "gmail";

/// Sends mail through `users.messages.send` as the authorizing user.
#[derive(Debug)]
pub struct GmailTransport {
    api_url: String,
    client: Client,
    tokens: RefreshingTokenSource,
}

impl GmailTransport {
    /// Create a transport, parsing the client file and stored token.
    pub fn new(config: GmailConfig) -> Result<Self, GmailError> {
        let client = Client::builder()
            .user_agent(concat!("unimail/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(config, client)
    }

    /// Create a transport that issues requests with a custom HTTP client.
    pub fn with_client(config: GmailConfig, client: Client) -> Result<Self, GmailError> {
        let oauth_client = config.client()?;
        let token = config.token()?;
        Ok(Self {
            api_url: config.api_url,
            client,
            tokens: RefreshingTokenSource::new(oauth_client, token)?,
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/gmail/v1/users/me/messages/send",
            self.api_url.trim_end_matches('/')
        )
    }

    async fn deliver(&self, message: &Message) -> Result<SendReceipt, GmailError> {
        let token = self.tokens.access_token().await?;

        let encoded = mime::encode(message);
        debug!(
            bytes = encoded.len(),
            attachments = message.attachments.len(),
            "posting raw message to Gmail"
        );
        let body = SendRequest {
            raw: URL_SAFE.encode(encoded.as_bytes()),
        };

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| GmailError::InvalidResponse(format!("send response: {e}")))?;

        info!(message_id = ?sent.id, thread_id = ?sent.thread_id, "Gmail accepted message");
        let receipt = SendReceipt::new(PROVIDER_NAME);
        Ok(match sent.id {
            Some(id) => receipt.with_message_id(id),
            None => receipt,
        })
    }
}

#[async_trait]
impl Transport for GmailTransport {
    #[instrument(skip(self, ctx, message), fields(provider = PROVIDER_NAME))]
    async fn send(
        &self,
        ctx: &SendContext,
        message: &Message,
    ) -> Result<SendReceipt, TransportError> {
        ctx.run(async { self.deliver(message).await.map_err(TransportError::from) })
            .await
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
