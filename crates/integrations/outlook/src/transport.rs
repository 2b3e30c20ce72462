use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use tracing::{debug, info, instrument};
use unimail_core::Message;
use unimail_transport::{SendContext, SendReceipt, Transport, TransportError};

use crate::auth::ClientCredentialsTokenSource;
use crate::config::OutlookConfig;
use crate::error::{OutlookError, error_for_status};
use crate::types::SendMailRequest;

/// Provider name reported in receipts and logs.
pub const PROVIDER_NAME: &str = "outlook365";

/// Characters escaped in the `/users/{id}` path segment.
const USER_ID_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@');

/// Sends mail through the Microsoft Graph `sendMail` action.
///
/// The message is sent from the mailbox named by its `from` address, using
/// an application token acquired with the client-credentials grant.
#[derive(Debug)]
pub struct OutlookTransport {
    config: OutlookConfig,
    client: Client,
    tokens: ClientCredentialsTokenSource,
}

impl OutlookTransport {
    /// Create a transport after validating `config`.
    pub fn new(config: OutlookConfig) -> Result<Self, OutlookError> {
        let client = Client::builder()
            .user_agent(concat!("unimail/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(config, client)
    }

    /// Create a transport that issues requests with a custom HTTP client.
    pub fn with_client(config: OutlookConfig, client: Client) -> Result<Self, OutlookError> {
        config.validate()?;
        let tokens = ClientCredentialsTokenSource::new(&config)?;
        Ok(Self {
            config,
            client,
            tokens,
        })
    }

    /// The configuration this transport was built from.
    pub fn config(&self) -> &OutlookConfig {
        &self.config
    }

    fn send_mail_url(&self, from: &str) -> String {
        format!(
            "{}/v1.0/users/{}/sendMail",
            self.config.graph_url.trim_end_matches('/'),
            utf8_percent_encode(from, USER_ID_ENCODE_SET)
        )
    }

    async fn deliver(&self, message: &Message) -> Result<SendReceipt, OutlookError> {
        let token = self.tokens.access_token().await?;
        let body = SendMailRequest::from_message(message, self.config.save_to_sent_items);

        debug!(
            recipients = message.to.len() + message.cc.len() + message.bcc.len(),
            attachments = message.attachments.len(),
            "posting sendMail request to Graph"
        );

        let response = self
            .client
            .post(self.send_mail_url(&message.from))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let response = error_for_status(response).await?;

        // Graph answers 202 Accepted with an empty body; no message id is
        // exposed for sendMail.
        info!(status = %response.status(), "Graph accepted message");
        Ok(SendReceipt::new(PROVIDER_NAME))
    }
}

#[async_trait]
impl Transport for OutlookTransport {
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
