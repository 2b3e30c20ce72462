use serde::{Deserialize, Serialize};

use crate::error::OutlookError;

/// Default Microsoft identity platform authority.
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";

/// Default Microsoft Graph endpoint.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com";

/// Configuration for the Outlook 365 transport.
///
/// Authenticates as an Azure AD application (client-credentials grant). The
/// application needs the `Mail.Send` application permission, and every
/// message's `from` address must be a mailbox it may send as.
///
/// # Examples
///
/// ```
/// use unimail_outlook::OutlookConfig;
///
/// let config = OutlookConfig::new("tenant", "client", "s3cr3t-value");
/// assert!(config.save_to_sent_items);
/// assert!(!format!("{config:?}").contains("s3cr3t-value"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlookConfig {
    /// Azure AD tenant ID.
    pub tenant_id: String,

    /// Azure AD application (client) ID.
    pub client_id: String,

    /// Azure AD application client secret.
    pub client_secret: String,

    /// Identity platform authority. Overridable for sovereign clouds and
    /// tests.
    #[serde(default = "default_authority_url")]
    pub authority_url: String,

    /// Microsoft Graph base URL.
    #[serde(default = "default_graph_url")]
    pub graph_url: String,

    /// Whether Graph keeps a copy in the sender's Sent Items folder.
    #[serde(default = "default_save_to_sent_items")]
    pub save_to_sent_items: bool,
}

fn default_authority_url() -> String {
    DEFAULT_AUTHORITY_URL.to_owned()
}

fn default_graph_url() -> String {
    DEFAULT_GRAPH_URL.to_owned()
}

fn default_save_to_sent_items() -> bool {
    true
}

impl std::fmt::Debug for OutlookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlookConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("authority_url", &self.authority_url)
            .field("graph_url", &self.graph_url)
            .field("save_to_sent_items", &self.save_to_sent_items)
            .finish()
    }
}

impl OutlookConfig {
    /// Create a configuration for the given application credentials.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_url: default_authority_url(),
            graph_url: default_graph_url(),
            save_to_sent_items: true,
        }
    }

    /// Override the identity platform authority.
    #[must_use]
    pub fn with_authority_url(mut self, url: impl Into<String>) -> Self {
        self.authority_url = url.into();
        self
    }

    /// Override the Microsoft Graph base URL.
    #[must_use]
    pub fn with_graph_url(mut self, url: impl Into<String>) -> Self {
        self.graph_url = url.into();
        self
    }

    /// Control whether sent mail is saved to Sent Items.
    #[must_use]
    pub fn with_save_to_sent_items(mut self, save: bool) -> Self {
        self.save_to_sent_items = save;
        self
    }

    /// OAuth2 token endpoint for this tenant.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Check that every credential field is set.
    pub fn validate(&self) -> Result<(), OutlookError> {
        if self.tenant_id.is_empty() {
            return Err(OutlookError::Configuration("tenant_id is required".into()));
        }
        if self.client_id.is_empty() {
            return Err(OutlookError::Configuration("client_id is required".into()));
        }
        if self.client_secret.is_empty() {
            return Err(OutlookError::Configuration(
                "client_secret is required".into(),
            ));
        }
        Ok(())
    }
}
