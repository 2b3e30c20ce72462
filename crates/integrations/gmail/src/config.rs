use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GmailError;
use crate::types::{OAuthClient, Token};

/// Default Gmail API endpoint.
pub const DEFAULT_API_URL: &str = "https://gmail.googleapis.com";

/// Configuration for the Gmail transport.
///
/// Holds Google's OAuth client file and a previously obtained token as raw
/// JSON documents. Mail is sent as the account that granted the token, so
/// the `gmail.send` scope must have been consented to (see
/// [`GmailAuthHelper`](crate::GmailAuthHelper)).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmailConfig {
    /// Contents of the OAuth client file (`credentials.json`).
    pub credentials_json: String,

    /// Contents of the stored token (`token.json`).
    #[serde(default)]
    pub token_json: String,

    /// Gmail API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

impl std::fmt::Debug for GmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailConfig")
            .field("credentials_json", &"[REDACTED]")
            .field("token_json", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl GmailConfig {
    pub fn new(credentials_json: impl Into<String>, token_json: impl Into<String>) -> Self {
        Self {
            credentials_json: credentials_json.into(),
            token_json: token_json.into(),
            api_url: default_api_url(),
        }
    }

    /// Read both documents from disk.
    pub fn from_files(
        credentials_path: impl AsRef<Path>,
        token_path: impl AsRef<Path>,
    ) -> Result<Self, GmailError> {
        let credentials_json = std::fs::read_to_string(credentials_path.as_ref())
            .map_err(|e| GmailError::io("unable to read credentials file", e))?;
        let token_json = std::fs::read_to_string(token_path.as_ref())
            .map_err(|e| GmailError::io("unable to read token file", e))?;
        Ok(Self::new(credentials_json, token_json))
    }

    /// Override the Gmail API base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Parse the OAuth client file.
    pub fn client(&self) -> Result<OAuthClient, GmailError> {
        OAuthClient::from_json(&self.credentials_json)
    }

    /// Parse the stored token. An empty document means the consent flow has
    /// not run yet.
    pub fn token(&self) -> Result<Token, GmailError> {
        if self.token_json.trim().is_empty() {
            return Err(GmailError::AuthenticationRequired);
        }
        Token::from_json(&self.token_json)
    }
}
