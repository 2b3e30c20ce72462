use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GmailError;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Redirect used when the client file lists none.
pub const FALLBACK_REDIRECT_URI: &str = "http://localhost";

/// Google's OAuth client file, as downloaded from the Cloud Console.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<OAuthClient>,
    web: Option<OAuthClient>,
}

/// An OAuth client registration (`installed` or `web` section).
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_owned()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("redirect_uris", &self.redirect_uris)
            .finish()
    }
}

impl OAuthClient {
    /// Parse a client file with either an `installed` or a `web` section.
    pub fn from_json(json: &str) -> Result<Self, GmailError> {
        let file: ClientSecretFile =
            serde_json::from_str(json).map_err(|e| GmailError::InvalidCredentials(e.to_string()))?;
        file.installed.or(file.web).ok_or_else(|| {
            GmailError::InvalidCredentials(
                "expected an \"installed\" or \"web\" client section".into(),
            )
        })
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map_or(FALLBACK_REDIRECT_URI, String::as_str)
    }
}

/// A stored OAuth token, compatible with the common `token.json` layout.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_owned()
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl Token {
    pub fn from_json(json: &str) -> Result<Self, GmailError> {
        serde_json::from_str(json).map_err(|e| GmailError::InvalidToken(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, GmailError> {
        serde_json::to_string_pretty(self).map_err(|e| GmailError::InvalidToken(e.to_string()))
    }
}

/// Body of `POST /gmail/v1/users/me/messages/send`.
#[derive(Debug, Serialize)]
pub struct SendRequest {
    pub raw: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Error envelope used by Google APIs and the OAuth endpoints.
///
/// REST APIs nest `{code, message, status}` under `error`; the token
/// endpoint uses flat `error` / `error_description` fields.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorBody {
    pub fn describe(&self) -> Option<String> {
        if let Some(description) = &self.error_description {
            return Some(description.clone());
        }
        match self.error.as_ref()? {
            serde_json::Value::String(code) => Some(code.clone()),
            serde_json::Value::Object(fields) => {
                let status = fields.get("status").and_then(serde_json::Value::as_str);
                let message = fields.get("message").and_then(serde_json::Value::as_str);
                match (status, message) {
                    (Some(status), Some(message)) => Some(format!("{status}: {message}")),
                    (Some(text), None) | (None, Some(text)) => Some(text.to_owned()),
                    (None, None) => None,
                }
            }
            _ => None,
        }
    }
}
