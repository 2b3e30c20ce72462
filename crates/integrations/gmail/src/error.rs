use oauth2::RequestTokenError;
use reqwest::{Response, StatusCode};
use thiserror::Error;
use unimail_transport::TransportError;
use unimail_transport::oauth::{self, TokenRequestError};

use crate::types::ErrorBody;

/// Errors specific to the Gmail transport.
#[derive(Debug, Error)]
pub enum GmailError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the OAuth client or the stored grant.
    #[error("authentication error: {0}")]
    Unauthorized(String),

    /// The Gmail API returned an error response.
    #[error("Gmail API error: {0}")]
    Api(String),

    /// The provider received an HTTP 429 (Too Many Requests) response.
    #[error("rate limited by the Gmail API")]
    RateLimited,

    /// A response body could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The OAuth client file could not be parsed.
    #[error("unable to parse credentials: {0}")]
    InvalidCredentials(String),

    /// The stored token could not be parsed.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// No token was supplied; the interactive consent flow has to run first.
    #[error("gmail requires initial OAuth authentication - please use the authentication helper")]
    AuthenticationRequired,

    /// Reading a credentials file or the authorization code failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The transport configuration is incomplete or invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl GmailError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<GmailError> for TransportError {
    fn from(err: GmailError) -> Self {
        match err {
            GmailError::Http(e) => TransportError::Connection(e.to_string()),
            GmailError::Unauthorized(msg) => TransportError::Authentication(msg),
            GmailError::AuthenticationRequired => {
                TransportError::Authentication(GmailError::AuthenticationRequired.to_string())
            }
            GmailError::Api(msg) => TransportError::Rejected(msg),
            GmailError::RateLimited => TransportError::RateLimited,
            GmailError::InvalidResponse(msg) => TransportError::Serialization(msg),
            e @ (GmailError::InvalidCredentials(_)
            | GmailError::InvalidToken(_)
            | GmailError::Io { .. }
            | GmailError::Configuration(_)) => TransportError::Configuration(e.to_string()),
        }
    }
}

impl From<TokenRequestError> for GmailError {
    fn from(err: TokenRequestError) -> Self {
        match err {
            // Google answers revoked or malformed grants with 400.
            RequestTokenError::ServerResponse(body) => {
                GmailError::Unauthorized(oauth::describe_error(&body))
            }
            RequestTokenError::Request(e) => GmailError::Http(e),
            RequestTokenError::Parse(e, _) => {
                GmailError::InvalidResponse(format!("token response: {e}"))
            }
            RequestTokenError::Other(msg) => {
                GmailError::InvalidResponse(format!("token response: {msg}"))
            }
        }
    }
}

/// Pass a successful response through, or turn a failed one into the
/// matching [`GmailError`].
pub(crate) async fn error_for_status(response: Response) -> Result<Response, GmailError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.describe())
        .unwrap_or(text);

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => GmailError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GmailError::Unauthorized(format!("HTTP {status}: {detail}"))
        }
        _ => GmailError::Api(format!("HTTP {status}: {detail}")),
    })
}
