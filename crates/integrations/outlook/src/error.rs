use oauth2::RequestTokenError;
use reqwest::{Response, StatusCode};
use thiserror::Error;
use unimail_transport::TransportError;
use unimail_transport::oauth::{self, TokenRequestError};

use crate::types::ErrorBody;

/// Errors specific to the Outlook 365 transport.
///
/// These are internal errors that get converted into [`TransportError`] at
/// the public API boundary.
#[derive(Debug, Error)]
pub enum OutlookError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint or Graph rejected the application's credentials.
    #[error("authentication error: {0}")]
    Unauthorized(String),

    /// Microsoft Graph returned an error response.
    #[error("Graph API error: {0}")]
    Api(String),

    /// The provider received an HTTP 429 (Too Many Requests) response.
    #[error("rate limited by Microsoft Graph")]
    RateLimited,

    /// A response body could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The transport configuration is incomplete or invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<OutlookError> for TransportError {
    fn from(err: OutlookError) -> Self {
        match err {
            OutlookError::Http(e) => TransportError::Connection(e.to_string()),
            OutlookError::Unauthorized(msg) => TransportError::Authentication(msg),
            OutlookError::Api(msg) => TransportError::Rejected(msg),
            OutlookError::RateLimited => TransportError::RateLimited,
            OutlookError::InvalidResponse(msg) => TransportError::Serialization(msg),
            OutlookError::Configuration(msg) => TransportError::Configuration(msg),
        }
    }
}

impl From<TokenRequestError> for OutlookError {
    fn from(err: TokenRequestError) -> Self {
        match err {
            // The identity platform answers bad credentials with 400/401.
            RequestTokenError::ServerResponse(body) => {
                OutlookError::Unauthorized(oauth::describe_error(&body))
            }
            RequestTokenError::Request(e) => OutlookError::Http(e),
            RequestTokenError::Parse(e, _) => {
                OutlookError::InvalidResponse(format!("token response: {e}"))
            }
            RequestTokenError::Other(msg) => {
                OutlookError::InvalidResponse(format!("token response: {msg}"))
            }
        }
    }
}

/// Pass a successful response through, or turn a failed one into the
/// matching [`OutlookError`].
pub(crate) async fn error_for_status(response: Response) -> Result<Response, OutlookError> {
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
        StatusCode::TOO_MANY_REQUESTS => OutlookError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            OutlookError::Unauthorized(format!("HTTP {status}: {detail}"))
        }
        _ => OutlookError::Api(format!("HTTP {status}: {detail}")),
    })
}
