use chrono::{Duration, Utc};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use unimail_transport::oauth;

use crate::error::GmailError;
use crate::types::{OAuthClient, Token};

/// OAuth scope allowing the application to send mail only.
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// Access tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

type GoogleClient = BasicClient<
    EndpointSet,    // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

fn google_client(client: &OAuthClient) -> Result<GoogleClient, GmailError> {
    let auth_url = AuthUrl::new(client.auth_uri.clone())
        .map_err(|e| GmailError::InvalidCredentials(format!("invalid auth_uri: {e}")))?;
    let token_url = TokenUrl::new(client.token_uri.clone())
        .map_err(|e| GmailError::InvalidCredentials(format!("invalid token_uri: {e}")))?;
    let redirect_url = RedirectUrl::new(client.redirect_uri().to_owned())
        .map_err(|e| GmailError::InvalidCredentials(format!("invalid redirect_uri: {e}")))?;

    Ok(BasicClient::new(ClientId::new(client.client_id.clone()))
        .set_client_secret(ClientSecret::new(client.client_secret.clone()))
        .set_auth_type(AuthType::RequestBody)
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url))
}

/// Keeps a user token valid, refreshing it with the stored refresh token.
pub struct RefreshingTokenSource {
    client: OAuthClient,
    oauth: GoogleClient,
    token: Mutex<Token>,
}

impl std::fmt::Debug for RefreshingTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshingTokenSource")
            .field("client", &self.client)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl RefreshingTokenSource {
    pub fn new(client: OAuthClient, token: Token) -> Result<Self, GmailError> {
        Ok(Self {
            oauth: google_client(&client)?,
            client,
            token: Mutex::new(token),
        })
    }

    /// Return a usable access token, refreshing first when it is missing or
    /// about to expire.
    pub async fn access_token(&self) -> Result<String, GmailError> {
        let mut token = self.token.lock().await;
        if !needs_refresh(&token) {
            return Ok(token.access_token.clone());
        }

        let Some(refresh_token) = token.refresh_token.clone() else {
            return Err(GmailError::Unauthorized(
                "access token expired and no refresh token is available".into(),
            ));
        };

        debug!(token_uri = %self.client.token_uri, "refreshing Gmail access token");
        let response = self
            .oauth
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .request_async(&oauth::http_client)
            .await?;
        apply(&mut token, &response);
        info!(expiry = ?token.expiry, "refreshed Gmail access token");

        Ok(token.access_token.clone())
    }
}

fn needs_refresh(token: &Token) -> bool {
    if token.access_token.is_empty() {
        return true;
    }
    token
        .expiry
        .is_some_and(|expiry| expiry <= Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS))
}

fn apply(token: &mut Token, response: &BasicTokenResponse) {
    token.access_token = response.access_token().secret().clone();
    if let Some(refresh_token) = response.refresh_token() {
        token.refresh_token = Some(refresh_token.secret().clone());
    }
    token.expiry = response
        .expires_in()
        .and_then(|d| Duration::from_std(d).ok())
        .map(|lifetime| Utc::now() + lifetime);
}

/// Runs the one-time OAuth consent flow that produces a Gmail token.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn run() -> Result<(), unimail_gmail::GmailError> {
/// use unimail_gmail::GmailAuthHelper;
///
/// let credentials = std::fs::read_to_string("credentials.json").unwrap();
/// let helper = GmailAuthHelper::new(&credentials)?;
/// let token_json = helper.authenticate_interactive().await?;
/// std::fs::write("token.json", token_json).unwrap();
/// # Ok(())
/// # }
/// ```
pub struct GmailAuthHelper {
    client: OAuthClient,
    oauth: GoogleClient,
}

impl std::fmt::Debug for GmailAuthHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailAuthHelper")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl GmailAuthHelper {
    /// Create a helper from the contents of an OAuth client file.
    pub fn new(credentials_json: &str) -> Result<Self, GmailError> {
        Self::from_client(OAuthClient::from_json(credentials_json)?)
    }

    /// Create a helper from an OAuth client file on disk.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, GmailError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GmailError::io("unable to read credentials file", e))?;
        Self::new(&json)
    }

    fn from_client(client: OAuthClient) -> Result<Self, GmailError> {
        Ok(Self {
            oauth: google_client(&client)?,
            client,
        })
    }

    /// The consent URL the user has to open.
    pub fn auth_url(&self, state: &str) -> String {
        let (url, _) = self
            .oauth
            .authorize_url(|| CsrfToken::new(state.to_owned()))
            .add_scope(Scope::new(GMAIL_SEND_SCOPE.to_owned()))
            .add_extra_param("access_type", "offline")
            .url();
        url.into()
    }

    /// Swap an authorization code for a token, returned as token JSON ready
    /// for [`GmailConfig`](crate::GmailConfig).
    #[instrument(skip_all, fields(provider = "gmail"))]
    pub async fn exchange_code(&self, code: &str) -> Result<String, GmailError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(GmailError::Configuration(
                "authorization code is empty".into(),
            ));
        }

        let response = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .request_async(&oauth::http_client)
            .await?;

        let mut token = Token {
            access_token: String::new(),
            token_type: "Bearer".into(),
            refresh_token: None,
            expiry: None,
        };
        apply(&mut token, &response);
        if token.refresh_token.is_none() {
            warn!("token response carried no refresh token; the token will not renew");
        }
        info!(client_id = %self.client.client_id, "exchanged authorization code for Gmail token");
        token.to_json()
    }

    /// Print the consent URL to stderr, read the authorization code from
    /// stdin and exchange it.
    pub async fn authenticate_interactive(&self) -> Result<String, GmailError> {
        let url = self.auth_url("state-token");
        eprintln!("Go to the following link in your browser:\n{url}\n");
        eprint!("Enter the authorization code: ");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| GmailError::io("unable to read authorization code", e))?;

        self.exchange_code(&line).await
    }
}
