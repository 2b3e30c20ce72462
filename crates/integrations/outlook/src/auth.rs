use chrono::{DateTime, Duration, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, Scope, TokenResponse, TokenUrl,
};
use tokio::sync::Mutex;
use tracing::{debug, info};
use unimail_transport::oauth;

use crate::config::OutlookConfig;
use crate::error::OutlookError;

/// Scope requesting every application permission granted on Graph.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Tokens are renewed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

type TokenClient = BasicClient<
    EndpointNotSet, // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Acquires and caches Graph access tokens with the OAuth2
/// client-credentials grant.
pub struct ClientCredentialsTokenSource {
    token_url: String,
    client_id: String,
    client: TokenClient,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ClientCredentialsTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsTokenSource")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ClientCredentialsTokenSource {
    /// Create a token source for the application in `config`.
    pub fn new(config: &OutlookConfig) -> Result<Self, OutlookError> {
        let token_url = config.token_url();
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(TokenUrl::new(token_url.clone()).map_err(|e| {
                OutlookError::Configuration(format!("invalid token URL {token_url}: {e}"))
            })?);

        Ok(Self {
            token_url,
            client_id: config.client_id.clone(),
            client,
            scope: GRAPH_DEFAULT_SCOPE.to_owned(),
            cached: Mutex::new(None),
        })
    }

    /// Return a valid access token, requesting a new one when the cached
    /// token is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, OutlookError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            debug!("using cached Graph access token");
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken, OutlookError> {
        debug!(token_url = %self.token_url, "requesting Graph access token");

        let response = self
            .client
            .exchange_client_credentials()
            .add_scope(Scope::new(self.scope.clone()))
            .request_async(&oauth::http_client)
            .await?;

        let lifetime = response
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .unwrap_or_else(|| Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));
        info!(expires_in = lifetime.num_seconds(), "acquired Graph access token");

        Ok(CachedToken {
            access_token: response.access_token().secret().clone(),
            expires_at: Utc::now() + lifetime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unimail_testing::MockServer;

    fn config_for(server: &MockServer) -> OutlookConfig {
        OutlookConfig::new("tenant-1", "client-1", "secret-1").with_authority_url(&server.base_url)
    }

    #[test]
    fn freshness_respects_margin() {
        let now = Utc::now();
        let token = CachedToken {
            access_token: "t".into(),
            expires_at: now + Duration::seconds(30),
        };
        assert!(!token.is_fresh(now));

        let token = CachedToken {
            access_token: "t".into(),
            expires_at: now + Duration::seconds(600),
        };
        assert!(token.is_fresh(now));
    }

    #[test]
    fn debug_redacts_secret() {
        let source =
            ClientCredentialsTokenSource::new(&OutlookConfig::new("t", "c", "hidden-value"))
                .unwrap();
        let debug = format!("{source:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hidden-value"));
    }

    #[tokio::test]
    async fn requests_token_with_client_credentials_and_caches_it() {
        let server = MockServer::start().await;
        let source = ClientCredentialsTokenSource::new(&config_for(&server)).unwrap();

        let handle = tokio::spawn(server.respond(vec![(
            200,
            r#"{"access_token":"graph-token","expires_in":3599,"token_type":"Bearer"}"#.into(),
        )]));

        let first = source.access_token().await.unwrap();
        let second = source.access_token().await.unwrap();
        let requests = handle.await.unwrap();

        assert_eq!(first, "graph-token");
        assert_eq!(second, "graph-token");
        assert_eq!(requests.len(), 1, "second call must hit the cache");

        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/tenant-1/oauth2/v2.0/token");
        let form = request.form();
        assert_eq!(form["grant_type"], "client_credentials");
        assert_eq!(form["client_id"], "client-1");
        assert_eq!(form["client_secret"], "secret-1");
        assert_eq!(form["scope"], GRAPH_DEFAULT_SCOPE);
        assert!(request.header("authorization").is_none());
    }

    #[tokio::test]
    async fn missing_expiry_uses_default_lifetime() {
        let server = MockServer::start().await;
        let source = ClientCredentialsTokenSource::new(&config_for(&server)).unwrap();

        let handle = tokio::spawn(server.respond(vec![(
            200,
            r#"{"access_token":"graph-token","token_type":"Bearer"}"#.into(),
        )]));
        source.access_token().await.unwrap();
        handle.await.unwrap();

        let cached = source.cached.lock().await.clone().unwrap();
        let lifetime = cached.expires_at - Utc::now();
        assert!(lifetime > Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS - 10));
        assert!(lifetime <= Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));
    }

    #[test]
    fn invalid_authority_is_a_configuration_error() {
        let config = OutlookConfig::new("t", "c", "s").with_authority_url("not a url");
        let err = ClientCredentialsTokenSource::new(&config).unwrap_err();
        assert!(matches!(err, OutlookError::Configuration(_)));
    }

    #[tokio::test]
    async fn invalid_client_maps_to_unauthorized() {
        let server = MockServer::start().await;
        let source = ClientCredentialsTokenSource::new(&config_for(&server)).unwrap();

        let handle = tokio::spawn(server.respond(vec![(
            400,
            r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret provided."}"#.into(),
        )]));

        let err = source.access_token().await.unwrap_err();
        handle.await.unwrap();

        match err {
            OutlookError::Unauthorized(msg) => assert!(msg.contains("AADSTS7000215")),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_token_response_is_invalid_response() {
        let server = MockServer::start().await;
        let source = ClientCredentialsTokenSource::new(&config_for(&server)).unwrap();

        let handle = tokio::spawn(server.respond(vec![(200, r#"{"unexpected":true}"#.into())]));

        let err = source.access_token().await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, OutlookError::InvalidResponse(_)));
    }
}
