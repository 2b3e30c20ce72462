use std::path::PathBuf;

use thiserror::Error;
use unimail_core::ValidationError;
use unimail_transport::TransportError;

/// Errors raised while building a [`Client`](crate::Client) from
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The provider selector names no known provider.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The selected provider has no configuration section.
    #[error("{0} configuration is required")]
    MissingProviderConfig(&'static str),

    /// A configuration section was supplied for a provider that is not
    /// selected.
    #[error("{selected} is selected but {other} configuration was also supplied")]
    ConflictingProviderConfig {
        selected: &'static str,
        other: &'static str,
    },

    /// One-shot credentials do not belong to the named provider.
    #[error("invalid credentials for {0}")]
    CredentialMismatch(String),

    /// A required environment variable is unset or empty.
    #[error("{0} is required")]
    MissingEnv(&'static str),

    /// A configuration or credentials file could not be read.
    #[error("failed to read {what} file {}: {source}", path.display())]
    ReadFile {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML or has the wrong shape.
    #[error("invalid configuration file: {0}")]
    Parse(String),

    /// The transport rejected its configuration.
    #[error("failed to create provider: {0}")]
    ProviderInit(#[source] TransportError),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, Error)]
pub enum EmailError {
    /// The client could not be built.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The message failed validation; the transport was not called.
    #[error("invalid message: {0}")]
    Validation(#[from] ValidationError),

    /// The transport failed to deliver the message.
    #[error("unable to send message: {0}")]
    Transport(#[from] TransportError),
}

impl EmailError {
    /// The underlying transport error, if the failure happened in flight.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if resending the same message may succeed.
    pub fn is_retryable(&self) -> bool {
        self.transport_error()
            .is_some_and(TransportError::is_retryable)
    }
}
