use std::path::PathBuf;

use unimail_outlook::OutlookConfig;

use crate::client::Client;
use crate::config::{
    DEFAULT_PROVIDER, EmailConfig, ProviderKind, default_token_file, read_gmail_files,
};
use crate::error::{ConfigError, EmailError};

pub const EMAIL_PROVIDER: &str = "EMAIL_PROVIDER";
pub const OUTLOOK_TENANT_ID: &str = "OUTLOOK_TENANT_ID";
pub const OUTLOOK_CLIENT_ID: &str = "OUTLOOK_CLIENT_ID";
pub const OUTLOOK_CLIENT_SECRET: &str = "OUTLOOK_CLIENT_SECRET";
pub const GMAIL_CREDENTIALS_FILE: &str = "GMAIL_CREDENTIALS_FILE";
pub const GMAIL_TOKEN_FILE: &str = "GMAIL_TOKEN_FILE";

/// Build an [`EmailConfig`] from the process environment.
///
/// | Variable | Meaning |
/// |---|---|
/// | `EMAIL_PROVIDER` | `outlook365` (default) or `gmail` |
/// | `OUTLOOK_TENANT_ID`, `OUTLOOK_CLIENT_ID`, `OUTLOOK_CLIENT_SECRET` | Outlook application credentials |
/// | `GMAIL_CREDENTIALS_FILE` | path to the OAuth client file |
/// | `GMAIL_TOKEN_FILE` | path to the stored token (default `token.json`) |
///
/// Empty variables count as unset.
pub fn config_from_env() -> Result<EmailConfig, ConfigError> {
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Like [`config_from_env`], reading variables through `lookup`.
pub fn config_from_lookup<F>(lookup: F) -> Result<EmailConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
    let require = |key: &'static str| get(key).ok_or(ConfigError::MissingEnv(key));

    let provider = get(EMAIL_PROVIDER).unwrap_or_else(|| DEFAULT_PROVIDER.to_owned());

    match provider.parse::<ProviderKind>()? {
        ProviderKind::Outlook365 => {
            let config = OutlookConfig::new(
                require(OUTLOOK_TENANT_ID)?,
                require(OUTLOOK_CLIENT_ID)?,
                require(OUTLOOK_CLIENT_SECRET)?,
            );
            Ok(EmailConfig::outlook(config))
        }
        ProviderKind::Gmail => {
            let credentials = PathBuf::from(require(GMAIL_CREDENTIALS_FILE)?);
            let token = get(GMAIL_TOKEN_FILE).map_or_else(default_token_file, PathBuf::from);
            Ok(EmailConfig::gmail(read_gmail_files(&credentials, &token)?))
        }
    }
}

/// [`config_from_env`] followed by [`Client::new`].
pub fn client_from_env() -> Result<Client, EmailError> {
    let config = config_from_env()?;
    Client::new(&config)
}
