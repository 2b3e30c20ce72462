use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unimail_gmail::GmailConfig;
use unimail_outlook::OutlookConfig;

use crate::error::ConfigError;

/// Provider selected when none is configured.
pub const DEFAULT_PROVIDER: &str = "outlook365";

/// The email providers unimail can send through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Microsoft 365 mailboxes through Microsoft Graph.
    Outlook365,
    /// Gmail accounts through the Gmail API.
    Gmail,
}

impl ProviderKind {
    /// The selector string (`"outlook365"` or `"gmail"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outlook365 => "outlook365",
            Self::Gmail => "gmail",
        }
    }

    /// Name of the matching configuration section.
    pub fn section(self) -> &'static str {
        match self {
            Self::Outlook365 => "outlook",
            Self::Gmail => "gmail",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outlook365" => Ok(Self::Outlook365),
            "gmail" => Ok(Self::Gmail),
            other => Err(ConfigError::UnsupportedProvider(other.to_owned())),
        }
    }
}

/// Credentials for exactly one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    Outlook(OutlookConfig),
    Gmail(GmailConfig),
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Outlook(_) => ProviderKind::Outlook365,
            Self::Gmail(_) => ProviderKind::Gmail,
        }
    }
}

impl From<OutlookConfig> for ProviderConfig {
    fn from(config: OutlookConfig) -> Self {
        Self::Outlook(config)
    }
}

impl From<GmailConfig> for ProviderConfig {
    fn from(config: GmailConfig) -> Self {
        Self::Gmail(config)
    }
}

/// Client configuration: a provider selector plus per-provider sections.
///
/// Exactly the section matching `provider` must be present.
///
/// ```toml
/// provider = "outlook365"
///
/// [outlook]
/// tenant_id = "..."
/// client_id = "..."
/// client_secret = "..."
/// ```
///
/// In a TOML file the Gmail section may reference files instead of
/// embedding the JSON documents:
///
/// ```toml
/// provider = "gmail"
///
/// [gmail]
/// credentials_file = "credentials.json"
/// token_file = "token.json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Provider selector: `"outlook365"` or `"gmail"`.
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlook: Option<OutlookConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmail: Option<GmailConfig>,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_owned()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            outlook: None,
            gmail: None,
        }
    }
}

impl From<ProviderConfig> for EmailConfig {
    fn from(provider: ProviderConfig) -> Self {
        let selector = provider.kind().as_str().to_owned();
        match provider {
            ProviderConfig::Outlook(outlook) => Self {
                provider: selector,
                outlook: Some(outlook),
                gmail: None,
            },
            ProviderConfig::Gmail(gmail) => Self {
                provider: selector,
                outlook: None,
                gmail: Some(gmail),
            },
        }
    }
}

impl EmailConfig {
    /// Select Outlook 365 with the given credentials.
    pub fn outlook(config: OutlookConfig) -> Self {
        ProviderConfig::Outlook(config).into()
    }

    /// Select Gmail with the given credentials.
    pub fn gmail(config: GmailConfig) -> Self {
        ProviderConfig::Gmail(config).into()
    }

    /// Resolve the selector into the matching provider section.
    ///
    /// The selector is checked first, then the selected section must be
    /// present, and only then is a section for the other provider rejected.
    pub fn resolve(&self) -> Result<ProviderConfig, ConfigError> {
        let kind: ProviderKind = self.provider.parse()?;
        let (selected, other) = match kind {
            ProviderKind::Outlook365 => (
                self.outlook.clone().map(ProviderConfig::Outlook),
                self.gmail.is_some().then_some(ProviderKind::Gmail),
            ),
            ProviderKind::Gmail => (
                self.gmail.clone().map(ProviderConfig::Gmail),
                self.outlook.is_some().then_some(ProviderKind::Outlook365),
            ),
        };

        let selected = selected.ok_or(ConfigError::MissingProviderConfig(kind.section()))?;
        match other {
            Some(other) => Err(conflict(kind, other)),
            None => Ok(selected),
        }
    }

    /// Parse a TOML document. Relative Gmail file references are resolved
    /// against the current directory.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let raw: RawEmailConfig = toml::from_str(toml)?;
        raw.into_config(Path::new(""))
    }

    /// Load a TOML file. Relative Gmail file references are resolved
    /// against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            what: "configuration",
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawEmailConfig = toml::from_str(&text)?;
        raw.into_config(path.parent().unwrap_or_else(|| Path::new("")))
    }
}

fn conflict(selected: ProviderKind, other: ProviderKind) -> ConfigError {
    ConfigError::ConflictingProviderConfig {
        selected: selected.as_str(),
        other: other.section(),
    }
}

/// File representation of [`EmailConfig`].
#[derive(Debug, Deserialize)]
struct RawEmailConfig {
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(default)]
    outlook: Option<OutlookConfig>,
    #[serde(default)]
    gmail: Option<GmailSection>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GmailSection {
    Inline(GmailConfig),
    Files {
        credentials_file: PathBuf,
        #[serde(default = "default_token_file")]
        token_file: PathBuf,
        #[serde(default)]
        api_url: Option<String>,
    },
}

pub(crate) fn default_token_file() -> PathBuf {
    PathBuf::from("token.json")
}

impl RawEmailConfig {
    fn into_config(self, base: &Path) -> Result<EmailConfig, ConfigError> {
        let gmail = match self.gmail {
            None => None,
            Some(GmailSection::Inline(config)) => Some(config),
            Some(GmailSection::Files {
                credentials_file,
                token_file,
                api_url,
            }) => {
                let config = read_gmail_files(&base.join(credentials_file), &base.join(token_file))?;
                Some(match api_url {
                    Some(url) => config.with_api_url(url),
                    None => config,
                })
            }
        };
        Ok(EmailConfig {
            provider: self.provider,
            outlook: self.outlook,
            gmail,
        })
    }
}

/// Read a Gmail client file and token file into a [`GmailConfig`].
pub(crate) fn read_gmail_files(
    credentials: &Path,
    token: &Path,
) -> Result<GmailConfig, ConfigError> {
    let read = |what: &'static str, path: &Path| {
        std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            what,
            path: path.to_path_buf(),
            source,
        })
    };
    Ok(GmailConfig::new(
        read("credentials", credentials)?,
        read("token", token)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlook() -> OutlookConfig {
        OutlookConfig::new("tenant", "client", "secret")
    }

    fn gmail() -> GmailConfig {
        GmailConfig::new(r#"{"installed":{"client_id":"c","client_secret":"s"}}"#, "{}")
    }

    #[test]
    fn provider_kind_parses_selectors() {
        assert_eq!("outlook365".parse::<ProviderKind>().unwrap(), ProviderKind::Outlook365);
        assert_eq!("gmail".parse::<ProviderKind>().unwrap(), ProviderKind::Gmail);
        assert_eq!(ProviderKind::Gmail.to_string(), "gmail");

        let err = "Gmail".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported provider: Gmail");
    }

    #[test]
    fn default_config_selects_outlook() {
        let config = EmailConfig::default();
        assert_eq!(config.provider, "outlook365");
        let err = config.resolve().unwrap_err();
        assert_eq!(err.to_string(), "outlook configuration is required");
    }

    #[test]
    fn resolve_matching_section() {
        let resolved = EmailConfig::outlook(outlook()).resolve().unwrap();
        assert_eq!(resolved, ProviderConfig::Outlook(outlook()));

        let resolved = EmailConfig::gmail(gmail()).resolve().unwrap();
        assert_eq!(resolved.kind(), ProviderKind::Gmail);
    }

    #[test]
    fn resolve_unknown_provider_first() {
        let config = EmailConfig {
            provider: "sendgrid".into(),
            outlook: None,
            gmail: None,
        };
        assert!(matches!(
            config.resolve().unwrap_err(),
            ConfigError::UnsupportedProvider(p) if p == "sendgrid"
        ));
    }

    #[test]
    fn resolve_missing_gmail_section() {
        let config = EmailConfig {
            provider: "gmail".into(),
            outlook: None,
            gmail: None,
        };
        assert_eq!(
            config.resolve().unwrap_err().to_string(),
            "gmail configuration is required"
        );
    }

    #[test]
    fn resolve_reports_missing_selected_section_before_extra_one() {
        let wrong = EmailConfig {
            provider: "gmail".into(),
            outlook: Some(outlook()),
            gmail: None,
        };
        let err = wrong.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingProviderConfig("gmail")));
        assert_eq!(err.to_string(), "gmail configuration is required");

        let wrong = EmailConfig {
            provider: "outlook365".into(),
            outlook: None,
            gmail: Some(gmail()),
        };
        assert!(matches!(
            wrong.resolve().unwrap_err(),
            ConfigError::MissingProviderConfig("outlook")
        ));
    }

    #[test]
    fn resolve_rejects_extra_section() {
        let both = EmailConfig {
            provider: "outlook365".into(),
            outlook: Some(outlook()),
            gmail: Some(gmail()),
        };
        assert_eq!(
            both.resolve().unwrap_err().to_string(),
            "outlook365 is selected but gmail configuration was also supplied"
        );

        let both = EmailConfig {
            provider: "gmail".into(),
            outlook: Some(outlook()),
            gmail: Some(gmail()),
        };
        assert!(matches!(
            both.resolve().unwrap_err(),
            ConfigError::ConflictingProviderConfig {
                selected: "gmail",
                other: "outlook"
            }
        ));
    }

    #[test]
    fn parses_outlook_toml() {
        let config = EmailConfig::from_toml_str(
            r#"
            provider = "outlook365"

            [outlook]
            tenant_id = "t"
            client_id = "c"
            client_secret = "s"
            save_to_sent_items = false
            "#,
        )
        .unwrap();
        let ProviderConfig::Outlook(outlook) = config.resolve().unwrap() else {
            panic!("expected outlook");
        };
        assert_eq!(outlook.tenant_id, "t");
        assert!(!outlook.save_to_sent_items);
        assert_eq!(outlook.graph_url, unimail_outlook::config::DEFAULT_GRAPH_URL);
    }

    #[test]
    fn provider_defaults_to_outlook_in_toml() {
        let config = EmailConfig::from_toml_str(
            r#"
            [outlook]
            tenant_id = "t"
            client_id = "c"
            client_secret = "s"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider, DEFAULT_PROVIDER);
    }

    #[test]
    fn parses_inline_gmail_toml() {
        let config = EmailConfig::from_toml_str(
            r#"
            provider = "gmail"

            [gmail]
            credentials_json = '{"installed":{"client_id":"c","client_secret":"s"}}'
            token_json = '{"refresh_token":"r"}'
            "#,
        )
        .unwrap();
        let gmail = config.gmail.unwrap();
        assert!(gmail.token_json.contains("refresh_token"));
    }

    #[test]
    fn gmail_file_references_resolve_relative_to_config() {
        let dir = std::env::temp_dir().join(format!("unimail-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("creds.json"), "CREDS").unwrap();
        std::fs::write(dir.join("token.json"), "TOKEN").unwrap();
        std::fs::write(
            dir.join("unimail.toml"),
            "provider = \"gmail\"\n[gmail]\ncredentials_file = \"creds.json\"\napi_url = \"http://localhost:1\"\n",
        )
        .unwrap();

        let config = EmailConfig::from_file(dir.join("unimail.toml")).unwrap();
        let gmail = config.gmail.unwrap();
        assert_eq!(gmail.credentials_json, "CREDS");
        assert_eq!(gmail.token_json, "TOKEN");
        assert_eq!(gmail.api_url, "http://localhost:1");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_gmail_file_is_read_error() {
        let err = EmailConfig::from_toml_str(
            "provider = \"gmail\"\n[gmail]\ncredentials_file = \"/nonexistent/creds.json\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { what: "credentials", .. }));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = EmailConfig::from_toml_str("provider = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_config_file_is_read_error() {
        let err = EmailConfig::from_file("/nonexistent/unimail.toml").unwrap_err();
        assert!(err.to_string().starts_with("failed to read configuration file"));
    }
}
