//! Provider-agnostic email sending.
//!
//! Build a [`Message`], pick a provider through [`EmailConfig`] (or the
//! environment), and send it with a [`Client`]. Messages are validated
//! before any network call; the bound transport handles authentication and
//! the provider's wire format.
//!
//! # Quick Start
//!
//! ```no_run
//! use unimail::{Attachment, Client, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // EMAIL_PROVIDER, OUTLOOK_* or GMAIL_* variables select and configure
//!     // the provider.
//!     let client = unimail::client_from_env()?;
//!
//!     let message = Message::new("reports@contoso.com", "alice@example.com", "Q3", "<h1>Q3</h1>")
//!         .html()
//!         .with_cc("bob@example.com")
//!         .with_attachment(Attachment::from_path("q3.pdf")?);
//!
//!     let receipt = client.send(&message).await?;
//!     println!("sent via {}", receipt.provider);
//!     Ok(())
//! }
//! ```
//!
//! # Providers
//!
//! | Selector | Transport | Section |
//! |---|---|---|
//! | `outlook365` | Microsoft Graph `sendMail` | [`OutlookConfig`] |
//! | `gmail` | Gmail API `messages.send` | [`GmailConfig`] |
//!
//! Any other [`Transport`] can be bound with [`Client::with_transport`].

mod client;
pub mod config;
pub mod env;
mod error;
mod quick;

pub use client::{Client, DEFAULT_SEND_TIMEOUT};
pub use config::{EmailConfig, ProviderConfig, ProviderKind};
pub use env::{client_from_env, config_from_env, config_from_lookup};
pub use error::{ConfigError, EmailError};
pub use quick::{Credentials, quick_send};

// Re-exported so callers only need this crate.
pub use unimail_core::{
    Attachment, Message, VERSION, ValidationError, VersionInfo, mime, version_info,
};
pub use unimail_gmail::{GmailAuthHelper, GmailConfig};
pub use unimail_outlook::OutlookConfig;
pub use unimail_transport::{
    CancellationToken, SendContext, SendReceipt, Transport, TransportError,
};
