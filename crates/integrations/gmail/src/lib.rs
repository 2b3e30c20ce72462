//! Gmail transport for unimail.
//!
//! Messages are rendered with [`unimail_core::mime`], base64url-encoded and
//! submitted through the Gmail API `users.messages.send` method as the user
//! who granted the stored OAuth token. [`GmailAuthHelper`] runs the one-time
//! consent flow that produces that token.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use unimail_gmail::{GmailConfig, GmailTransport};
//!
//! let config = GmailConfig::from_files("credentials.json", "token.json").unwrap();
//! let transport = GmailTransport::new(config).unwrap();
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;


pub use auth::{GMAIL_SEND_SCOPE, GmailAuthHelper, RefreshingTokenSource};
pub use config::GmailConfig;
pub use error::GmailError;
pub use transport::{GmailTransport, PROVIDER_NAME};
