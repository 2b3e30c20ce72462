//! Outlook 365 transport for unimail.
//!
//! Sends mail through the Microsoft Graph
//! [`sendMail`](https://learn.microsoft.com/en-us/graph/api/user-sendmail)
//! action, authenticating as an Azure AD application with the OAuth2
//! client-credentials grant.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use unimail_outlook::{OutlookConfig, OutlookTransport};
//!
//! let config = OutlookConfig::new("tenant-id", "client-id", "client-secret");
//! let transport = OutlookTransport::new(config).unwrap();
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;


pub use auth::ClientCredentialsTokenSource;
pub use config::OutlookConfig;
pub use error::OutlookError;
pub use transport::{OutlookTransport, PROVIDER_NAME};
