//! The seam between the unimail client and concrete email providers.
//!
//! A provider crate implements [`Transport`]; the client facade validates a
//! message, builds a [`SendContext`] and hands both over.

pub mod context;
pub mod error;
pub mod oauth;
pub mod transport;

pub use context::SendContext;
pub use error::TransportError;
pub use transport::{SendReceipt, Transport};

// Re-exported so callers can build cancellable contexts without a direct
// tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
