//! Message model and wire-format construction for unimail.
//!
//! This crate has no I/O of its own (apart from [`Attachment::from_path`]).
//! It defines the [`Message`] every provider accepts, the validation rules
//! applied before a send, and the [`mime`] encoder used by providers whose
//! API takes a raw RFC 2822 message.

pub mod error;
pub mod message;
pub mod mime;
pub mod version;

pub use error::ValidationError;
pub use message::{Attachment, Message};
pub use version::{VERSION, VersionInfo, version_info};
