pub mod auth;
pub mod send;
pub mod version;
