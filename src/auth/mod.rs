//! Authentication module
//!
//! The Satellite API is accessed with HTTP basic authentication; the
//! `Authenticator` applies the configured credentials to each request.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
