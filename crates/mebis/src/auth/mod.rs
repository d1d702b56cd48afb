//! Authentication types and session management.
//!
//! All authenticated operations require a [`Session`] object, obtained by
//! running the platform's SAML login flow.

mod credentials;
mod session;
mod session_key;

pub use credentials::Credentials;
pub use session::Session;
pub use session_key::SessionKey;
