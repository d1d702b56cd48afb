//! mebis - Authenticated sessions for the mebis learning platform
//!
//! This library logs a user in through the platform's SAML single-sign-on
//! portal and exposes the resulting cookie-bearing connection as a
//! [`Session`]. All authenticated operations flow through that object.
//!
//! # Example
//!
//! ```no_run
//! use mebis::{Credentials, PlatformUrl, Session};
//! use serde_json::{json, Value};
//!
//! # async fn example() -> Result<(), mebis::Error> {
//! let platform = PlatformUrl::default();
//! let credentials = Credentials::new("alice", "hunter2");
//! let session = Session::login(&platform, credentials).await?;
//!
//! let courses: Value = session
//!     .ajax(
//!         "core_course_get_enrolled_courses_by_timeline_classification",
//!         &json!({ "classification": "all" }),
//!     )
//!     .await?;
//! println!("{courses}");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod http;
pub mod status;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{Credentials, Session, SessionKey};
pub use error::{Error, HttpError, Stage};
pub use http::SessionRequest;
pub use types::PlatformUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
