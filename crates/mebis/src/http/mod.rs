//! HTTP transport for platform requests.
//!
//! This module owns the cookie-bearing connection and the fixed endpoint
//! definitions of the platform and its identity provider.

mod client;
mod endpoints;

pub(crate) use client::HttpClient;
pub use client::SessionRequest;
pub use endpoints::{AJAX_PATH, CHOICE_PATH};
pub(crate) use endpoints::*;
