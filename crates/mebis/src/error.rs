//! Error types for the mebis library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, login, HTTP status, ajax and input validation errors.

use std::fmt;

use chrono::{Local, NaiveDate};
use reqwest::header::HeaderMap;
use thiserror::Error;

use crate::extract::MissingMarkup;
use crate::status;

/// The unified error type for mebis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The identity provider rejected the credentials.
    #[error("error during login for user \"{username}\", most likely the password is incorrect")]
    Login { username: String },

    /// A request was answered with a status code of 400 or above.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// An ajax call succeeded at the HTTP level but reported a failure.
    #[error("ajax call \"{method}\" failed: {message}")]
    ActionFailed { method: String, message: String },

    /// A response was missing markup the login flow depends on.
    #[error("unexpected response from {stage}: {source}")]
    UnexpectedResponse {
        stage: Stage,
        #[source]
        source: MissingMarkup,
    },

    /// An ajax payload could not be decoded into the requested type.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input validation errors (empty username, malformed URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// The point in a session's lifetime at which a response was inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The platform landing page that carries the login form.
    LandingPage,
    /// The identity provider's answer to the credential post.
    IdentityProvider,
    /// The platform's answer to the SAML assertion post.
    AssertionConsumer,
    /// The ajax service endpoint.
    Ajax,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LandingPage => "landing page",
            Stage::IdentityProvider => "identity provider",
            Stage::AssertionConsumer => "assertion consumer",
            Stage::Ajax => "ajax service",
        };
        f.write_str(name)
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Any other failure reported by the HTTP client.
    #[error("HTTP client error: {message}")]
    Client { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Client {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// A response with a status code of 400 or above.
///
/// The message is rendered once, at construction, from the static status
/// table in [`crate::status`].
#[derive(Debug, Clone)]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// URL that produced the response.
    pub url: String,
    /// Human-readable explanation of the status.
    pub message: String,
}

impl HttpError {
    /// Build an error from the parts of a response, rendering the message
    /// as of `today`.
    pub fn new(status: u16, url: impl Into<String>, headers: &HeaderMap, today: NaiveDate) -> Self {
        Self {
            status,
            url: url.into(),
            message: status::describe(status, headers, today),
        }
    }

    /// Build an error from a received response.
    pub fn from_response(response: &reqwest::Response) -> Self {
        Self::new(
            response.status().as_u16(),
            response.url().as_str(),
            response.headers(),
            Local::now().date_naive(),
        )
    }

    /// Check if the server blamed the client (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" responded with: {}, {}: {}",
            self.url,
            status::class(self.status),
            self.status,
            self.message
        )
    }
}

impl std::error::Error for HttpError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// The username was empty.
    #[error("username must not be empty")]
    EmptyUsername,

    /// Invalid platform URL format.
    #[error("invalid platform URL '{value}': {reason}")]
    PlatformUrl { value: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, RETRY_AFTER};

    #[test]
    fn login_error_names_user_only() {
        let err = Error::Login {
            username: "alice".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"alice\""));
        assert!(msg.contains("password is incorrect"));
    }

    #[test]
    fn http_error_display_includes_url_class_and_code() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let err = HttpError::new(404, "https://example.org/x", &HeaderMap::new(), date);
        assert_eq!(
            err.to_string(),
            "\"https://example.org/x\" responded with: Client error, 404: Not found. \
             The requested resource could not be found on this server."
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn http_error_for_503_carries_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let err = HttpError::new(503, "https://example.org/", &headers, date);
        assert!(err.to_string().contains("Server error, 503"));
        assert!(err.message.contains("30"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn unexpected_response_names_stage_and_marker() {
        let err = Error::UnexpectedResponse {
            stage: Stage::AssertionConsumer,
            source: MissingMarkup::new("sesskey"),
        };
        let msg = err.to_string();
        assert!(msg.contains("assertion consumer"));
        assert!(msg.contains("sesskey"));
    }
}
