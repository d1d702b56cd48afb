//! Cookie-bearing HTTP client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Body, ClientBuilder, IntoUrl, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, HttpError};

/// HTTP client owning one cookie jar.
///
/// Two transport clients share the jar so that a single request can opt
/// out of redirect following without losing the session cookies.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    no_redirect: reqwest::Client,
}

impl HttpClient {
    /// Create a client with an empty cookie jar.
    pub fn new() -> Result<Self, Error> {
        let jar = Arc::new(Jar::default());
        let client = Self::builder(&jar).build()?;
        let no_redirect = Self::builder(&jar).redirect(Policy::none()).build()?;

        Ok(Self {
            client,
            no_redirect,
        })
    }

    fn builder(jar: &Arc<Jar>) -> ClientBuilder {
        reqwest::Client::builder()
            .user_agent(concat!("mebis/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(Arc::clone(jar))
    }

    /// Start a request on the shared connection.
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> SessionRequest<'_> {
        SessionRequest {
            client: self,
            builder: self.client.request(method, url),
            follow_redirects: true,
        }
    }
}

/// A request issued in the context of a logged-in session.
///
/// Wraps [`reqwest::RequestBuilder`]; [`SessionRequest::send`] turns any
/// status code of 400 or above into [`Error::Http`].
#[must_use = "a request does nothing until it is sent"]
pub struct SessionRequest<'a> {
    client: &'a HttpClient,
    builder: RequestBuilder,
    follow_redirects: bool,
}

impl SessionRequest<'_> {
    /// Append URL query parameters.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    /// Send a URL-encoded form body.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        self.builder = self.builder.form(form);
        self
    }

    /// Send a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.builder = self.builder.json(json);
        self
    }

    /// Send a raw body.
    pub fn body<T: Into<Body>>(mut self, body: T) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Add a single header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Merge a set of headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.builder = self.builder.headers(headers);
        self
    }

    /// Override the transport's default timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.builder = self.builder.timeout(timeout);
        self
    }

    /// Whether redirects are followed (the default) or returned as-is.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Send the request and check the response status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the request could not be completed and
    /// [`Error::Http`] if the response status is 400 or above.
    pub async fn send(self) -> Result<Response, Error> {
        let request = self.builder.build()?;
        debug!(method = %request.method(), url = %request.url(), follow_redirects = self.follow_redirects, "HTTP request");

        let transport = if self.follow_redirects {
            &self.client.client
        } else {
            &self.client.no_redirect
        };
        let response = transport.execute(request).await?;

        check_status(response)
    }
}

/// Reject responses with a status code of 400 or above.
fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    trace!(status = %status, url = %response.url(), "HTTP response");

    if status.as_u16() >= 400 {
        Err(HttpError::from_response(&response).into())
    } else {
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn requests_follow_redirects_by_default() {
        let client = HttpClient::new().unwrap();
        let request = client.request(Method::GET, "https://example.org/");
        assert!(request.follow_redirects);
        assert!(!request.follow_redirects(false).follow_redirects);
    }
}
