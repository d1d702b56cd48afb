//! Session management for authenticated platform operations.

use std::fmt;

use reqwest::header::LOCATION;
use reqwest::{IntoUrl, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, InvalidInputError, Stage};
use crate::extract::{self, MissingMarkup};
use crate::http::{
    AjaxCall, AjaxResult, AssertionForm, ChoiceForm, HttpClient, LoginForm, MAKE_CHOICE_ACTION,
    RELAY_STATE_FIELD, SAML_RESPONSE_FIELD, SessionRequest,
};
use crate::types::PlatformUrl;

use super::credentials::Credentials;
use super::session_key::SessionKey;

/// A logged-in session on the learning platform.
///
/// Sessions are obtained via [`Session::login()`], which runs the full SAML
/// handshake with the platform's identity provider. The session owns its
/// cookie jar; dropping the session discards the login.
///
/// Every operation issues one request and awaits its response before
/// returning.
///
/// # Example
///
/// ```no_run
/// use mebis::{Credentials, PlatformUrl, Session};
///
/// # async fn example() -> Result<(), mebis::Error> {
/// let platform = PlatformUrl::default();
/// let session = Session::login(&platform, Credentials::new("alice", "hunter2")).await?;
///
/// let page = session.get(platform.landing_url()).send().await?;
/// println!("{}", page.text().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    platform: PlatformUrl,
    client: HttpClient,
    sesskey: SessionKey,
    user_id: Option<String>,
}

impl Session {
    /// Log in to the platform and create a new session.
    ///
    /// # Errors
    ///
    /// - [`Error::Login`] if the identity provider rejects the credentials.
    /// - [`Error::Http`] if any step is answered with a status of 400 or above.
    /// - [`Error::UnexpectedResponse`] if a page lacks the markup the flow
    ///   depends on.
    #[instrument(skip(credentials), fields(platform = %platform, username = %credentials.username()))]
    pub async fn login(platform: &PlatformUrl, credentials: Credentials) -> Result<Self, Error> {
        if credentials.username().is_empty() {
            return Err(InvalidInputError::EmptyUsername.into());
        }

        info!("Logging in");
        let client = HttpClient::new()?;

        // The landing page redirects to the identity provider's login form
        // and fills the cookie jar on the way.
        debug!("Fetching landing page");
        let landing = client
            .request(Method::GET, platform.landing_url())
            .send()
            .await?;
        let idp_origin = landing.url().origin().ascii_serialization();
        let body = landing.text().await?;
        let action = extract::first_action_url(&body).map_err(unexpected(Stage::LandingPage))?;
        let login_url = format!("{idp_origin}{action}");

        debug!(url = %login_url, "Submitting credentials");
        let form = LoginForm {
            username: credentials.username(),
            password: credentials.password(),
            proceed: "",
        };
        let body = client
            .request(Method::POST, &login_url)
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        if extract::contains_form_error(&body) {
            warn!("Identity provider rejected the credentials");
            return Err(Error::Login {
                username: credentials.username().to_string(),
            });
        }

        let consumer_url =
            extract::unescaped_action_url(&body).map_err(unexpected(Stage::IdentityProvider))?;
        let relay_state = extract::hidden_field(&body, RELAY_STATE_FIELD)
            .map(extract::unescape_html)
            .map_err(unexpected(Stage::IdentityProvider))?;
        let saml_response = extract::hidden_field(&body, SAML_RESPONSE_FIELD)
            .map_err(unexpected(Stage::IdentityProvider))?;

        debug!(url = %consumer_url, "Posting SAML assertion");
        let form = AssertionForm {
            relay_state: &relay_state,
            saml_response,
        };
        let body = client
            .request(Method::POST, &consumer_url)
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        let sesskey = extract::session_key(&body)
            .map(SessionKey::new)
            .map_err(unexpected(Stage::AssertionConsumer))?;
        let user_id = extract::user_id(&body).map(str::to_string);

        info!(user_id = user_id.as_deref().unwrap_or("unknown"), "Logged in");

        Ok(Self {
            platform: platform.clone(),
            client,
            sesskey,
            user_id,
        })
    }

    /// Log in to the platform named by `MEBIS_PLATFORM_URL`, or the public
    /// mebis platform if the variable is unset.
    pub async fn login_default(credentials: Credentials) -> Result<Self, Error> {
        let platform = PlatformUrl::from_env()?;
        Self::login(&platform, credentials).await
    }

    /// Returns the platform this session is logged in to.
    pub fn platform(&self) -> &PlatformUrl {
        &self.platform
    }

    /// Returns the session key issued at login.
    pub fn sesskey(&self) -> &SessionKey {
        &self.sesskey
    }

    /// Returns the user id, if the platform disclosed it at login.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Start a GET request that carries the session's cookies.
    pub fn get<U: IntoUrl>(&self, url: U) -> SessionRequest<'_> {
        self.request(Method::GET, url)
    }

    /// Start a POST request that carries the session's cookies.
    pub fn post<U: IntoUrl>(&self, url: U) -> SessionRequest<'_> {
        self.request(Method::POST, url)
    }

    /// Start a request with an arbitrary method.
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> SessionRequest<'_> {
        self.client.request(method, url)
    }

    /// Call a remote procedure on the platform's ajax service.
    ///
    /// The call is sent as a batch of one; the `data` of the single result
    /// is decoded into `R`.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] if the service answers with a status of 400 or above.
    /// - [`Error::ActionFailed`] if the service reports the call as failed.
    /// - [`Error::Decode`] if the response or its data has the wrong shape.
    #[instrument(skip(self, args))]
    pub async fn ajax<A, R>(&self, method: &str, args: &A) -> Result<R, Error>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        debug!("Calling ajax method");

        let calls = [AjaxCall {
            methodname: method,
            args,
        }];
        let body = self
            .post(self.platform.ajax_url())
            .query(&[("sesskey", self.sesskey.as_str())])
            .json(&calls)
            .send()
            .await?
            .text()
            .await?;

        let results: Vec<AjaxResult> = serde_json::from_str(&body)?;
        let result = results
            .into_iter()
            .next()
            .ok_or_else(|| unexpected(Stage::Ajax)(MissingMarkup::new("result entry")))?;

        if result.error {
            warn!("Ajax call reported failure");
            return Err(Error::ActionFailed {
                method: method.to_string(),
                message: result.failure_message(),
            });
        }

        let data = result.data.unwrap_or_default();
        Ok(serde_json::from_value(data)?)
    }

    /// Answer a survey (choice activity).
    ///
    /// Returns `true` if the platform accepted the answer, which it signals
    /// by redirecting. Every failure, including HTTP and transport errors,
    /// yields `false`.
    #[instrument(skip_all, fields(survey_id = %survey_id, choice_id = %choice_id))]
    pub async fn make_survey_choice(
        &self,
        survey_id: impl fmt::Display,
        choice_id: impl fmt::Display,
    ) -> bool {
        debug!("Making survey choice");

        let form = ChoiceForm {
            answer: choice_id.to_string(),
            sesskey: self.sesskey.as_str(),
            action: MAKE_CHOICE_ACTION,
            id: survey_id.to_string(),
        };
        let result = self
            .post(self.platform.choice_url())
            .form(&form)
            .follow_redirects(false)
            .send()
            .await;

        match result {
            Ok(response) if response.headers().contains_key(LOCATION) => {
                info!("Made survey choice");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "Survey choice was not accepted");
                false
            }
            Err(e) => {
                warn!(error = %e, "Making survey choice failed");
                false
            }
        }
    }
}

fn unexpected(stage: Stage) -> impl Fn(MissingMarkup) -> Error {
    move |source| Error::UnexpectedResponse { stage, source }
}
