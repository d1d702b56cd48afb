//! Platform URL type.

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};
use crate::http::{AJAX_PATH, CHOICE_PATH};

/// Environment variable that overrides the platform base URL.
pub const PLATFORM_URL_ENV: &str = "MEBIS_PLATFORM_URL";

const DEFAULT_PLATFORM: &str = "https://lernplattform.mebis.bayern.de";

/// A validated learning-platform base URL.
///
/// This type ensures the URL is absolute, uses HTTPS (or HTTP for localhost),
/// and derives the fixed platform endpoints from it.
///
/// # Example
///
/// ```
/// use mebis::PlatformUrl;
///
/// let platform = PlatformUrl::new("https://lernplattform.mebis.bayern.de").unwrap();
/// assert_eq!(platform.ajax_url(),
///            "https://lernplattform.mebis.bayern.de/lib/ajax/service.php");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlatformUrl(Url);

impl PlatformUrl {
    /// Create a new platform URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::PlatformUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Read the platform URL from `MEBIS_PLATFORM_URL`, falling back to the
    /// public mebis platform when the variable is unset.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_override(std::env::var(PLATFORM_URL_ENV).ok())
    }

    fn from_override(value: Option<String>) -> Result<Self, Error> {
        match value {
            Some(value) => Self::new(value),
            None => Ok(Self::default()),
        }
    }

    /// The landing page that starts the login flow.
    pub fn landing_url(&self) -> String {
        format!("{}/", self.base())
    }

    /// The ajax service endpoint.
    pub fn ajax_url(&self) -> String {
        format!("{}{}", self.base(), AJAX_PATH)
    }

    /// The survey choice view.
    pub fn choice_url(&self) -> String {
        format!("{}{}", self.base(), CHOICE_PATH)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn base(&self) -> &str {
        // The URL crate always adds a trailing slash to root paths
        self.0.as_str().trim_end_matches('/')
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::PlatformUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        // Must be HTTPS (or HTTP for localhost)
        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::PlatformUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::PlatformUrl {
                value: original.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for PlatformUrl {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_PLATFORM).expect("default platform URL is valid"))
    }
}

impl fmt::Display for PlatformUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base())
    }
}

impl FromStr for PlatformUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PlatformUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_public_platform() {
        let platform = PlatformUrl::default();
        assert_eq!(platform.host(), Some("lernplattform.mebis.bayern.de"));
        assert_eq!(
            platform.landing_url(),
            "https://lernplattform.mebis.bayern.de/"
        );
    }

    #[test]
    fn valid_localhost_http() {
        let platform = PlatformUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(platform.host(), Some("127.0.0.1"));
    }

    #[test]
    fn endpoint_construction() {
        let platform = PlatformUrl::new("https://lernplattform.mebis.bayern.de/").unwrap();
        assert_eq!(
            platform.ajax_url(),
            "https://lernplattform.mebis.bayern.de/lib/ajax/service.php"
        );
        assert_eq!(
            platform.choice_url(),
            "https://lernplattform.mebis.bayern.de/mod/choice/view.php"
        );
    }

    #[test]
    fn keeps_path_prefix() {
        let platform = PlatformUrl::new("https://example.org/moodle").unwrap();
        assert_eq!(platform.ajax_url(), "https://example.org/moodle/lib/ajax/service.php");
        assert_eq!(platform.to_string(), "https://example.org/moodle");
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(PlatformUrl::new("http://lernplattform.mebis.bayern.de").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(PlatformUrl::new("/lib/ajax/service.php").is_err());
    }

    #[test]
    fn override_or_default() {
        let platform = PlatformUrl::from_override(Some("https://example.org".into())).unwrap();
        assert_eq!(platform.host(), Some("example.org"));
        assert_eq!(PlatformUrl::from_override(None).unwrap(), PlatformUrl::default());
        assert!(PlatformUrl::from_override(Some("http://example.org".into())).is_err());
    }

    // The only test in the crate that touches MEBIS_PLATFORM_URL, so the
    // set/remove pair cannot race with another reader.
    #[test]
    fn from_env_reads_variable_and_falls_back() {
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::set_var(PLATFORM_URL_ENV, "http://localhost:8080") };
        let platform = PlatformUrl::from_env().unwrap();
        assert_eq!(platform.ajax_url(), "http://localhost:8080/lib/ajax/service.php");

        // SAFETY: as above.
        unsafe { std::env::remove_var(PLATFORM_URL_ENV) };
        assert_eq!(PlatformUrl::from_env().unwrap(), PlatformUrl::default());
    }

    #[test]
    fn invalid_with_query() {
        assert!(PlatformUrl::new("https://example.org/?a=b").is_err());
    }
}
