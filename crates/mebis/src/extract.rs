//! Extraction of login tokens from identity-provider and platform pages.
//!
//! The login flow depends on a handful of fragments of third-party HTML.
//! Each fragment has one named operation here so the coupling to page
//! structure stays in this module. All searches are first-match and
//! case-sensitive, and a value runs up to the next `"` on the same line.

use thiserror::Error;

/// Marks a failed login on the identity provider's form page.
pub const FORM_ERROR_MARKER: &str = "form-error";

const ACTION_PREFIX: &str = "action=\"";
const SESSION_KEY_PREFIX: &str = "sesskey\":\"";
const USER_ID_PREFIX: &str = "data-userid=\"";

/// A required fragment was not present in a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing {marker}")]
pub struct MissingMarkup {
    /// What was being looked for.
    pub marker: String,
}

impl MissingMarkup {
    /// Create a new missing-markup error for `marker`.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

/// Value of the first `action="…"` attribute, exactly as written.
pub fn first_action_url(body: &str) -> Result<&str, MissingMarkup> {
    quoted_after(body, ACTION_PREFIX).ok_or_else(|| MissingMarkup::new("form action"))
}

/// Value of the first `action="…"` attribute with HTML entities decoded.
pub fn unescaped_action_url(body: &str) -> Result<String, MissingMarkup> {
    first_action_url(body).map(unescape_html)
}

/// Value of the hidden input `name="<name>" value="…"`, exactly as written.
pub fn hidden_field<'a>(body: &'a str, name: &str) -> Result<&'a str, MissingMarkup> {
    let prefix = format!("name=\"{name}\" value=\"");
    quoted_after(body, &prefix).ok_or_else(|| MissingMarkup::new(format!("hidden field {name}")))
}

/// The session key embedded in the page's JSON configuration.
pub fn session_key(body: &str) -> Result<&str, MissingMarkup> {
    quoted_after(body, SESSION_KEY_PREFIX)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| MissingMarkup::new("sesskey"))
}

/// The user id from the first `data-userid` attribute, if any.
pub fn user_id(body: &str) -> Option<&str> {
    quoted_after(body, USER_ID_PREFIX).filter(|id| !id.is_empty())
}

/// Whether the identity provider rendered its form-error block.
pub fn contains_form_error(body: &str) -> bool {
    body.contains(FORM_ERROR_MARKER)
}

/// Decode HTML character references.
///
/// Handles the five XML entities, `&#39;`, and decimal or hex numeric
/// references terminated by `;`. This is narrower than the full HTML5
/// named-reference table: the identity provider encodes attribute values
/// with hex references only. Anything else, including named references
/// such as `&nbsp;` and references missing their `;`, is left untouched.
pub fn unescape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match candidate.find(';').and_then(|semi| {
            decode_reference(&candidate[1..semi]).map(|c| (c, semi))
        }) {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// First occurrence of `prefix` followed by a value terminated by `"`
/// before the end of the line.
fn quoted_after<'a>(body: &'a str, prefix: &str) -> Option<&'a str> {
    body.match_indices(prefix).find_map(|(start, _)| {
        let value_start = start + prefix.len();
        let tail = &body[value_start..];
        let end = tail.find(['"', '\n'])?;
        (tail.as_bytes()[end] == b'"').then(|| &tail[..end])
    })
}
