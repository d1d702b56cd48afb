//! Platform endpoint definitions and request/response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Ajax service, relative to the platform base.
pub const AJAX_PATH: &str = "/lib/ajax/service.php";

/// Survey choice view, relative to the platform base.
pub const CHOICE_PATH: &str = "/mod/choice/view.php";

/// Form action that submits a survey answer.
pub(crate) const MAKE_CHOICE_ACTION: &str = "makechoice";

/// Hidden field carrying the relay state through the SAML flow.
pub(crate) const RELAY_STATE_FIELD: &str = "RelayState";

/// Hidden field carrying the SAML assertion.
pub(crate) const SAML_RESPONSE_FIELD: &str = "SAMLResponse";

/// Shown when an ajax call reports failure.
pub(crate) const AJAX_FAILURE_GUIDANCE: &str =
    "The ajax request failed. Check the method name for spelling errors and the arguments against the web service docs.";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Credential form posted to the identity provider.
#[derive(Debug, Serialize)]
pub(crate) struct LoginForm<'a> {
    #[serde(rename = "j_username")]
    pub username: &'a str,
    #[serde(rename = "j_password")]
    pub password: &'a str,
    #[serde(rename = "_eventId_proceed")]
    pub proceed: &'a str,
}

/// Assertion form posted to the platform's assertion consumer.
#[derive(Debug, Serialize)]
pub(crate) struct AssertionForm<'a> {
    #[serde(rename = "RelayState")]
    pub relay_state: &'a str,
    #[serde(rename = "SAMLResponse")]
    pub saml_response: &'a str,
}

/// One entry of an ajax batch.
#[derive(Debug, Serialize)]
pub(crate) struct AjaxCall<'a, A> {
    pub methodname: &'a str,
    pub args: &'a A,
}

/// One entry of an ajax batch response.
#[derive(Debug, Deserialize)]
pub(crate) struct AjaxResult {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub exception: Option<AjaxException>,
}

/// Exception details attached to a failed ajax entry.
#[derive(Debug, Deserialize)]
pub(crate) struct AjaxException {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errorcode: Option<String>,
}

impl AjaxResult {
    /// Message for a failed entry, with the server's explanation if it gave one.
    pub fn failure_message(&self) -> String {
        match &self.exception {
            Some(AjaxException {
                message: Some(message),
                errorcode,
            }) => match errorcode {
                Some(code) => format!("{AJAX_FAILURE_GUIDANCE} Server said: {message} ({code})"),
                None => format!("{AJAX_FAILURE_GUIDANCE} Server said: {message}"),
            },
            _ => AJAX_FAILURE_GUIDANCE.to_string(),
        }
    }
}

/// Survey answer form.
#[derive(Debug, Serialize)]
pub(crate) struct ChoiceForm<'a> {
    pub answer: String,
    pub sesskey: &'a str,
    pub action: &'a str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ajax_call_wire_shape() {
        let args = json!({ "courseid": 7 });
        let calls = [AjaxCall {
            methodname: "core_course_get_contents",
            args: &args,
        }];
        assert_eq!(
            serde_json::to_value(calls).unwrap(),
            json!([{ "methodname": "core_course_get_contents", "args": { "courseid": 7 } }])
        );
    }

    #[test]
    fn ajax_result_defaults_error_to_false() {
        let result: AjaxResult = serde_json::from_value(json!({ "data": 1 })).unwrap();
        assert!(!result.error);
        assert_eq!(result.data, Some(json!(1)));
    }

    #[test]
    fn failure_message_includes_exception() {
        let result: AjaxResult = serde_json::from_value(json!({
            "error": true,
            "exception": { "message": "Invalid parameter", "errorcode": "invalidparameter" }
        }))
        .unwrap();
        let msg = result.failure_message();
        assert!(msg.starts_with(AJAX_FAILURE_GUIDANCE));
        assert!(msg.ends_with("Server said: Invalid parameter (invalidparameter)"));
    }

    #[test]
    fn failure_message_without_exception_is_generic() {
        let result: AjaxResult = serde_json::from_value(json!({ "error": true })).unwrap();
        assert_eq!(result.failure_message(), AJAX_FAILURE_GUIDANCE);
    }

    #[test]
    fn login_form_field_names() {
        let form = LoginForm {
            username: "alice",
            password: "pw",
            proceed: "",
        };
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({ "j_username": "alice", "j_password": "pw", "_eventId_proceed": "" })
        );
    }
}
