//! Human-readable explanations for HTTP error status codes.

use chrono::{Datelike, NaiveDate};
use reqwest::header::{HeaderMap, RETRY_AFTER, UPGRADE};

/// The year RFC 2324 (Hyper Text Coffee Pot Control Protocol) was published.
const HTCPCP_YEAR: i32 = 1998;

/// Status codes with a fixed explanation.
///
/// 418, 426 and 503 need response or calendar context and are rendered by
/// [`describe`] directly.
const STATUS_MESSAGES: &[(u16, &str)] = &[
    (400, "Bad request. The server could not understand the request due to invalid syntax."),
    (401, "Unauthorized. The client lacked authentication."),
    (
        403,
        "Forbidden. The client authorized to the server but does not have the rights to access this resource.",
    ),
    (404, "Not found. The requested resource could not be found on this server."),
    (
        405,
        "Method not allowed. The request method has been disabled by the server. Most likely POST was used wrongly.",
    ),
    (
        406,
        "Not acceptable. The content type set in the request headers can not be matched by the server.",
    ),
    (
        407,
        "Proxy authentication required. The client did not authorize (correctly). Authorization should be done by a proxy.",
    ),
    (408, "Request timeout. The connection to the server has been inactive for too long."),
    (409, "Conflict. The request conflicted with the current state of the server."),
    (410, "Gone. The requested resource has been deleted from the server."),
    (411, "Length required. Header field \"Content-Length\" is missing."),
    (
        412,
        "Precondition failed. The client has indicated conditions in the headers, which the server does not meet.",
    ),
    (413, "Payload too large. The request payload is too large."),
    (414, "URI too long. The URI specified is too long for the server to interpret."),
    (415, "Unsupported media type. The requested media type is not supported by the server."),
    (416, "The range specified in the \"Range\" header field could not be satisfied."),
    (
        417,
        "Expectation failed. The expectation present in the \"Expect\" header field could not be met.",
    ),
    (
        421,
        "Misdirected request. The request was sent to a server that is not able to create a response to your request.",
    ),
    (422, "Unprocessable entity. The request could not be processed due to semantic errors."),
    (423, "Locked. The resource you are trying to access is locked."),
    (424, "Failed Dependency. The request failed due to failure of a previous request."),
    (428, "Precondition required. The client has to indicate preconditions in the headers."),
    (
        429,
        "Too many requests. The user has sent too many requests in a given amount of time (\"rate limiting\").",
    ),
    (431, "Request header fields too large. The client has sent too many headers."),
    (
        451,
        "Unavailable for legal reasons. The requested resource cannot legally be provided, such as a web page censored by a government.",
    ),
    (
        500,
        "Internal server error. The server has encountered a situation it doesn't know how to handle.",
    ),
    (
        501,
        "Not implemented. The request method is not supported by the server and cannot be handled.",
    ),
    (502, "Bad gateway. The server working as a gateway got a bad response."),
    (504, "Gateway timeout. The server requested by the gateway did not respond in time."),
    (506, "Internal configuration error."),
    (
        507,
        "Insufficient storage. The request could not be met because of insufficient storage on the server side.",
    ),
    (
        508,
        "Loop detected. The server stopped processing the request since it detected an infinite loop.",
    ),
    (510, "Not extended. The request must be extended for the server to fulfill it."),
    (
        511,
        "Network authentication required. The client need to authenticate to access the network.",
    ),
];

const TEAPOT: &str = "I'm a teapot. The server did not wish to fulfill this request.";

const UNAVAILABLE: &str = "Service unavailable. The server is not currently able to respond due to maintenance, overload, etc.";

const UPGRADE_REQUIRED: &str = "Upgrade required. The server refuses to perform the request using the current protocol but might be willing to do so after the client upgrades to one of these protocols:";

const UNKNOWN: &str = "Unknown error.";

/// Render the explanation for `status`, as of `today`.
///
/// `headers` supplies `Retry-After` for 503 and `Upgrade` for 426.
pub fn describe(status: u16, headers: &HeaderMap, today: NaiveDate) -> String {
    match status {
        418 => teapot(today),
        426 => {
            let protocols = header_str(headers, UPGRADE).unwrap_or("unknown");
            format!("{UPGRADE_REQUIRED} {protocols}")
        }
        503 => match header_str(headers, RETRY_AFTER) {
            Some(after) => format!("{UNAVAILABLE} Try again after {after}."),
            None => UNAVAILABLE.to_string(),
        },
        _ => lookup(status).unwrap_or(UNKNOWN).to_string(),
    }
}

/// Look up the fixed explanation for `status`, if the table has one.
pub fn lookup(status: u16) -> Option<&'static str> {
    STATUS_MESSAGES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, message)| *message)
}

/// Coarse class of a status code, used as the message prefix.
pub fn class(status: u16) -> &'static str {
    match status {
        ..=499 => "Client error",
        500..=599 => "Server error",
        _ => "Unknown",
    }
}

fn teapot(today: NaiveDate) -> String {
    if today.month() != 4 || today.day() != 1 {
        return TEAPOT.to_string();
    }
    let years = today.year() - HTCPCP_YEAR;
    format!(
        "I'm a teapot. Happy 1st of April and {years}{} anniversary of the Hyper Text Coffee Pot Control Protocol!",
        ordinal_suffix(years)
    )
}

fn ordinal_suffix(n: i32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn ordinary_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        for (i, (code, _)) in STATUS_MESSAGES.iter().enumerate() {
            assert!(
                STATUS_MESSAGES[i + 1..].iter().all(|(c, _)| c != code),
                "duplicate entry for {code}"
            );
        }
    }

    #[test]
    fn known_code_uses_table() {
        let msg = describe(401, &HeaderMap::new(), ordinary_day());
        assert_eq!(msg, "Unauthorized. The client lacked authentication.");
    }

    #[test]
    fn unknown_code_is_generic() {
        assert_eq!(describe(499, &HeaderMap::new(), ordinary_day()), UNKNOWN);
        assert_eq!(describe(599, &HeaderMap::new(), ordinary_day()), UNKNOWN);
    }

    #[test]
    fn retry_after_is_interpolated() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        let msg = describe(503, &headers, ordinary_day());
        assert!(msg.starts_with("Service unavailable."));
        assert!(msg.ends_with("Try again after 30."));
    }

    #[test]
    fn unavailable_without_retry_after() {
        assert_eq!(describe(503, &HeaderMap::new(), ordinary_day()), UNAVAILABLE);
    }

    #[test]
    fn upgrade_lists_protocols() {
        let mut headers = HeaderMap::new();
        headers.insert(UPGRADE, HeaderValue::from_static("HTTP/2.0, HTTP/3"));
        let msg = describe(426, &headers, ordinary_day());
        assert!(msg.ends_with("protocols: HTTP/2.0, HTTP/3"));

        let msg = describe(426, &HeaderMap::new(), ordinary_day());
        assert!(msg.ends_with("protocols: unknown"));
    }

    #[test]
    fn teapot_on_ordinary_day_is_plain() {
        assert_eq!(describe(418, &HeaderMap::new(), ordinary_day()), TEAPOT);
    }

    #[test]
    fn teapot_on_april_first_counts_anniversary() {
        let april_first = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let msg = describe(418, &HeaderMap::new(), april_first);
        assert!(msg.contains("26th anniversary"), "{msg}");

        let april_first = NaiveDate::from_ymd_opt(2021, 4, 1).unwrap();
        let msg = describe(418, &HeaderMap::new(), april_first);
        assert!(msg.contains("23rd anniversary"), "{msg}");
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(112), "th");
    }

    #[test]
    fn status_classes() {
        assert_eq!(class(404), "Client error");
        assert_eq!(class(502), "Server error");
        assert_eq!(class(600), "Unknown");
    }
}
