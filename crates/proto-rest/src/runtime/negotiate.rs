//! Content-type negotiation for generated binders and clients.
//!
//! Two wire formats exist: JSON (`application/json`, the default) and binary
//! protobuf (`application/x-protobuf`, opt-in). Anything else is HTTP 415.
//! `Accept` is matched as a single type — no wildcard matching.

use http::HeaderMap;

/// A negotiated wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// `application/json`
    #[default]
    Json,
    /// `application/x-protobuf`
    Proto,
}

impl ContentType {
    /// The full media type string.
    #[must_use]
    pub const fn as_media_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Proto => "application/x-protobuf",
        }
    }

    /// Parse a media type, ignoring parameters (`; charset=utf-8`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or(value).trim();
        match essence {
            "application/json" => Some(Self::Json),
            "application/x-protobuf" => Some(Self::Proto),
            _ => None,
        }
    }
}

/// Pick the request body format from `Content-Type`.
///
/// A missing header means the default. A recognized but unaccepted type, or
/// an unrecognized one, is an error the binder answers with HTTP 415.
///
/// # Errors
///
/// Returns the offending media type string.
pub fn negotiate_request(
    headers: &HeaderMap,
    accepted: &[ContentType],
    default: ContentType,
) -> Result<ContentType, String> {
    negotiate(headers.get(http::header::CONTENT_TYPE), accepted, default)
}

/// Pick the response format from `Accept`.
///
/// A missing header means the default; a single concrete type is matched
/// exactly — wildcards are not honored.
///
/// # Errors
///
/// Returns the offending media type string.
pub fn negotiate_response(
    headers: &HeaderMap,
    accepted: &[ContentType],
    default: ContentType,
) -> Result<ContentType, String> {
    negotiate(headers.get(http::header::ACCEPT), accepted, default)
}

fn negotiate(
    value: Option<&http::HeaderValue>,
    accepted: &[ContentType],
    default: ContentType,
) -> Result<ContentType, String> {
    let Some(value) = value else {
        return Ok(default);
    };
    let raw = value.to_str().map_err(|_| "<non-ascii>".to_string())?;
    let parsed = ContentType::parse(raw).ok_or_else(|| raw.to_string())?;
    if accepted.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: &[ContentType] = &[ContentType::Json, ContentType::Proto];

    fn headers(name: http::HeaderName, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, value.parse().unwrap());
        map
    }

    #[test]
    fn missing_content_type_defaults_to_json() {
        let ct = negotiate_request(&HeaderMap::new(), BOTH, ContentType::Json).unwrap();
        assert_eq!(ct, ContentType::Json);
    }

    #[test]
    fn json_with_charset_parameter_is_json() {
        let map = headers(
            http::header::CONTENT_TYPE,
            "application/json; charset=utf-8",
        );
        let ct = negotiate_request(&map, BOTH, ContentType::Json).unwrap();
        assert_eq!(ct, ContentType::Json);
    }

    #[test]
    fn protobuf_is_opt_in() {
        let map = headers(http::header::CONTENT_TYPE, "application/x-protobuf");
        let ct = negotiate_request(&map, BOTH, ContentType::Json).unwrap();
        assert_eq!(ct, ContentType::Proto);
    }

    #[test]
    fn unknown_media_type_is_rejected() {
        let map = headers(http::header::CONTENT_TYPE, "text/xml");
        let err = negotiate_request(&map, BOTH, ContentType::Json).unwrap_err();
        assert_eq!(err, "text/xml");
    }

    #[test]
    fn recognized_but_unaccepted_type_is_rejected() {
        let map = headers(http::header::CONTENT_TYPE, "application/x-protobuf");
        let err = negotiate_request(&map, &[ContentType::Json], ContentType::Json).unwrap_err();
        assert_eq!(err, "application/x-protobuf");
    }

    #[test]
    fn accept_wildcard_is_not_matched() {
        let map = headers(http::header::ACCEPT, "*/*");
        assert!(negotiate_response(&map, BOTH, ContentType::Json).is_err());
    }

    #[test]
    fn missing_accept_uses_default() {
        let ct = negotiate_response(&HeaderMap::new(), BOTH, ContentType::Proto).unwrap();
        assert_eq!(ct, ContentType::Proto);
    }

    #[test]
    fn accept_single_type_matches() {
        let map = headers(http::header::ACCEPT, "application/json");
        let ct = negotiate_response(&map, BOTH, ContentType::Proto).unwrap();
        assert_eq!(ct, ContentType::Json);
    }
}
