//! Shared response decoding for generated clients.
//!
//! Generated per-method calls delegate non-2xx handling here so every client
//! discriminates error shapes the same way: first [`ValidationError`] (status
//! 400 with a matching top-level field set), then [`Error`], then a transport
//! error carrying the raw body.

use prost::Message as _;

use super::error::{Error, ValidationError};
use super::negotiate::ContentType;

/// A failed client call.
#[derive(Debug)]
#[non_exhaustive]
pub enum ClientError {
    /// The server rejected the request (HTTP 400 with violations).
    Validation(ValidationError),
    /// The server answered with a typed error envelope.
    Api {
        /// The HTTP status code.
        status: u16,
        /// The decoded envelope.
        error: Error,
    },
    /// The response body did not decode as the expected type.
    Decode(String),
    /// The request never produced a usable response.
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{e}"),
            Self::Api { status, error } => write!(f, "HTTP {status}: {error}"),
            Self::Decode(msg) => write!(f, "response decoding failed: {msg}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Api { error, .. } => Some(error),
            Self::Transport(e) => Some(e.as_ref()),
            Self::Decode(_) => None,
        }
    }
}

/// Decode a non-2xx response body into the matching error shape.
///
/// Order per the error contract: a 400 whose JSON body carries a top-level
/// `violations` array is a [`ValidationError`]; any body decoding as the
/// generic envelope is an [`Error`]; everything else degrades to an `Api`
/// error wrapping the raw body as its message.
#[must_use]
pub fn decode_error_response(status: u16, content_type: ContentType, body: &[u8]) -> ClientError {
    match content_type {
        ContentType::Json => {
            if status == 400 {
                if let Ok(validation) = serde_json::from_slice::<ValidationError>(body) {
                    return ClientError::Validation(validation);
                }
            }
            if let Ok(error) = serde_json::from_slice::<Error>(body) {
                if !error.message.is_empty() {
                    return ClientError::Api { status, error };
                }
            }
        }
        ContentType::Proto => {
            if status == 400 {
                if let Ok(validation) = ValidationError::decode(body) {
                    if !validation.violations.is_empty() {
                        return ClientError::Validation(validation);
                    }
                }
            }
            if let Ok(error) = Error::decode(body) {
                if !error.message.is_empty() {
                    return ClientError::Api { status, error };
                }
            }
        }
    }
    ClientError::Api {
        status,
        error: Error::new(String::from_utf8_lossy(body)),
    }
}
