//! The typed error envelope shared by generated binders and clients.
//!
//! Two shapes are built in: [`Error`] (generic, HTTP 500 by default) and
//! [`ValidationError`] (request validation, always HTTP 400). Generated
//! messages whose names end in `Error` opt into the same contract through
//! the [`HttpError`] trait, so handlers can return them and clients can
//! discriminate them by type.

use axum::extract::Json;
use axum::response::IntoResponse;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Generic error envelope: `{"message": "..."}`.
///
/// Produced for handler failures without a more specific type and for body
/// decode failures. Default status 500.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct Error {
    /// Human-readable description.
    #[prost(string, tag = "1")]
    pub message: String,
}

impl Error {
    /// Build an envelope from any displayable error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

impl std::error::Error for Error {}

/// A single failed check on one field or header.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field path or header name.
    #[prost(string, tag = "1")]
    pub field: String,
    /// What failed and why.
    #[prost(string, tag = "2")]
    pub description: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

/// Envelope for request validation failures: `{"violations": [...]}`.
///
/// Always paired with HTTP 400. Serializes `violations` even when empty so
/// the wire shape is stable.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct ValidationError {
    /// Failed checks, in validation order.
    #[prost(message, repeated, tag = "1")]
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Build an envelope from collected violations.
    #[must_use]
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Envelope with a single violation.
    #[must_use]
    pub fn single(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation::new(field, description)],
        }
    }

    /// Whether any check failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.violations.first() {
            Some(v) => write!(f, "ValidationError: {}: {}", v.field, v.description),
            None => write!(f, "ValidationError: validation failed"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// The error-surface contract: any generated message whose name ends in
/// `Error` implements this, making it returnable from handlers with a
/// configurable HTTP status (default 500).
///
/// The generator emits the impl by the suffix naming rule; the two built-ins
/// above are implemented here.
pub trait HttpError:
    std::error::Error + Serialize + prost::Message + Send + Sync + 'static
{
    /// Unqualified type name, used to look up per-type status overrides in
    /// the generated server configuration.
    const TYPE_NAME: &'static str;

    /// Status paired with the serialized value. Default 500.
    #[must_use]
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl HttpError for Error {
    const TYPE_NAME: &'static str = "Error";
}

impl HttpError for ValidationError {
    const TYPE_NAME: &'static str = "ValidationError";

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// What generated service trait methods return on failure.
///
/// Carries the serialized error in both wire forms so the binder can answer
/// in whichever content type was negotiated, plus the concrete type name so
/// per-type status overrides from the server configuration apply.
#[derive(Debug, Clone)]
pub struct HandlerError {
    type_name: &'static str,
    status: StatusCode,
    json: serde_json::Value,
    proto: Vec<u8>,
}

impl HandlerError {
    /// Wrap a typed error value.
    pub fn typed<E: HttpError>(err: E) -> Self {
        let status = err.status_code();
        let json = serde_json::to_value(&err)
            .unwrap_or_else(|e| serde_json::json!({ "message": e.to_string() }));
        let proto = err.encode_to_vec();
        Self {
            type_name: E::TYPE_NAME,
            status,
            json,
            proto,
        }
    }

    /// Wrap a bare message as the generic [`Error`] envelope (HTTP 500).
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::typed(Error::new(message))
    }

    /// Override the response status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Unqualified type name of the wrapped error.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The status the response will carry (before configuration overrides).
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// JSON form of the wrapped error.
    #[must_use]
    pub fn json(&self) -> &serde_json::Value {
        &self.json
    }

    /// Binary-proto form of the wrapped error.
    #[must_use]
    pub fn proto_bytes(&self) -> &[u8] {
        &self.proto
    }
}

impl<E: HttpError> From<E> for HandlerError {
    fn from(err: E) -> Self {
        Self::typed(err)
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.type_name, self.json)
    }
}

impl IntoResponse for HandlerError {
    /// JSON rendering; binders that negotiated binary proto go through
    /// [`respond_error`](crate::respond_error) instead.
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.json)).into_response()
    }
}
