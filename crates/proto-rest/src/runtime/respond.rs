//! Response encoding for generated binders.
//!
//! Every terminal state of the request state machine writes a body and a
//! status through one of these two functions, in whichever content type was
//! negotiated.

use axum::response::{IntoResponse, Response};
use http::{header, StatusCode};

use super::error::HandlerError;
use super::negotiate::ContentType;

/// Encode a successful handler result.
///
/// JSON goes through the value's `Serialize` impl (which carries the wire
/// rewrites as serde attributes); binary proto through `prost::Message`.
/// A serialization failure — possible only for non-string JSON map keys and
/// similar shapes the generator never produces — degrades to a 500 envelope.
pub fn respond<T>(content_type: ContentType, value: &T) -> Response
where
    T: serde::Serialize + prost::Message,
{
    match content_type {
        ContentType::Json => match serde_json::to_vec(value) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, ContentType::Json.as_media_type())],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "response serialization failed");
                respond_error(content_type, &HandlerError::message(e.to_string()), None)
            }
        },
        ContentType::Proto => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, ContentType::Proto.as_media_type())],
            value.encode_to_vec(),
        )
            .into_response(),
    }
}

/// Encode a handler or binder error.
///
/// `status_override` carries the per-type status from the generated server
/// configuration; absent, the error's own status applies.
pub fn respond_error(
    content_type: ContentType,
    error: &HandlerError,
    status_override: Option<StatusCode>,
) -> Response {
    let status = status_override.unwrap_or_else(|| error.status_code());
    match content_type {
        ContentType::Json => {
            let body = serde_json::to_vec(error.json()).unwrap_or_default();
            (
                status,
                [(header::CONTENT_TYPE, ContentType::Json.as_media_type())],
                body,
            )
                .into_response()
        }
        ContentType::Proto => (
            status,
            [(header::CONTENT_TYPE, ContentType::Proto.as_media_type())],
            error.proto_bytes().to_vec(),
        )
            .into_response(),
    }
}
