//! Runtime types and utilities for generated HTTP binders and clients.
//!
//! This module provides the shared types generated code references:
//! - [`Error`] / [`ValidationError`] / [`FieldViolation`] — the error envelope
//! - [`HandlerError`] and the [`HttpError`] capability trait
//! - [`validate_headers`] — declared-header validation
//! - [`negotiate_request`] / [`negotiate_response`] — content-type selection
//! - [`parse_path_var`] / [`QueryMap`] — typed path and query binding
//! - [`respond`] / [`respond_error`] — response encoding per content type
//! - [`Mock`] — deterministic example-driven mock values

mod bind;
mod client;
mod error;
mod headers;
mod mock;
mod negotiate;
mod respond;

/// Field-rule checks backing generated `validate_*` functions.
pub mod rules;

pub use bind::{join_path, parse_path_var, QueryMap};
pub use client::{decode_error_response, ClientError};
pub use error::{Error, FieldViolation, HandlerError, HttpError, ValidationError};
pub use headers::{validate_headers, HeaderFormatKind, HeaderKind, HeaderSpec};
pub use mock::Mock;
pub use negotiate::{negotiate_request, negotiate_response, ContentType};
pub use respond::{respond, respond_error};
