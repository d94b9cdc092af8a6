#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference
//!
//! # Types
//!
//! - [`Error`], [`ValidationError`], [`FieldViolation`] — the built-in error
//!   envelope produced by generated binders and decoded by generated clients
//! - [`HandlerError`] — what generated service traits return on failure
//! - [`HttpError`] — the capability every generated `*Error` message opts into
//! - [`validate_headers`] — declared-header validation for generated binders
//! - [`negotiate_request`] / [`negotiate_response`] — content-type selection
//! - [`parse_path_var`] / [`QueryMap`] — typed path and query binding
//! - [`serde`] — wire-format adapters (int64, bytes, timestamps, enums)
//! - [`json`] — prefix-flatten helpers for hand-rolled codec impls

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod runtime;

pub use runtime::*;

/// Serde adapters for the JSON wire-format rewrites.
///
/// Provides `#[serde(with = "...")]` modules generated code references:
/// - `int64_str` / `uint64_str` — 64-bit integers ↔ JSON strings
/// - `bytes_base64` (+ variants) — bytes ↔ base64/hex strings
/// - `timestamp_rfc3339` / `timestamp_date` / `timestamp_unix_seconds` /
///   `timestamp_unix_millis` — `Timestamp` ↔ its four wire shapes
///
/// Also provides the [`define_enum_serde`] macro for proto enum
/// `#[serde(with)]` modules under NAME encoding.
#[cfg(feature = "serde")]
pub mod serde;

/// JSON object helpers for the flatten rewrite.
pub mod json;
