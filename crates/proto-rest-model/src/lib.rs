//! Descriptor walker, intermediate model, and validator.
//!
//! The pipeline shared by every back-end:
//!
//! 1. [`walk`] a [`CodeGeneratorRequest`](proto_rest_core::plugin::CodeGeneratorRequest)
//!    into a [`Model`] — deterministic, source-ordered, no side effects.
//! 2. [`validate`] the model — fails fast on the first violated invariant
//!    with the offending service and method plus a remediation.
//! 3. Derive a [`Route`] per method and hand the model to an emitter.
//!
//! Messages and enums are resolved against the *whole* request (dependency
//! files included), so types referenced from imports that are not themselves
//! generate-flagged still appear in routes and responses.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod model;
mod route;
mod validate;
mod walker;

pub use model::{
    Cardinality, EncodingPolicy, Enum, EnumValue, Field, FieldKind, File, Header, HeaderFormat,
    HeaderType, Message, Method, Model, Oneof, OneofDiscriminator, Service,
};
pub use model::QueryBinding;
pub use route::{merge_headers, normalize_path, PathVar, QueryParam, Route, RouteError};
pub use validate::{validate, ValidateError};
pub use walker::{walk, WalkError};
