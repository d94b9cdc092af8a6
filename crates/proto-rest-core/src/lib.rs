//! Shared protobuf descriptor types for the proto-rest plugin family.
//!
//! This crate provides custom [`prost::Message`] types that preserve the
//! `protorest.http` option extensions (fields 50001–50401) which standard
//! `prost_types` descriptor messages drop during decoding, along with the
//! `CodeGeneratorRequest`/`CodeGeneratorResponse` messages of the protoc
//! plugin protocol.
//!
//! All plugin crates (`proto-rest-model`, `proto-rest-gen`,
//! `proto-rest-openapi`) depend on these shared types. You should not need
//! to depend on this crate directly — use the higher-level crates instead.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod descriptor;
pub mod plugin;

pub use descriptor::{
    field_label, field_type, BytesEncoding, EnumEncoding, HttpMethod, Int64Encoding,
    TimestampFormat,
};
