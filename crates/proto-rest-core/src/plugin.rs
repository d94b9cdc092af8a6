//! Protoc plugin-protocol messages.
//!
//! The compiler driver writes a serialized [`CodeGeneratorRequest`] to the
//! plugin's standard input and reads a serialized [`CodeGeneratorResponse`]
//! from its standard output. These mirror `google.protobuf.compiler` but use
//! this crate's [`FileDescriptorProto`](crate::descriptor::FileDescriptorProto)
//! so the `protorest.http` option extensions survive decoding.

use crate::descriptor::FileDescriptorProto;

/// Feature flag: the plugin understands `optional` in proto3 files.
///
/// Reported in [`CodeGeneratorResponse::supported_features`]; without it the
/// compiler refuses to send proto3-optional fields to the plugin.
pub const FEATURE_PROTO3_OPTIONAL: u64 = 1;

#[allow(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
mod types {
    use prost::Message;

    use super::FileDescriptorProto;

    /// `google.protobuf.compiler.CodeGeneratorRequest`.
    #[derive(Clone, PartialEq, Message)]
    pub struct CodeGeneratorRequest {
        /// Files named on the protoc command line, relative to the import root.
        #[prost(string, repeated, tag = "1")]
        pub file_to_generate: Vec<String>,
        /// Comma-separated `key=value` plugin parameters.
        #[prost(string, optional, tag = "2")]
        pub parameter: Option<String>,
        /// Every file in the import closure, dependencies included,
        /// topologically ordered.
        #[prost(message, repeated, tag = "15")]
        pub proto_file: Vec<FileDescriptorProto>,
    }

    /// `google.protobuf.compiler.CodeGeneratorResponse`.
    #[derive(Clone, PartialEq, Message)]
    pub struct CodeGeneratorResponse {
        /// Non-empty on failure; the compiler prints it and exits non-zero.
        #[prost(string, optional, tag = "1")]
        pub error: Option<String>,
        /// Bitmask of `FEATURE_*` constants.
        #[prost(uint64, optional, tag = "2")]
        pub supported_features: Option<u64>,
        #[prost(message, repeated, tag = "15")]
        pub file: Vec<GeneratedFile>,
    }

    /// One generated output file.
    #[derive(Clone, PartialEq, Message)]
    pub struct GeneratedFile {
        /// Output path, relative to the compiler's output directory.
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "15")]
        pub content: Option<String>,
    }
}

pub use types::{CodeGeneratorRequest, CodeGeneratorResponse, GeneratedFile};

impl CodeGeneratorRequest {
    /// The plugin parameter string, or `""` when the compiler sent none.
    #[must_use]
    pub fn parameter_str(&self) -> &str {
        self.parameter.as_deref().unwrap_or("")
    }

    /// Whether `file_name` was named on the protoc command line (as opposed
    /// to arriving only as a dependency).
    #[must_use]
    pub fn is_file_to_generate(&self, file_name: &str) -> bool {
        self.file_to_generate.iter().any(|f| f == file_name)
    }
}

impl CodeGeneratorResponse {
    /// Build a success response from generated files.
    #[must_use]
    pub fn from_files(files: Vec<GeneratedFile>) -> Self {
        Self {
            error: None,
            supported_features: Some(FEATURE_PROTO3_OPTIONAL),
            file: files,
        }
    }

    /// Build a failure response. The compiler prints the message and exits
    /// non-zero; no files are written.
    #[must_use]
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            supported_features: Some(FEATURE_PROTO3_OPTIONAL),
            file: Vec::new(),
        }
    }
}

impl GeneratedFile {
    /// Build a generated file entry from a path and its full content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: Some(content.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use prost::Message as _;

    use super::*;

    #[test]
    fn request_round_trip() {
        let request = CodeGeneratorRequest {
            file_to_generate: vec!["shop.proto".to_string()],
            parameter: Some("format=json,paths=source_relative".to_string()),
            proto_file: vec![FileDescriptorProto {
                name: Some("shop.proto".to_string()),
                package: Some("shop.v1".to_string()),
                ..Default::default()
            }],
        };

        let bytes = request.encode_to_vec();
        let decoded = CodeGeneratorRequest::decode(bytes.as_slice()).unwrap();
        assert_eq!(request, decoded);
        assert_eq!(decoded.parameter_str(), "format=json,paths=source_relative");
        assert!(decoded.is_file_to_generate("shop.proto"));
        assert!(!decoded.is_file_to_generate("other.proto"));
    }

    #[test]
    fn parameter_defaults_to_empty() {
        let request = CodeGeneratorRequest::default();
        assert_eq!(request.parameter_str(), "");
    }

    #[test]
    fn success_response_reports_proto3_optional() {
        let response = CodeGeneratorResponse::from_files(vec![GeneratedFile::new(
            "shop_http.rs",
            "// generated\n",
        )]);
        assert!(response.error.is_none());
        assert_eq!(
            response.supported_features.unwrap() & FEATURE_PROTO3_OPTIONAL,
            FEATURE_PROTO3_OPTIONAL,
        );
        assert_eq!(response.file.len(), 1);
        assert_eq!(response.file[0].name(), "shop_http.rs");
    }

    #[test]
    fn error_response_carries_no_files() {
        let response = CodeGeneratorResponse::from_error("path variable {id} unresolved");
        assert_eq!(response.error(), "path variable {id} unresolved");
        assert!(response.file.is_empty());
    }
}
