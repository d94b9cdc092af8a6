//! Minimal protobuf descriptor types with `protorest.http` extension support.
//!
//! Standard `prost_types` descriptor messages drop the custom option
//! extensions during decoding because prost doesn't retain unknown fields.
//! These types declare the extensions at their fixed tags so they survive:
//!
//! | Extension | Target | Tag |
//! |---|---|---|
//! | `service_config` | `ServiceOptions` | 50001 |
//! | `service_headers` | `ServiceOptions` | 50002 |
//! | `config` | `MethodOptions` | 50101 |
//! | `method_headers` | `MethodOptions` | 50102 |
//! | `query` | `FieldOptions` | 50201 |
//! | `field_examples` | `FieldOptions` | 50202 |
//! | `unwrap` | `FieldOptions` | 50203 |
//! | `flatten` | `FieldOptions` | 50204 |
//! | `nullable` | `FieldOptions` | 50205 |
//! | `int64_encoding` | `FieldOptions` | 50206 |
//! | `bytes_encoding` | `FieldOptions` | 50207 |
//! | `enum_encoding` | `FieldOptions` | 50208 |
//! | `timestamp_format` | `FieldOptions` | 50209 |
//! | `rules` | `FieldOptions` | 50210 |
//! | `discriminator` | `OneofOptions` | 50301 |
//! | `enum_value` | `EnumValueOptions` | 50401 |
//!
//! Used by the descriptor walker, all four code-generation back-ends, and the
//! plugin protocol layer.

#[allow(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
mod types {
    use prost::Message;

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorSet {
        #[prost(message, repeated, tag = "1")]
        pub file: Vec<FileDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub package: Option<String>,
        #[prost(string, repeated, tag = "3")]
        pub dependency: Vec<String>,
        #[prost(message, repeated, tag = "4")]
        pub message_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "5")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, repeated, tag = "6")]
        pub service: Vec<ServiceDescriptorProto>,
        #[prost(message, optional, tag = "9")]
        pub source_code_info: Option<SourceCodeInfo>,
        #[prost(string, optional, tag = "12")]
        pub syntax: Option<String>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct DescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub field: Vec<FieldDescriptorProto>,
        #[prost(message, repeated, tag = "3")]
        pub nested_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "4")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, optional, tag = "7")]
        pub options: Option<MessageOptions>,
        #[prost(message, repeated, tag = "8")]
        pub oneof_decl: Vec<OneofDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MessageOptions {
        /// Set on the synthetic `*Entry` messages the compiler creates for
        /// map fields.
        #[prost(bool, optional, tag = "7")]
        pub map_entry: Option<bool>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FieldDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "3")]
        pub number: Option<i32>,
        /// Field label enum: 1=optional, 2=required, 3=repeated.
        #[prost(int32, optional, tag = "4")]
        pub label: Option<i32>,
        /// Protobuf field type enum: 1=double, 5=int32, 9=string, 11=message, 14=enum, …
        #[prost(int32, optional, tag = "5")]
        pub r#type: Option<i32>,
        /// Fully-qualified type name for message/enum fields (e.g., `.shop.v1.Order`).
        #[prost(string, optional, tag = "6")]
        pub type_name: Option<String>,
        #[prost(message, optional, tag = "8")]
        pub options: Option<FieldOptions>,
        #[prost(int32, optional, tag = "9")]
        pub oneof_index: Option<i32>,
        #[prost(string, optional, tag = "10")]
        pub json_name: Option<String>,
        #[prost(bool, optional, tag = "17")]
        pub proto3_optional: Option<bool>,
    }

    /// Field-level options carrying the `protorest.http` extensions.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldOptions {
        #[prost(message, optional, tag = "50201")]
        pub query: Option<QueryParam>,
        #[prost(message, optional, tag = "50202")]
        pub field_examples: Option<FieldExamples>,
        #[prost(bool, optional, tag = "50203")]
        pub unwrap: Option<bool>,
        #[prost(message, optional, tag = "50204")]
        pub flatten: Option<Flatten>,
        #[prost(bool, optional, tag = "50205")]
        pub nullable: Option<bool>,
        #[prost(enumeration = "super::Int64Encoding", optional, tag = "50206")]
        pub int64_encoding: Option<i32>,
        #[prost(enumeration = "super::BytesEncoding", optional, tag = "50207")]
        pub bytes_encoding: Option<i32>,
        #[prost(enumeration = "super::EnumEncoding", optional, tag = "50208")]
        pub enum_encoding: Option<i32>,
        #[prost(enumeration = "super::TimestampFormat", optional, tag = "50209")]
        pub timestamp_format: Option<i32>,
        #[prost(message, optional, tag = "50210")]
        pub rules: Option<FieldRules>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct OneofDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, optional, tag = "2")]
        pub options: Option<OneofOptions>,
    }

    /// Oneof-level options carrying the `discriminator` extension.
    #[derive(Clone, PartialEq, Message)]
    pub struct OneofOptions {
        #[prost(message, optional, tag = "50301")]
        pub discriminator: Option<Discriminator>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub value: Vec<EnumValueDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValueDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "2")]
        pub number: Option<i32>,
        #[prost(message, optional, tag = "3")]
        pub options: Option<EnumValueOptions>,
    }

    /// Enum-value options carrying the `enum_value` extension.
    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValueOptions {
        #[prost(message, optional, tag = "50401")]
        pub enum_value: Option<EnumValue>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub method: Vec<MethodDescriptorProto>,
        #[prost(message, optional, tag = "3")]
        pub options: Option<ServiceOptions>,
    }

    /// Service-level options carrying the `service_config` and
    /// `service_headers` extensions.
    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceOptions {
        #[prost(message, optional, tag = "50001")]
        pub service_config: Option<ServiceConfig>,
        #[prost(message, optional, tag = "50002")]
        pub service_headers: Option<ServiceHeaders>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MethodDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub input_type: Option<String>,
        #[prost(string, optional, tag = "3")]
        pub output_type: Option<String>,
        #[prost(message, optional, tag = "4")]
        pub options: Option<MethodOptions>,
        #[prost(bool, optional, tag = "5")]
        pub client_streaming: Option<bool>,
        #[prost(bool, optional, tag = "6")]
        pub server_streaming: Option<bool>,
    }

    /// Method-level options carrying the `config` and `method_headers`
    /// extensions.
    #[derive(Clone, PartialEq, Message)]
    pub struct MethodOptions {
        #[prost(message, optional, tag = "50101")]
        pub config: Option<MethodConfig>,
        #[prost(message, optional, tag = "50102")]
        pub method_headers: Option<MethodHeaders>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct SourceCodeInfo {
        #[prost(message, repeated, tag = "1")]
        pub location: Vec<Location>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Location {
        #[prost(int32, repeated, tag = "1")]
        pub path: Vec<i32>,
        #[prost(string, optional, tag = "3")]
        pub leading_comments: Option<String>,
        #[prost(string, optional, tag = "4")]
        pub trailing_comments: Option<String>,
    }

    // --- protorest.http option payloads ---

    /// `protorest.http.ServiceConfig` — service-wide HTTP configuration.
    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceConfig {
        #[prost(string, tag = "1")]
        pub base_path: String,
    }

    /// `protorest.http.ServiceHeaders` — headers applying to every method.
    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceHeaders {
        #[prost(message, repeated, tag = "1")]
        pub headers: Vec<Header>,
    }

    /// `protorest.http.MethodConfig` — per-method route configuration.
    #[derive(Clone, PartialEq, Message)]
    pub struct MethodConfig {
        #[prost(string, tag = "1")]
        pub path: String,
        #[prost(enumeration = "super::HttpMethod", tag = "2")]
        pub method: i32,
    }

    /// `protorest.http.MethodHeaders` — headers applying to one method.
    #[derive(Clone, PartialEq, Message)]
    pub struct MethodHeaders {
        #[prost(message, repeated, tag = "1")]
        pub headers: Vec<Header>,
    }

    /// `protorest.http.Header` — a declared, validated HTTP header.
    #[derive(Clone, PartialEq, Message)]
    pub struct Header {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, tag = "2")]
        pub description: String,
        /// One of: string, integer, number, boolean, array. Empty means string.
        #[prost(string, tag = "3")]
        pub r#type: String,
        /// One of: uuid, email, date-time, date, time. Empty means unconstrained.
        #[prost(string, tag = "4")]
        pub format: String,
        #[prost(bool, tag = "5")]
        pub required: bool,
        #[prost(string, tag = "6")]
        pub example: String,
        #[prost(bool, tag = "7")]
        pub deprecated: bool,
    }

    /// `protorest.http.QueryParam` — marks a request field as a query parameter.
    #[derive(Clone, PartialEq, Message)]
    pub struct QueryParam {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(bool, tag = "2")]
        pub required: bool,
    }

    /// `protorest.http.FieldExamples` — example values for a field.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldExamples {
        #[prost(string, repeated, tag = "1")]
        pub values: Vec<String>,
    }

    /// `protorest.http.Flatten` — inline a child message's fields into the parent.
    #[derive(Clone, PartialEq, Message)]
    pub struct Flatten {
        #[prost(string, tag = "1")]
        pub prefix: String,
    }

    /// `protorest.http.Discriminator` — variant tag configuration for a oneof.
    #[derive(Clone, PartialEq, Message)]
    pub struct Discriminator {
        #[prost(string, tag = "1")]
        pub property: String,
        #[prost(bool, tag = "2")]
        pub flatten: bool,
        #[prost(map = "string, string", tag = "3")]
        pub values: std::collections::HashMap<String, String>,
    }

    /// `protorest.http.FieldRules` — validation rules for a field.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldRules {
        #[prost(message, optional, tag = "1")]
        pub string: Option<StringRules>,
        #[prost(message, optional, tag = "2")]
        pub numeric: Option<NumericRules>,
        #[prost(message, optional, tag = "3")]
        pub repeated: Option<RepeatedRules>,
        #[prost(bool, tag = "4")]
        pub required: bool,
    }

    /// String validation rules.
    #[derive(Clone, PartialEq, Message)]
    pub struct StringRules {
        #[prost(uint64, tag = "1")]
        pub min_len: u64,
        #[prost(uint64, tag = "2")]
        pub max_len: u64,
        #[prost(string, tag = "3")]
        pub pattern: String,
        #[prost(string, repeated, tag = "4")]
        pub r#in: Vec<String>,
        /// One of: email, uuid, uri. Empty means unconstrained.
        #[prost(string, tag = "5")]
        pub well_known: String,
    }

    /// Numeric range rules. The `has_*` flags distinguish "bound at zero"
    /// from "no bound".
    #[derive(Clone, PartialEq, Message)]
    pub struct NumericRules {
        #[prost(double, tag = "1")]
        pub gt: f64,
        #[prost(double, tag = "2")]
        pub gte: f64,
        #[prost(double, tag = "3")]
        pub lt: f64,
        #[prost(double, tag = "4")]
        pub lte: f64,
        #[prost(bool, tag = "5")]
        pub has_gt: bool,
        #[prost(bool, tag = "6")]
        pub has_gte: bool,
        #[prost(bool, tag = "7")]
        pub has_lt: bool,
        #[prost(bool, tag = "8")]
        pub has_lte: bool,
    }

    /// Cardinality rules for repeated fields.
    #[derive(Clone, PartialEq, Message)]
    pub struct RepeatedRules {
        #[prost(uint64, tag = "1")]
        pub min_items: u64,
        #[prost(uint64, tag = "2")]
        pub max_items: u64,
        #[prost(bool, tag = "3")]
        pub has_min_items: bool,
        #[prost(bool, tag = "4")]
        pub has_max_items: bool,
    }

    /// `protorest.http.EnumValue` — custom JSON token for an enum value.
    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValue {
        #[prost(string, tag = "1")]
        pub value: String,
    }
}

pub use types::*;

/// `protorest.http.HttpMethod` — HTTP verbs assignable to a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum HttpMethod {
    /// Defaults to POST at route derivation time.
    Unspecified = 0,
    /// GET — no request body; query parameters allowed.
    Get = 1,
    /// POST.
    Post = 2,
    /// PUT.
    Put = 3,
    /// DELETE — no request body; query parameters allowed.
    Delete = 4,
    /// PATCH.
    Patch = 5,
}

impl HttpMethod {
    /// Uppercase verb as it appears on the wire and in OpenAPI keys (lowercased
    /// there by the emitter).
    #[must_use]
    pub const fn as_verb(self) -> &'static str {
        match self {
            Self::Unspecified | Self::Post => "POST",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Whether requests with this verb carry a body.
    #[must_use]
    pub const fn has_body(self) -> bool {
        !matches!(self, Self::Get | Self::Delete)
    }
}

/// `protorest.http.Int64Encoding` — JSON representation of 64-bit integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum Int64Encoding {
    /// JSON string, per the canonical proto3 JSON mapping.
    String = 0,
    /// JSON number. Precision above 2^53 is the caller's risk.
    Number = 1,
}

/// `protorest.http.BytesEncoding` — JSON representation of bytes fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum BytesEncoding {
    /// Standard base64 with padding.
    Base64 = 0,
    /// Standard base64, no padding.
    Base64Raw = 1,
    /// URL-safe base64 with padding.
    Base64Url = 2,
    /// URL-safe base64, no padding.
    Base64UrlRaw = 3,
    /// Lowercase hex.
    Hex = 4,
}

/// `protorest.http.EnumEncoding` — JSON representation of enum fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum EnumEncoding {
    /// Proto value name (or the `enum_value` override) as a JSON string.
    Name = 0,
    /// Proto value number as a JSON number.
    Number = 1,
}

/// `protorest.http.TimestampFormat` — JSON representation of
/// `google.protobuf.Timestamp` fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum TimestampFormat {
    /// RFC 3339 string (`"2025-01-15T09:30:00Z"`).
    Rfc3339 = 0,
    /// Calendar date string (`"2025-01-15"`).
    Date = 1,
    /// Integer seconds since the Unix epoch.
    UnixSeconds = 2,
    /// Integer milliseconds since the Unix epoch.
    UnixMillis = 3,
}

/// Proto field type constants (from `google.protobuf.FieldDescriptorProto.Type`).
pub mod field_type {
    /// `TYPE_DOUBLE = 1`
    pub const DOUBLE: i32 = 1;
    /// `TYPE_FLOAT = 2`
    pub const FLOAT: i32 = 2;
    /// `TYPE_INT64 = 3`
    pub const INT64: i32 = 3;
    /// `TYPE_UINT64 = 4`
    pub const UINT64: i32 = 4;
    /// `TYPE_INT32 = 5`
    pub const INT32: i32 = 5;
    /// `TYPE_FIXED64 = 6`
    pub const FIXED64: i32 = 6;
    /// `TYPE_FIXED32 = 7`
    pub const FIXED32: i32 = 7;
    /// `TYPE_BOOL = 8`
    pub const BOOL: i32 = 8;
    /// `TYPE_STRING = 9`
    pub const STRING: i32 = 9;
    /// `TYPE_GROUP = 10`
    pub const GROUP: i32 = 10;
    /// `TYPE_MESSAGE = 11`
    pub const MESSAGE: i32 = 11;
    /// `TYPE_BYTES = 12`
    pub const BYTES: i32 = 12;
    /// `TYPE_UINT32 = 13`
    pub const UINT32: i32 = 13;
    /// `TYPE_ENUM = 14`
    pub const ENUM: i32 = 14;
    /// `TYPE_SFIXED32 = 15`
    pub const SFIXED32: i32 = 15;
    /// `TYPE_SFIXED64 = 16`
    pub const SFIXED64: i32 = 16;
    /// `TYPE_SINT32 = 17`
    pub const SINT32: i32 = 17;
    /// `TYPE_SINT64 = 18`
    pub const SINT64: i32 = 18;
}

/// Proto field label constants (from `google.protobuf.FieldDescriptorProto.Label`).
pub mod field_label {
    /// `LABEL_OPTIONAL = 1`
    pub const OPTIONAL: i32 = 1;
    /// `LABEL_REQUIRED = 2`
    pub const REQUIRED: i32 = 2;
    /// `LABEL_REPEATED = 3`
    pub const REPEATED: i32 = 3;
}

/// Extract the route configuration from a method's options, if annotated.
#[must_use]
pub fn method_config(method: &MethodDescriptorProto) -> Option<&MethodConfig> {
    method.options.as_ref().and_then(|o| o.config.as_ref())
}

/// Extract the method-level header declarations, in declaration order.
#[must_use]
pub fn method_headers(method: &MethodDescriptorProto) -> &[Header] {
    method
        .options
        .as_ref()
        .and_then(|o| o.method_headers.as_ref())
        .map_or(&[], |h| h.headers.as_slice())
}

/// Extract the service-wide HTTP configuration, if annotated.
#[must_use]
pub fn service_config(service: &ServiceDescriptorProto) -> Option<&ServiceConfig> {
    service
        .options
        .as_ref()
        .and_then(|o| o.service_config.as_ref())
}

/// Extract the service-level header declarations, in declaration order.
#[must_use]
pub fn service_headers(service: &ServiceDescriptorProto) -> &[Header] {
    service
        .options
        .as_ref()
        .and_then(|o| o.service_headers.as_ref())
        .map_or(&[], |h| h.headers.as_slice())
}
