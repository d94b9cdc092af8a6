//! The intermediate model: a language-neutral view of descriptors and
//! `protorest.http` annotations.
//!
//! Entities are created by the walker and immutable thereafter. Type
//! references between fields and their message/enum definitions are by full
//! name (no leading dot), resolved through [`Model::message`] and
//! [`Model::enum_def`] against the union of all files in the request.

use std::collections::HashMap;

use proto_rest_core::descriptor::FieldRules;
use proto_rest_core::{BytesEncoding, EnumEncoding, HttpMethod, Int64Encoding, TimestampFormat};

/// Root of the intermediate model.
///
/// Owns every entity. Messages and enums are stored flat in
/// first-discovered traversal order — the order back-ends emit them in —
/// with nested messages following their parent.
#[derive(Debug, Default)]
pub struct Model {
    files: Vec<File>,
    messages: Vec<Message>,
    enums: Vec<Enum>,
    message_index: HashMap<String, usize>,
    enum_index: HashMap<String, usize>,
}

impl Model {
    /// Assemble a model from prebuilt entities.
    ///
    /// The walker is the normal constructor; this is public so back-end
    /// tests and tools can build fixtures without descriptors.
    #[must_use]
    pub fn new(files: Vec<File>, messages: Vec<Message>, enums: Vec<Enum>) -> Self {
        let message_index = messages
            .iter()
            .enumerate()
            .map(|(i, m)| (m.fqn.clone(), i))
            .collect();
        let enum_index = enums
            .iter()
            .enumerate()
            .map(|(i, e)| (e.fqn.clone(), i))
            .collect();
        Self {
            files,
            messages,
            enums,
            message_index,
            enum_index,
        }
    }

    /// Files in request order. Only generate-flagged files carry services to
    /// emit, but dependency files contribute messages and enums.
    #[must_use]
    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// All messages across the request, in emission order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// All enums across the request, in emission order.
    #[must_use]
    pub fn enums(&self) -> &[Enum] {
        &self.enums
    }

    /// Resolve a message by full name (leading dot tolerated).
    #[must_use]
    pub fn message(&self, fqn: &str) -> Option<&Message> {
        self.message_index
            .get(fqn.trim_start_matches('.'))
            .map(|&i| &self.messages[i])
    }

    /// Resolve an enum by full name (leading dot tolerated).
    #[must_use]
    pub fn enum_def(&self, fqn: &str) -> Option<&Enum> {
        self.enum_index
            .get(fqn.trim_start_matches('.'))
            .map(|&i| &self.enums[i])
    }

    /// Messages transitively reachable from `roots`, in first-discovered
    /// order. Used by the TypeScript and OpenAPI back-ends, which emit the
    /// closure of a service's inputs and outputs.
    #[must_use]
    pub fn reachable_messages(&self, roots: &[&str]) -> Vec<&Message> {
        let mut seen: Vec<&str> = Vec::new();
        let mut queue: Vec<&str> = Vec::new();
        for root in roots {
            let root = root.trim_start_matches('.');
            if !seen.contains(&root) {
                seen.push(root);
                queue.push(root);
            }
        }

        let mut out = Vec::new();
        while !queue.is_empty() {
            let fqn = queue.remove(0);
            let Some(message) = self.message(fqn) else {
                continue;
            };
            out.push(message);
            for field in &message.fields {
                for referenced in field.referenced_messages() {
                    if let Some(next) = self.message(referenced) {
                        if !seen.contains(&next.fqn.as_str()) {
                            seen.push(&next.fqn);
                            queue.push(&next.fqn);
                        }
                    }
                }
            }
        }
        out
    }
}

/// One proto file of the request.
#[derive(Debug, Clone)]
pub struct File {
    /// Path as the compiler sent it, e.g. `shop/v1/shop.proto`.
    pub name: String,
    /// Proto package, e.g. `shop.v1`.
    pub package: String,
    /// Whether this file was named for generation (vs. a dependency).
    pub generate: bool,
    /// Full names of the file's top-level and nested messages, in source order.
    pub messages: Vec<String>,
    /// Full names of the file's enums, in source order.
    pub enums: Vec<String>,
    /// Services declared in the file, in source order.
    pub services: Vec<Service>,
}

impl File {
    /// File basename without directories or the `.proto` suffix, used to name
    /// emitted files (`shop.proto` → `shop_http.rs`).
    #[must_use]
    pub fn basename(&self) -> &str {
        let name = self.name.rsplit('/').next().unwrap_or(&self.name);
        name.strip_suffix(".proto").unwrap_or(name)
    }
}

/// A message definition.
#[derive(Debug, Clone)]
pub struct Message {
    /// Full name without leading dot, e.g. `shop.v1.Order.Item`.
    pub fqn: String,
    /// Local name within the package, dotted for nested messages
    /// (`Order.Item`).
    pub local_name: String,
    /// File the message was declared in.
    pub file: String,
    /// Proto package.
    pub package: String,
    /// Fields in declared order, oneof members included.
    pub fields: Vec<Field>,
    /// Oneof groups declared in the message.
    pub oneofs: Vec<Oneof>,
    /// Leading doc comment, empty when none.
    pub doc: String,
}

impl Message {
    /// Index of the field carrying `unwrap = true`, if any. The validator
    /// guarantees there is at most one.
    #[must_use]
    pub fn unwrap_field(&self) -> Option<usize> {
        self.fields.iter().position(|f| f.encoding.unwrap)
    }

    /// Whether the message's wire form collapses to its single field's value
    /// (exactly one field, marked `unwrap`).
    #[must_use]
    pub fn is_root_unwrap(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].encoding.unwrap
    }

    /// Type name for generated Rust and TypeScript code: the local name with
    /// nesting dots removed (`Order.Item` → `OrderItem`).
    #[must_use]
    pub fn type_name(&self) -> String {
        self.local_name.replace('.', "")
    }
}

/// What a field holds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// `double`
    Double,
    /// `float`
    Float,
    /// `int32`, `sint32`, `sfixed32`
    Int32,
    /// `int64`, `sint64`, `sfixed64`
    Int64,
    /// `uint32`, `fixed32`
    Uint32,
    /// `uint64`, `fixed64`
    Uint64,
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `bytes`
    Bytes,
    /// Enum reference by full name.
    Enum(String),
    /// Message reference by full name.
    Message(String),
    /// `google.protobuf.Timestamp`, primitive-shaped on every wire.
    Timestamp,
}

impl FieldKind {
    /// Path-variable eligibility: string, the integer families, bool, float,
    /// double. Bytes, enums, messages, and timestamps are not path material.
    #[must_use]
    pub fn is_path_scalar(&self) -> bool {
        matches!(
            self,
            Self::Double
                | Self::Float
                | Self::Int32
                | Self::Int64
                | Self::Uint32
                | Self::Uint64
                | Self::Bool
                | Self::String
        )
    }

    /// Whether the kind is a 64-bit integer subject to [`Int64Encoding`].
    #[must_use]
    pub fn is_int64(&self) -> bool {
        matches!(self, Self::Int64 | Self::Uint64)
    }
}

/// How often a field occurs.
#[derive(Debug, Clone, PartialEq)]
pub enum Cardinality {
    /// Exactly once (proto3 implicit presence).
    Singular,
    /// Explicit presence (`optional`, or a singular message field).
    Optional,
    /// `repeated`
    Repeated,
    /// `map<key, value>`; the synthetic entry message is collapsed into the
    /// key and value kinds and never surfaces as a standalone type.
    Map {
        /// Key kind (always a proto scalar).
        key: FieldKind,
        /// Value kind.
        value: FieldKind,
    },
}

/// JSON wire-format decisions for one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodingPolicy {
    /// 64-bit integer representation (string by default).
    pub int64: Int64Encoding,
    /// Bytes representation (padded base64 by default).
    pub bytes: BytesEncoding,
    /// Enum representation (value name by default).
    pub enums: EnumEncoding,
    /// Timestamp representation. `None` means not annotated; timestamp
    /// fields then default to RFC 3339. The validator rejects explicit
    /// formats on non-timestamp fields.
    pub timestamp: Option<TimestampFormat>,
    /// Absence surfaces as an explicit `null` instead of an omitted key.
    pub nullable: bool,
    /// Collapse the single-repeated/map wrapper on the wire.
    pub unwrap: bool,
    /// Inline the child message's fields into the parent, keys prefixed with
    /// the contained string (may be empty).
    pub flatten: Option<String>,
}

/// A message field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Proto field name (`snake_case`).
    pub name: String,
    /// JSON name per the descriptor (`camelCase` unless overridden).
    pub json_name: String,
    /// Field number.
    pub number: i32,
    /// Value kind; for maps this is the value kind and [`Cardinality::Map`]
    /// carries the key.
    pub kind: FieldKind,
    /// Occurrence.
    pub cardinality: Cardinality,
    /// Index into the owning message's oneofs, for oneof members.
    pub oneof_index: Option<usize>,
    /// JSON encoding decisions.
    pub encoding: EncodingPolicy,
    /// Query-parameter binding from the `query` option.
    pub query: Option<QueryBinding>,
    /// Example values from `field_examples`, in declaration order.
    pub examples: Vec<String>,
    /// Validation rules from the `rules` option.
    pub rules: Option<FieldRules>,
    /// Leading doc comment, empty when none.
    pub doc: String,
}

impl Field {
    /// Full names of messages this field references (map values included).
    #[must_use]
    pub fn referenced_messages(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        if let FieldKind::Message(fqn) = &self.kind {
            refs.push(fqn.as_str());
        }
        if let Cardinality::Map { value, .. } = &self.cardinality {
            if let FieldKind::Message(fqn) = value {
                refs.push(fqn.as_str());
            }
        }
        refs
    }

    /// The wire name of this field when used as a query parameter.
    #[must_use]
    pub fn query_name(&self) -> &str {
        match &self.query {
            Some(q) if !q.name.is_empty() => &q.name,
            _ => &self.name,
        }
    }
}

/// Query-parameter binding derived from the `query` field option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBinding {
    /// Wire parameter name; empty means the proto field name.
    pub name: String,
    /// Reject requests that omit the parameter.
    pub required: bool,
}

/// A oneof group.
#[derive(Debug, Clone)]
pub struct Oneof {
    /// Oneof name.
    pub name: String,
    /// Indices of member fields in the owning message.
    pub fields: Vec<usize>,
    /// Discriminator configuration, when annotated.
    pub discriminator: Option<OneofDiscriminator>,
    /// Leading doc comment, empty when none.
    pub doc: String,
}

/// Discriminator configuration for a oneof.
#[derive(Debug, Clone, PartialEq)]
pub struct OneofDiscriminator {
    /// Tag property name (defaults to the oneof name).
    pub property: String,
    /// Inline message variants next to the tag.
    pub flatten: bool,
    /// `(member field name, tag value)` in member declaration order.
    pub values: Vec<(String, String)>,
}

impl OneofDiscriminator {
    /// The tag value for a member field (defaults to the field name).
    #[must_use]
    pub fn value_for<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.values
            .iter()
            .find(|(f, _)| f == field_name)
            .map_or(field_name, |(_, v)| v.as_str())
    }
}

/// An enum definition.
#[derive(Debug, Clone)]
pub struct Enum {
    /// Full name without leading dot.
    pub fqn: String,
    /// Local name within the package, dotted for nested enums.
    pub local_name: String,
    /// File the enum was declared in.
    pub file: String,
    /// Proto package.
    pub package: String,
    /// Values in declared order.
    pub values: Vec<EnumValue>,
    /// Leading doc comment, empty when none.
    pub doc: String,
}

impl Enum {
    /// Type name for generated code, nesting dots removed.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.local_name.replace('.', "")
    }
}

/// One enum value.
#[derive(Debug, Clone)]
pub struct EnumValue {
    /// Proto value name.
    pub name: String,
    /// Proto value number.
    pub number: i32,
    /// Custom JSON token from the `enum_value` option.
    pub json_name: Option<String>,
    /// Leading doc comment, empty when none.
    pub doc: String,
}

impl EnumValue {
    /// The token written under NAME encoding: the custom JSON name when set,
    /// otherwise the proto name.
    #[must_use]
    pub fn wire_name(&self) -> &str {
        self.json_name.as_deref().unwrap_or(&self.name)
    }
}

/// A service.
#[derive(Debug, Clone)]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Base path from `service_config`, empty when unset.
    pub base_path: String,
    /// Methods in declared order.
    pub methods: Vec<Method>,
    /// Service-level headers in declared order.
    pub headers: Vec<Header>,
    /// Leading doc comment, empty when none.
    pub doc: String,
}

/// One RPC method.
#[derive(Debug, Clone)]
pub struct Method {
    /// Method name (`PascalCase` per proto convention).
    pub name: String,
    /// HTTP verb; `Unspecified` means POST.
    pub verb: HttpMethod,
    /// Path template from the `config` option, `{var}` segments included.
    pub path: String,
    /// Input message full name.
    pub input: String,
    /// Output message full name.
    pub output: String,
    /// Method-level headers in declared order.
    pub headers: Vec<Header>,
    /// Leading doc comment, empty when none.
    pub doc: String,
}

/// Declared wire type of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderType {
    /// Free-form string (the default).
    #[default]
    String,
    /// Integral number.
    Integer,
    /// Floating-point number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Comma-separated list.
    Array,
}

impl HeaderType {
    /// Parse the annotation's `type` string; empty and unknown values fall
    /// back to `String`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            _ => Self::String,
        }
    }

    /// OpenAPI schema type keyword.
    #[must_use]
    pub const fn as_openapi(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }
}

/// Declared format constraint of a string header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFormat {
    /// RFC 4122 UUID.
    Uuid,
    /// RFC 5322 address.
    Email,
    /// RFC 3339 date-time.
    DateTime,
    /// RFC 3339 full-date (`2025-01-15`).
    Date,
    /// RFC 3339 partial-time (`09:30:00`).
    Time,
}

impl HeaderFormat {
    /// Parse the annotation's `format` string; unknown values mean
    /// unconstrained.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uuid" => Some(Self::Uuid),
            "email" => Some(Self::Email),
            "date-time" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            _ => None,
        }
    }

    /// OpenAPI `format` keyword.
    #[must_use]
    pub const fn as_openapi(self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Email => "email",
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Time => "time",
        }
    }
}

/// A declared, validated HTTP header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Header name as sent on the wire.
    pub name: String,
    /// Human description, surfaced in OpenAPI and client docs.
    pub description: String,
    /// Declared wire type.
    pub ty: HeaderType,
    /// Format constraint for string headers.
    pub format: Option<HeaderFormat>,
    /// Reject requests that omit the header.
    pub required: bool,
    /// Example value.
    pub example: Option<String>,
    /// Usage is logged and flagged in OpenAPI.
    pub deprecated: bool,
}
