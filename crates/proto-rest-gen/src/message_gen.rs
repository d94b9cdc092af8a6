//! Message, enum, and oneof type emission.
//!
//! Produces the `<proto>_http.rs` module shared by the server and client
//! back-ends: prost-derived structs with serde attributes carrying the JSON
//! wire rewrites. Messages with oneofs or prefixed flatten fields get
//! hand-rolled `Serialize`/`Deserialize` impls built on the `proto-rest`
//! runtime helpers, since no serde attribute expresses those shapes.
//!
//! Each generated module is self-contained: dependency types reachable from
//! the file's own messages and services are emitted into the module, so no
//! cross-module imports are needed. Emission is deterministic, so two
//! modules sharing a dependency agree byte-for-byte on its definition.

use proto_rest_model::{
    Cardinality, Enum, Field, FieldKind, File, Message, Model, Oneof,
};
use proto_rest_core::{BytesEncoding, EnumEncoding, Int64Encoding, TimestampFormat};

use crate::naming::{enum_variant_name, rust_field_ident, to_pascal_case, to_snake_case};
use crate::printer::Printer;

/// Messages and enums to emit for one proto file: the file's own types plus
/// everything reachable from its messages and service signatures, in
/// first-discovered order.
pub(crate) fn collect_file_types<'a>(
    model: &'a Model,
    file: &File,
) -> (Vec<&'a Message>, Vec<&'a Enum>) {
    let mut roots: Vec<&str> = file.messages.iter().map(String::as_str).collect();
    for service in &file.services {
        for method in &service.methods {
            roots.push(&method.input);
            roots.push(&method.output);
        }
    }
    let messages = model.reachable_messages(&roots);

    let mut enums: Vec<&Enum> = Vec::new();
    let mut push_enum = |fqn: &str| {
        if let Some(e) = model.enum_def(fqn) {
            if !enums.iter().any(|known| known.fqn == e.fqn) {
                enums.push(e);
            }
        }
    };
    for fqn in &file.enums {
        push_enum(fqn);
    }
    for message in &messages {
        for field in &message.fields {
            if let FieldKind::Enum(fqn) = &field.kind {
                push_enum(fqn);
            }
            if let Cardinality::Map { value, .. } = &field.cardinality {
                if let FieldKind::Enum(fqn) = value {
                    push_enum(fqn);
                }
            }
        }
    }
    (messages, enums)
}

/// Emit the full types module for one proto file.
pub(crate) fn emit_types(model: &Model, file: &File, tool: &str) -> String {
    let (messages, enums) = collect_file_types(model, file);

    let mut p = Printer::new();
    p.line(&format!("// Code generated by {tool}. DO NOT EDIT."));
    p.line(&format!("// source: {}", file.name));
    p.line("");
    p.line("#![allow(clippy::all, clippy::pedantic)]");
    p.line("");

    for enum_def in &enums {
        emit_enum(&mut p, enum_def);
        p.line("");
    }

    if !enums.is_empty() {
        emit_enum_serde_module(&mut p, &enums);
        p.line("");
    }

    for message in &messages {
        emit_message(&mut p, model, message);
        p.line("");
    }

    p.finish()
}

fn emit_enum(p: &mut Printer, enum_def: &Enum) {
    let name = enum_def.type_name();
    // Variant prefixes follow the enum's simple name even when nested.
    let simple = enum_def.local_name.rsplit('.').next().unwrap_or(&enum_def.local_name);
    p.doc(&enum_def.doc);
    p.line("#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]");
    p.line("#[repr(i32)]");
    p.open(&format!("pub enum {name} {{"));
    for value in &enum_def.values {
        p.doc(&value.doc);
        p.line(&format!(
            "{} = {},",
            enum_variant_name(simple, &value.name),
            value.number,
        ));
    }
    p.close("}");
    p.line("");

    p.open(&format!("impl {name} {{"));
    p.line("/// Proto value name.");
    p.open("pub fn as_str_name(self) -> &'static str {");
    p.open("match self {");
    for value in &enum_def.values {
        p.line(&format!(
            "Self::{} => \"{}\",",
            enum_variant_name(simple, &value.name),
            value.name,
        ));
    }
    p.close("}");
    p.close("}");
    p.line("");
    p.line("/// Wire token under NAME encoding (the `enum_value` override when");
    p.line("/// set, the proto name otherwise).");
    p.open("pub fn as_json_name(self) -> &'static str {");
    p.open("match self {");
    for value in &enum_def.values {
        p.line(&format!(
            "Self::{} => \"{}\",",
            enum_variant_name(simple, &value.name),
            value.wire_name(),
        ));
    }
    p.close("}");
    p.close("}");
    p.line("");
    p.line("/// Parse a wire token or proto value name.");
    p.open("pub fn from_json_name(value: &str) -> Option<Self> {");
    p.open("match value {");
    for value in &enum_def.values {
        let variant = enum_variant_name(simple, &value.name);
        if value.wire_name() == value.name {
            p.line(&format!("\"{}\" => Some(Self::{variant}),", value.name));
        } else {
            p.line(&format!(
                "\"{}\" | \"{}\" => Some(Self::{variant}),",
                value.wire_name(),
                value.name,
            ));
        }
    }
    p.line("_ => None,");
    p.close("}");
    p.close("}");
    p.close("}");
}

fn emit_enum_serde_module(p: &mut Printer, enums: &[&Enum]) {
    p.line("/// Serde adapters for NAME-encoded enum fields.");
    p.open("pub mod enum_serde {");
    p.line("#![allow(missing_docs)]");
    for enum_def in enums {
        p.line(&format!(
            "::proto_rest::define_enum_serde!({}, super::{});",
            to_snake_case(&enum_def.type_name()),
            enum_def.type_name(),
        ));
    }
    p.close("}");
}

/// Whether a message needs hand-rolled serde impls: oneofs, flatten, and
/// unwrap have no faithful serde attribute equivalent (`#[serde(flatten)]`
/// on an `Option` cannot distinguish an absent child from a present empty
/// one, and `#[serde(transparent)]` would bypass the field's encoding
/// adapter).
pub(crate) fn needs_manual_serde(message: &Message) -> bool {
    message.is_root_unwrap()
        || !message.oneofs.is_empty()
        || message.fields.iter().any(|f| f.encoding.flatten.is_some())
}

fn emit_message(p: &mut Printer, model: &Model, message: &Message) {
    let name = message.type_name();
    let manual = needs_manual_serde(message);

    p.doc(&message.doc);
    if manual {
        p.line("#[derive(Clone, PartialEq, ::prost::Message)]");
    } else {
        p.line("#[derive(Clone, PartialEq, ::prost::Message, ::serde::Serialize, ::serde::Deserialize)]");
    }
    p.open(&format!("pub struct {name} {{"));
    for field in &message.fields {
        if field.oneof_index.is_some() {
            continue;
        }
        p.doc(&field.doc);
        p.line(&prost_attr(model, field));
        if !manual {
            if let Some(attr) = serde_attr(model, field) {
                p.line(&attr);
            }
        }
        p.line(&format!(
            "pub {}: {},",
            rust_field_ident(&field.name),
            rust_type(model, field),
        ));
    }
    for oneof in &message.oneofs {
        let enum_name = oneof_enum_name(message, oneof);
        let tags: Vec<String> = oneof
            .fields
            .iter()
            .map(|&i| message.fields[i].number.to_string())
            .collect();
        p.doc(&oneof.doc);
        p.line(&format!(
            "#[prost(oneof = \"{enum_name}\", tags = \"{}\")]",
            tags.join(", "),
        ));
        p.line(&format!(
            "pub {}: Option<{enum_name}>,",
            rust_field_ident(&oneof.name),
        ));
    }
    p.close("}");

    for oneof in &message.oneofs {
        p.line("");
        emit_oneof_enum(p, model, message, oneof);
    }

    if manual {
        p.line("");
        emit_manual_serialize(p, model, message);
        p.line("");
        emit_manual_deserialize(p, model, message);
    }

    // The error-surface convention: any message whose name ends in `Error`
    // is returnable from handlers, with a message drawn from its first
    // string field.
    if name.ends_with("Error") {
        p.line("");
        emit_error_contract(p, message, &name);
    }
}

fn emit_error_contract(p: &mut Printer, message: &Message, name: &str) {
    let message_field = message
        .fields
        .iter()
        .find(|f| {
            f.kind == FieldKind::String && matches!(f.cardinality, Cardinality::Singular)
        })
        .map(|f| rust_field_ident(&f.name));

    p.open(&format!("impl ::std::fmt::Display for {name} {{"));
    p.open("fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {");
    match &message_field {
        Some(field) => p.line(&format!("write!(f, \"{name}: {{}}\", self.{field})")),
        None => p.line(&format!("write!(f, \"{name}\")")),
    }
    p.close("}");
    p.close("}");
    p.line("");
    p.line(&format!("impl ::std::error::Error for {name} {{}}"));
    p.line("");
    p.open(&format!("impl ::proto_rest::HttpError for {name} {{"));
    p.line(&format!("const TYPE_NAME: &'static str = \"{name}\";"));
    p.close("}");
}

pub(crate) fn oneof_enum_name(message: &Message, oneof: &Oneof) -> String {
    format!("{}{}", message.type_name(), to_pascal_case(&oneof.name))
}

fn emit_oneof_enum(p: &mut Printer, model: &Model, message: &Message, oneof: &Oneof) {
    let enum_name = oneof_enum_name(message, oneof);
    p.line(&format!("/// Variants of the `{}` oneof.", oneof.name));
    p.line("#[derive(Clone, PartialEq, ::prost::Oneof)]");
    p.open(&format!("pub enum {enum_name} {{"));
    for &index in &oneof.fields {
        let field = &message.fields[index];
        p.line(&format!(
            "#[prost({}, tag = \"{}\")]",
            prost_kind_token(model, &field.kind),
            field.number,
        ));
        p.line(&format!(
            "{}({}),",
            to_pascal_case(&field.name),
            scalar_rust_type(model, &field.kind),
        ));
    }
    p.close("}");
}

// --- prost attributes and Rust types ---

fn prost_kind_token(model: &Model, kind: &FieldKind) -> String {
    match kind {
        FieldKind::Double => "double".to_string(),
        FieldKind::Float => "float".to_string(),
        FieldKind::Int32 => "int32".to_string(),
        FieldKind::Int64 => "int64".to_string(),
        FieldKind::Uint32 => "uint32".to_string(),
        FieldKind::Uint64 => "uint64".to_string(),
        FieldKind::Bool => "bool".to_string(),
        FieldKind::String => "string".to_string(),
        FieldKind::Bytes => "bytes = \"vec\"".to_string(),
        FieldKind::Enum(fqn) => format!(
            "enumeration = \"{}\"",
            model.enum_def(fqn).map_or_else(|| "i32".to_string(), Enum::type_name),
        ),
        FieldKind::Message(_) | FieldKind::Timestamp => "message".to_string(),
    }
}

fn map_kind_token(model: &Model, kind: &FieldKind) -> String {
    match kind {
        FieldKind::Enum(fqn) => format!(
            "enumeration({})",
            model.enum_def(fqn).map_or_else(|| "i32".to_string(), Enum::type_name),
        ),
        FieldKind::Bytes => "bytes".to_string(),
        other => prost_kind_token(model, other),
    }
}

fn prost_attr(model: &Model, field: &Field) -> String {
    match &field.cardinality {
        Cardinality::Map { key, value } => format!(
            "#[prost(map = \"{}, {}\", tag = \"{}\")]",
            map_kind_token(model, key),
            map_kind_token(model, value),
            field.number,
        ),
        Cardinality::Repeated => format!(
            "#[prost({}, repeated, tag = \"{}\")]",
            prost_kind_token(model, &field.kind),
            field.number,
        ),
        Cardinality::Optional => format!(
            "#[prost({}, optional, tag = \"{}\")]",
            prost_kind_token(model, &field.kind),
            field.number,
        ),
        Cardinality::Singular => format!(
            "#[prost({}, tag = \"{}\")]",
            prost_kind_token(model, &field.kind),
            field.number,
        ),
    }
}

fn scalar_rust_type(model: &Model, kind: &FieldKind) -> String {
    match kind {
        FieldKind::Double => "f64".to_string(),
        FieldKind::Float => "f32".to_string(),
        FieldKind::Int32 => "i32".to_string(),
        FieldKind::Int64 => "i64".to_string(),
        FieldKind::Uint32 => "u32".to_string(),
        FieldKind::Uint64 => "u64".to_string(),
        FieldKind::Bool => "bool".to_string(),
        FieldKind::String => "String".to_string(),
        FieldKind::Bytes => "Vec<u8>".to_string(),
        // Enums are open in proto3; the typed view goes through the accessor.
        FieldKind::Enum(_) => "i32".to_string(),
        FieldKind::Message(fqn) => model
            .message(fqn)
            .map_or_else(|| "()".to_string(), Message::type_name),
        FieldKind::Timestamp => "::prost_types::Timestamp".to_string(),
    }
}

pub(crate) fn rust_type(model: &Model, field: &Field) -> String {
    let base = scalar_rust_type(model, &field.kind);
    match &field.cardinality {
        Cardinality::Singular => base,
        Cardinality::Optional => format!("Option<{base}>"),
        Cardinality::Repeated => format!("Vec<{base}>"),
        Cardinality::Map { key, .. } => format!(
            "::std::collections::HashMap<{}, {base}>",
            scalar_rust_type(model, key),
        ),
    }
}

// --- serde attributes (derive path) ---

/// The `with`-adapter module for a field, if its encoding needs one.
fn adapter(model: &Model, field: &Field) -> Option<String> {
    let base = match &field.kind {
        FieldKind::Int64 if field.encoding.int64 == Int64Encoding::String => {
            "::proto_rest::serde::int64_str".to_string()
        }
        FieldKind::Uint64 if field.encoding.int64 == Int64Encoding::String => {
            "::proto_rest::serde::uint64_str".to_string()
        }
        FieldKind::Bytes => format!(
            "::proto_rest::serde::{}",
            match field.encoding.bytes {
                BytesEncoding::Base64 => "bytes_base64",
                BytesEncoding::Base64Raw => "bytes_base64_raw",
                BytesEncoding::Base64Url => "bytes_base64url",
                BytesEncoding::Base64UrlRaw => "bytes_base64url_raw",
                BytesEncoding::Hex => "bytes_hex",
            },
        ),
        FieldKind::Enum(fqn) if field.encoding.enums == EnumEncoding::Name => {
            let enum_name = model.enum_def(fqn).map_or_else(|| "i32".to_string(), Enum::type_name);
            format!("enum_serde::{}", to_snake_case(&enum_name))
        }
        FieldKind::Timestamp => format!(
            "::proto_rest::serde::{}",
            match field.encoding.timestamp.unwrap_or_default() {
                TimestampFormat::Rfc3339 => "timestamp_rfc3339",
                TimestampFormat::Date => "timestamp_date",
                TimestampFormat::UnixSeconds => "timestamp_unix_seconds",
                TimestampFormat::UnixMillis => "timestamp_unix_millis",
            },
        ),
        _ => return map_adapter(model, field),
    };

    Some(match &field.cardinality {
        Cardinality::Singular => base,
        Cardinality::Optional => format!("{base}::optional"),
        Cardinality::Repeated => format!("{base}::repeated"),
        // Encoding overrides for map values are limited to int64; see
        // `map_adapter`.
        Cardinality::Map { .. } => return map_adapter(model, field),
    })
}

/// Map-specific adapters: int64-valued string-keyed maps keep the STRING
/// encoding; non-string keys are stringified. Other value encodings inside
/// maps use their default JSON form.
fn map_adapter(model: &Model, field: &Field) -> Option<String> {
    let _ = model;
    let Cardinality::Map { key, .. } = &field.cardinality else {
        return None;
    };
    let string_key = *key == FieldKind::String;
    match &field.kind {
        FieldKind::Int64 if string_key && field.encoding.int64 == Int64Encoding::String => {
            Some("::proto_rest::serde::map_int64_str".to_string())
        }
        FieldKind::Uint64 if string_key && field.encoding.int64 == Int64Encoding::String => {
            Some("::proto_rest::serde::map_uint64_str".to_string())
        }
        _ if !string_key => Some("::proto_rest::serde::map_key".to_string()),
        _ => None,
    }
}

fn serde_attr(model: &Model, field: &Field) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(with) = adapter(model, field) {
        parts.push(format!("with = \"{with}\""));
    }
    if field.json_name != field.name {
        parts.push(format!("rename = \"{}\"", field.json_name));
    }
    if matches!(field.cardinality, Cardinality::Optional) && !field.encoding.nullable {
        parts.push("skip_serializing_if = \"Option::is_none\"".to_string());
    }
    parts.push("default".to_string());
    Some(format!("#[serde({})]", parts.join(", ")))
}

// --- hand-rolled serde impls (oneofs, prefixed flatten) ---

/// Expression producing the JSON `Value` for a field, honoring its adapter.
fn encode_expr(model: &Model, field: &Field, access: &str) -> String {
    match adapter(model, field) {
        Some(with) => format!(
            "{with}::serialize({access}, ::serde_json::value::Serializer).map_err(S::Error::custom)?",
        ),
        None => format!("::serde_json::to_value({access}).map_err(S::Error::custom)?"),
    }
}

/// Expression decoding a JSON `Value` (bound as `value`) into a field value.
fn decode_expr(model: &Model, field: &Field) -> String {
    match adapter(model, field) {
        Some(with) => format!("{with}::deserialize(value).map_err(D::Error::custom)?"),
        None => "::serde_json::from_value(value).map_err(D::Error::custom)?".to_string(),
    }
}

fn emit_manual_serialize(p: &mut Printer, model: &Model, message: &Message) {
    let name = message.type_name();
    p.open(&format!("impl ::serde::Serialize for {name} {{"));
    p.open("fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {");
    p.line("use ::serde::ser::Error as _;");

    // An unwrapped wrapper's wire form is its single field's value.
    if message.is_root_unwrap() {
        let field = &message.fields[0];
        p.line(&format!(
            "let value = {};",
            encode_expr(model, field, &format!("&self.{}", rust_field_ident(&field.name))),
        ));
        p.line("value.serialize(serializer)");
        p.close("}");
        p.close("}");
        return;
    }

    p.line("let mut object = ::serde_json::Map::new();");

    for field in &message.fields {
        if field.oneof_index.is_some() {
            continue;
        }
        let ident = rust_field_ident(&field.name);
        let key = &field.json_name;

        if let Some(prefix) = field.encoding.flatten.as_deref().filter(|p| !p.is_empty()) {
            p.open(&format!("if let Some(child) = &self.{ident} {{"));
            p.line("let child = ::serde_json::to_value(child).map_err(S::Error::custom)?;");
            p.line(&format!(
                "::proto_rest::json::merge_flattened(&mut object, child, \"{prefix}\");",
            ));
            p.close("}");
            continue;
        }
        if field.encoding.flatten.is_some() {
            // Unprefixed flatten: same merge with an empty prefix.
            p.open(&format!("if let Some(child) = &self.{ident} {{"));
            p.line("let child = ::serde_json::to_value(child).map_err(S::Error::custom)?;");
            p.line("::proto_rest::json::merge_flattened(&mut object, child, \"\");");
            p.close("}");
            continue;
        }

        if matches!(field.cardinality, Cardinality::Optional) {
            if field.encoding.nullable {
                p.line(&format!(
                    "object.insert(\"{key}\".to_string(), {});",
                    encode_expr(model, field, &format!("&self.{ident}")),
                ));
            } else {
                p.open(&format!("if self.{ident}.is_some() {{"));
                p.line(&format!(
                    "object.insert(\"{key}\".to_string(), {});",
                    encode_expr(model, field, &format!("&self.{ident}")),
                ));
                p.close("}");
            }
        } else {
            p.line(&format!(
                "object.insert(\"{key}\".to_string(), {});",
                encode_expr(model, field, &format!("&self.{ident}")),
            ));
        }
    }

    for oneof in &message.oneofs {
        let enum_name = oneof_enum_name(message, oneof);
        let oneof_ident = rust_field_ident(&oneof.name);
        p.open(&format!("match &self.{oneof_ident} {{"));
        for &index in &oneof.fields {
            let field = &message.fields[index];
            let variant = to_pascal_case(&field.name);
            p.open(&format!("Some({enum_name}::{variant}(value)) => {{"));
            if let Some(disc) = &oneof.discriminator {
                p.line(&format!(
                    "object.insert(\"{}\".to_string(), ::serde_json::Value::String(\"{}\".to_string()));",
                    disc.property,
                    disc.value_for(&field.name),
                ));
                if disc.flatten {
                    p.line("let child = ::serde_json::to_value(value).map_err(S::Error::custom)?;");
                    p.line("::proto_rest::json::merge_flattened(&mut object, child, \"\");");
                } else {
                    p.line(&format!(
                        "object.insert(\"{}\".to_string(), ::serde_json::to_value(value).map_err(S::Error::custom)?);",
                        field.json_name,
                    ));
                }
            } else {
                p.line(&format!(
                    "object.insert(\"{}\".to_string(), ::serde_json::to_value(value).map_err(S::Error::custom)?);",
                    field.json_name,
                ));
            }
            p.close("}");
        }
        p.line("None => {}");
        p.close("}");
    }

    p.line("object.serialize(serializer)");
    p.close("}");
    p.close("}");
}

fn emit_manual_deserialize(p: &mut Printer, model: &Model, message: &Message) {
    let name = message.type_name();
    p.open(&format!("impl<'de> ::serde::Deserialize<'de> for {name} {{"));
    p.open("fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {");
    p.line("use ::serde::de::Error as _;");
    p.line("let value = ::serde_json::Value::deserialize(deserializer)?;");

    // An unwrapped wrapper lifts the whole value back into its field.
    if message.is_root_unwrap() {
        let field = &message.fields[0];
        p.line("let mut message = Self::default();");
        p.line(&format!(
            "message.{} = {};",
            rust_field_ident(&field.name),
            decode_expr(model, field),
        ));
        p.line("Ok(message)");
        p.close("}");
        p.close("}");
        return;
    }

    p.open("let ::serde_json::Value::Object(mut object) = value else {");
    p.line("return Err(D::Error::custom(\"expected a JSON object\"));");
    p.close("};");
    p.line("let mut message = Self::default();");

    for field in &message.fields {
        if field.oneof_index.is_some() {
            continue;
        }
        let ident = rust_field_ident(&field.name);
        let key = &field.json_name;

        if let Some(prefix) = &field.encoding.flatten {
            let child_keys = flatten_child_keys(model, field);
            p.open("{");
            p.line(&format!(
                "let child = ::proto_rest::json::split_flattened(&mut object, \"{prefix}\", &[{child_keys}]);",
            ));
            p.open("if !child.is_empty() {");
            p.line(&format!(
                "message.{ident} = Some(::serde_json::from_value(::serde_json::Value::Object(child)).map_err(D::Error::custom)?);",
            ));
            p.close("}");
            p.close("}");
            continue;
        }

        p.open(&format!("if let Some(value) = object.remove(\"{key}\") {{"));
        p.open("if !value.is_null() {");
        p.line(&format!(
            "message.{ident} = {};",
            decode_expr(model, field),
        ));
        p.close("}");
        p.close("}");
    }

    for oneof in &message.oneofs {
        let enum_name = oneof_enum_name(message, oneof);
        let oneof_ident = rust_field_ident(&oneof.name);
        if let Some(disc) = &oneof.discriminator {
            p.open(&format!(
                "if let Some(tag) = object.remove(\"{}\") {{",
                disc.property,
            ));
            p.line(&format!(
                "let tag = tag.as_str().ok_or_else(|| D::Error::custom(\"discriminator '{}' must be a string\"))?.to_string();",
                disc.property,
            ));
            p.open(&format!("message.{oneof_ident} = Some(match tag.as_str() {{"));
            for &index in &oneof.fields {
                let field = &message.fields[index];
                let variant = to_pascal_case(&field.name);
                if disc.flatten {
                    p.line(&format!(
                        "\"{}\" => {enum_name}::{variant}(::serde_json::from_value(::serde_json::Value::Object(object.clone())).map_err(D::Error::custom)?),",
                        disc.value_for(&field.name),
                    ));
                } else {
                    p.line(&format!(
                        "\"{}\" => {enum_name}::{variant}(::serde_json::from_value(object.remove(\"{}\").unwrap_or(::serde_json::Value::Null)).map_err(D::Error::custom)?),",
                        disc.value_for(&field.name),
                        field.json_name,
                    ));
                }
            }
            p.line(&format!(
                "_ => return Err(D::Error::custom(::proto_rest::json::UnknownVariant::new(\"{}\", &tag))),",
                disc.property,
            ));
            p.close("});");
            p.close("}");
        } else {
            for &index in &oneof.fields {
                let field = &message.fields[index];
                let variant = to_pascal_case(&field.name);
                p.open(&format!(
                    "if let Some(value) = object.remove(\"{}\") {{",
                    field.json_name,
                ));
                p.line(&format!(
                    "message.{oneof_ident} = Some({enum_name}::{variant}(::serde_json::from_value(value).map_err(D::Error::custom)?));",
                ));
                p.close("}");
            }
        }
    }

    p.line("Ok(message)");
    p.close("}");
    p.close("}");
}

/// Quoted child field keys for a flattened message field.
fn flatten_child_keys(model: &Model, field: &Field) -> String {
    let FieldKind::Message(child_fqn) = &field.kind else {
        return String::new();
    };
    let Some(child) = model.message(child_fqn) else {
        return String::new();
    };
    child
        .fields
        .iter()
        .map(|f| format!("\"{}\"", f.json_name))
        .collect::<Vec<_>>()
        .join(", ")
}
