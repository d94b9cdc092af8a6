//! Descriptor walk: turn a `CodeGeneratorRequest` into the intermediate
//! model.
//!
//! The walk is deterministic — output order follows source order, never map
//! iteration order — and has no side effects. Messages and enums from every
//! file in the request are indexed so references from generate-flagged files
//! into dependencies resolve. Unknown option extensions have already been
//! dropped by the descriptor decoder; anything else unrecognized is ignored
//! for forward compatibility.

use std::collections::HashMap;

use proto_rest_core::descriptor::{
    self, DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    Location,
};
use proto_rest_core::plugin::CodeGeneratorRequest;
use proto_rest_core::{field_label, field_type};

use crate::model::{
    Cardinality, EncodingPolicy, Enum, EnumValue, Field, FieldKind, File, Header, HeaderFormat,
    HeaderType, Message, Method, Model, Oneof, OneofDiscriminator, QueryBinding, Service,
};

/// Full name of the well-known timestamp type, primitive-shaped everywhere.
const TIMESTAMP_FQN: &str = "google.protobuf.Timestamp";

/// Error building the model from malformed descriptors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WalkError {
    /// A descriptor entity is missing its name.
    #[error("descriptor in '{file}' is missing a name")]
    MissingName {
        /// File the entity was declared in.
        file: String,
    },

    /// A field references a type the request does not contain.
    #[error("field '{field}' references unknown type '{type_name}'")]
    UnknownType {
        /// The referencing field's name.
        field: String,
        /// The unresolved full name.
        type_name: String,
    },

    /// A method's input or output message is not part of the request.
    #[error("method '{service}.{method}' references unknown message '{type_name}'")]
    UnknownMessage {
        /// Service name.
        service: String,
        /// Method name.
        method: String,
        /// The unresolved full name.
        type_name: String,
    },

    /// A synthetic map entry message is missing its key or value field.
    #[error("map entry '{entry}' is malformed (expected key #1 and value #2)")]
    MalformedMapEntry {
        /// The entry message's full name.
        entry: String,
    },
}

/// Walk the request into a [`Model`].
///
/// # Errors
///
/// Returns a [`WalkError`] on malformed descriptors or unresolved type
/// references. Annotation *semantics* are not checked here — that is the
/// validator's job.
pub fn walk(request: &CodeGeneratorRequest) -> Result<Model, WalkError> {
    let registry = Registry::build(request);

    let mut messages = Vec::new();
    for entry in &registry.messages {
        if entry.map_entry {
            continue;
        }
        messages.push(build_message(entry, &registry)?);
    }

    let mut enums = Vec::new();
    for entry in &registry.enums {
        enums.push(build_enum(entry));
    }

    let mut files = Vec::new();
    for file in &request.proto_file {
        files.push(build_file(file, request, &registry)?);
    }

    Ok(Model::new(files, messages, enums))
}

/// A message discovered during the indexing pass.
struct MessageEntry<'a> {
    fqn: String,
    local_name: String,
    file: String,
    package: String,
    descriptor: &'a DescriptorProto,
    map_entry: bool,
    doc: String,
    /// Descriptor path for comment lookups on members.
    path: Vec<i32>,
}

struct EnumEntry<'a> {
    fqn: String,
    local_name: String,
    file: String,
    package: String,
    descriptor: &'a EnumDescriptorProto,
    doc: String,
    path: Vec<i32>,
}

/// Index of every message and enum in the request, discovery-ordered.
struct Registry<'a> {
    messages: Vec<MessageEntry<'a>>,
    enums: Vec<EnumEntry<'a>>,
    message_by_fqn: HashMap<String, usize>,
    enum_by_fqn: HashMap<String, usize>,
    comments: HashMap<(String, Vec<i32>), String>,
}

impl<'a> Registry<'a> {
    fn build(request: &'a CodeGeneratorRequest) -> Self {
        let mut registry = Self {
            messages: Vec::new(),
            enums: Vec::new(),
            message_by_fqn: HashMap::new(),
            enum_by_fqn: HashMap::new(),
            comments: HashMap::new(),
        };

        for file in &request.proto_file {
            let file_name = file.name().to_string();
            if let Some(info) = &file.source_code_info {
                for location in &info.location {
                    registry.index_comment(&file_name, location);
                }
            }

            let package = file.package().to_string();
            for (i, message) in file.message_type.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let path = vec![4, i as i32];
                registry.index_message(&file_name, &package, "", message, path);
            }
            for (i, enum_type) in file.enum_type.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let path = vec![5, i as i32];
                registry.index_enum(&file_name, &package, "", enum_type, path);
            }
        }

        registry
    }

    fn index_comment(&mut self, file: &str, location: &Location) {
        let Some(comment) = &location.leading_comments else {
            return;
        };
        let trimmed: String = comment
            .lines()
            .map(|l| l.strip_prefix(' ').unwrap_or(l))
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string();
        if !trimmed.is_empty() {
            self.comments
                .insert((file.to_string(), location.path.clone()), trimmed);
        }
    }

    fn comment(&self, file: &str, path: &[i32]) -> String {
        self.comments
            .get(&(file.to_string(), path.to_vec()))
            .cloned()
            .unwrap_or_default()
    }

    fn index_message(
        &mut self,
        file: &str,
        package: &str,
        parent: &str,
        message: &'a DescriptorProto,
        path: Vec<i32>,
    ) {
        let name = message.name().to_string();
        let local_name = if parent.is_empty() {
            name
        } else {
            format!("{parent}.{}", message.name())
        };
        let fqn = if package.is_empty() {
            local_name.clone()
        } else {
            format!("{package}.{local_name}")
        };
        let map_entry = message
            .options
            .as_ref()
            .and_then(|o| o.map_entry)
            .unwrap_or(false);
        let doc = self.comment(file, &path);

        self.message_by_fqn.insert(fqn.clone(), self.messages.len());
        self.messages.push(MessageEntry {
            fqn,
            local_name: local_name.clone(),
            file: file.to_string(),
            package: package.to_string(),
            descriptor: message,
            map_entry,
            doc,
            path: path.clone(),
        });

        for (i, nested) in message.nested_type.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let mut nested_path = path.clone();
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            nested_path.extend([3, i as i32]);
            self.index_message(file, package, &local_name, nested, nested_path);
        }
        for (i, nested) in message.enum_type.iter().enumerate() {
            let mut nested_path = path.clone();
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            nested_path.extend([4, i as i32]);
            self.index_enum(file, package, &local_name, nested, nested_path);
        }
    }

    fn index_enum(
        &mut self,
        file: &str,
        package: &str,
        parent: &str,
        enum_type: &'a EnumDescriptorProto,
        path: Vec<i32>,
    ) {
        let name = enum_type.name().to_string();
        let local_name = if parent.is_empty() {
            name
        } else {
            format!("{parent}.{}", enum_type.name())
        };
        let fqn = if package.is_empty() {
            local_name.clone()
        } else {
            format!("{package}.{local_name}")
        };
        let doc = self.comment(file, &path);

        self.enum_by_fqn.insert(fqn.clone(), self.enums.len());
        self.enums.push(EnumEntry {
            fqn,
            local_name,
            file: file.to_string(),
            package: package.to_string(),
            descriptor: enum_type,
            doc,
            path,
        });
    }

    fn message_entry(&self, fqn: &str) -> Option<&MessageEntry<'a>> {
        self.message_by_fqn
            .get(fqn.trim_start_matches('.'))
            .map(|&i| &self.messages[i])
    }

    fn is_enum(&self, fqn: &str) -> bool {
        self.enum_by_fqn.contains_key(fqn.trim_start_matches('.'))
    }
}

fn build_message(entry: &MessageEntry<'_>, registry: &Registry<'_>) -> Result<Message, WalkError> {
    let descriptor = entry.descriptor;

    // Proto3 `optional` fields arrive wrapped in synthetic single-member
    // oneofs; those are presence tracking, not real oneofs.
    let synthetic: Vec<bool> = {
        let mut flags = vec![true; descriptor.oneof_decl.len()];
        for field in &descriptor.field {
            if let Some(index) = field.oneof_index {
                if !field.proto3_optional.unwrap_or(false) {
                    if let Some(flag) = flags.get_mut(usize::try_from(index).unwrap_or(usize::MAX))
                    {
                        *flag = false;
                    }
                }
            }
        }
        flags
    };

    // Real oneofs keep their declaration order; remember old index → new.
    let mut oneof_remap: HashMap<i32, usize> = HashMap::new();
    let mut oneofs = Vec::new();
    for (i, decl) in descriptor.oneof_decl.iter().enumerate() {
        if synthetic[i] {
            continue;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        oneof_remap.insert(i as i32, oneofs.len());
        let mut comment_path = entry.path.clone();
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        comment_path.extend([8, i as i32]);
        oneofs.push(Oneof {
            name: decl.name().to_string(),
            fields: Vec::new(),
            discriminator: None,
            doc: registry.comment(&entry.file, &comment_path),
        });
        // Discriminator values are attached after the member list is known.
    }

    let mut fields = Vec::new();
    for (i, field) in descriptor.field.iter().enumerate() {
        let mut comment_path = entry.path.clone();
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        comment_path.extend([2, i as i32]);
        let doc = registry.comment(&entry.file, &comment_path);
        let built = build_field(entry, field, registry, &oneof_remap, doc)?;
        if let Some(oneof) = built.oneof_index {
            oneofs[oneof].fields.push(fields.len());
        }
        fields.push(built);
    }

    // Now that members are known, resolve discriminator configurations in
    // member declaration order.
    for (i, decl) in descriptor.oneof_decl.iter().enumerate() {
        if synthetic[i] {
            continue;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let new_index = oneof_remap[&(i as i32)];
        let Some(config) = decl.options.as_ref().and_then(|o| o.discriminator.as_ref()) else {
            continue;
        };
        let property = if config.property.is_empty() {
            decl.name().to_string()
        } else {
            config.property.clone()
        };
        let values = oneofs[new_index]
            .fields
            .iter()
            .map(|&fi| {
                let name = fields[fi].name.clone();
                let value = config
                    .values
                    .get(&name)
                    .cloned()
                    .unwrap_or_else(|| name.clone());
                (name, value)
            })
            .collect();
        oneofs[new_index].discriminator = Some(OneofDiscriminator {
            property,
            flatten: config.flatten,
            values,
        });
    }

    Ok(Message {
        fqn: entry.fqn.clone(),
        local_name: entry.local_name.clone(),
        file: entry.file.clone(),
        package: entry.package.clone(),
        fields,
        oneofs,
        doc: entry.doc.clone(),
    })
}

fn build_field(
    entry: &MessageEntry<'_>,
    field: &FieldDescriptorProto,
    registry: &Registry<'_>,
    oneof_remap: &HashMap<i32, usize>,
    doc: String,
) -> Result<Field, WalkError> {
    if field.name.is_none() {
        return Err(WalkError::MissingName {
            file: entry.file.clone(),
        });
    }
    let name = field.name().to_string();
    let repeated = field.label.unwrap_or(field_label::OPTIONAL) == field_label::REPEATED;
    let proto3_optional = field.proto3_optional.unwrap_or(false);

    let kind = field_kind(field, registry)?;

    // Map fields appear as repeated synthetic entry messages; collapse them.
    let cardinality = if repeated {
        if let FieldKind::Message(type_fqn) = &kind {
            match registry.message_entry(type_fqn) {
                Some(value_entry) if value_entry.map_entry => {
                    let (key, value) = map_entry_kinds(value_entry, registry)?;
                    Cardinality::Map { key, value }
                }
                _ => Cardinality::Repeated,
            }
        } else {
            Cardinality::Repeated
        }
    } else if proto3_optional
        || matches!(kind, FieldKind::Message(_) | FieldKind::Timestamp)
    {
        Cardinality::Optional
    } else {
        Cardinality::Singular
    };

    // For collapsed maps the field kind is the value kind.
    let kind = match &cardinality {
        Cardinality::Map { value, .. } => value.clone(),
        _ => kind,
    };

    let opts = field.options.as_ref();
    let encoding = EncodingPolicy {
        int64: opts.map_or_else(Default::default, descriptor::FieldOptions::int64_encoding),
        bytes: opts.map_or_else(Default::default, descriptor::FieldOptions::bytes_encoding),
        enums: opts.map_or_else(Default::default, descriptor::FieldOptions::enum_encoding),
        timestamp: opts.and_then(|o| {
            o.timestamp_format
                .map(|_| o.timestamp_format())
        }),
        nullable: opts.and_then(|o| o.nullable).unwrap_or(false),
        unwrap: opts.and_then(|o| o.unwrap).unwrap_or(false),
        flatten: opts.and_then(|o| o.flatten.as_ref().map(|f| f.prefix.clone())),
    };

    let query = opts.and_then(|o| {
        o.query.as_ref().map(|q| QueryBinding {
            name: q.name.clone(),
            required: q.required,
        })
    });

    let examples = opts
        .and_then(|o| o.field_examples.as_ref())
        .map(|e| e.values.clone())
        .unwrap_or_default();

    let rules = opts.and_then(|o| o.rules.clone());

    let json_name = match &field.json_name {
        Some(json) if !json.is_empty() => json.clone(),
        _ => camel_case(&name),
    };

    let oneof_index = if proto3_optional {
        None
    } else {
        field
            .oneof_index
            .and_then(|i| oneof_remap.get(&i).copied())
    };

    Ok(Field {
        name,
        json_name,
        number: field.number.unwrap_or(0),
        kind,
        cardinality,
        oneof_index,
        encoding,
        query,
        examples,
        rules,
        doc,
    })
}

/// Classify a field's value kind, resolving enum/message references.
fn field_kind(field: &FieldDescriptorProto, registry: &Registry<'_>) -> Result<FieldKind, WalkError> {
    let type_id = field.r#type.unwrap_or(field_type::STRING);
    Ok(match type_id {
        field_type::DOUBLE => FieldKind::Double,
        field_type::FLOAT => FieldKind::Float,
        field_type::INT32 | field_type::SINT32 | field_type::SFIXED32 => FieldKind::Int32,
        field_type::INT64 | field_type::SINT64 | field_type::SFIXED64 => FieldKind::Int64,
        field_type::UINT32 | field_type::FIXED32 => FieldKind::Uint32,
        field_type::UINT64 | field_type::FIXED64 => FieldKind::Uint64,
        field_type::BOOL => FieldKind::Bool,
        field_type::STRING => FieldKind::String,
        field_type::BYTES => FieldKind::Bytes,
        field_type::ENUM => FieldKind::Enum(resolve_name(field, registry, true)?),
        field_type::MESSAGE | field_type::GROUP => {
            let fqn = field.type_name().trim_start_matches('.');
            if fqn == TIMESTAMP_FQN {
                FieldKind::Timestamp
            } else {
                FieldKind::Message(resolve_name(field, registry, false)?)
            }
        }
        _ => FieldKind::String,
    })
}

fn resolve_name(
    field: &FieldDescriptorProto,
    registry: &Registry<'_>,
    is_enum: bool,
) -> Result<String, WalkError> {
    let fqn = field.type_name().trim_start_matches('.').to_string();
    let known = if is_enum {
        registry.is_enum(&fqn)
    } else {
        registry.message_entry(&fqn).is_some()
    };
    if known {
        Ok(fqn)
    } else {
        Err(WalkError::UnknownType {
            field: field.name().to_string(),
            type_name: field.type_name().to_string(),
        })
    }
}

/// Key and value kinds of a synthetic map entry message (key #1, value #2).
fn map_entry_kinds(
    entry: &MessageEntry<'_>,
    registry: &Registry<'_>,
) -> Result<(FieldKind, FieldKind), WalkError> {
    let key = entry
        .descriptor
        .field
        .iter()
        .find(|f| f.number == Some(1))
        .ok_or_else(|| WalkError::MalformedMapEntry {
            entry: entry.fqn.clone(),
        })?;
    let value = entry
        .descriptor
        .field
        .iter()
        .find(|f| f.number == Some(2))
        .ok_or_else(|| WalkError::MalformedMapEntry {
            entry: entry.fqn.clone(),
        })?;
    Ok((field_kind(key, registry)?, field_kind(value, registry)?))
}

fn build_enum(entry: &EnumEntry<'_>) -> Enum {
    let values = entry
        .descriptor
        .value
        .iter()
        .map(|v| EnumValue {
            name: v.name().to_string(),
            number: v.number.unwrap_or(0),
            json_name: v
                .options
                .as_ref()
                .and_then(|o| o.enum_value.as_ref())
                .map(|e| e.value.clone()),
            doc: String::new(),
        })
        .collect();
    Enum {
        fqn: entry.fqn.clone(),
        local_name: entry.local_name.clone(),
        file: entry.file.clone(),
        package: entry.package.clone(),
        values,
        doc: entry.doc.clone(),
    }
}

fn build_file(
    file: &FileDescriptorProto,
    request: &CodeGeneratorRequest,
    registry: &Registry<'_>,
) -> Result<File, WalkError> {
    let file_name = file.name().to_string();
    let package = file.package().to_string();

    let messages = registry
        .messages
        .iter()
        .filter(|m| m.file == file_name && !m.map_entry)
        .map(|m| m.fqn.clone())
        .collect();
    let enums = registry
        .enums
        .iter()
        .filter(|e| e.file == file_name)
        .map(|e| e.fqn.clone())
        .collect();

    let mut services = Vec::new();
    for (i, service) in file.service.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let service_path = vec![6, i as i32];
        services.push(build_service(
            service,
            registry,
            &file_name,
            &service_path,
        )?);
    }

    Ok(File {
        name: file_name.clone(),
        package,
        generate: request.is_file_to_generate(&file_name),
        messages,
        enums,
        services,
    })
}

fn build_service(
    service: &descriptor::ServiceDescriptorProto,
    registry: &Registry<'_>,
    file_name: &str,
    path: &[i32],
) -> Result<Service, WalkError> {
    let name = service.name().to_string();
    let base_path = descriptor::service_config(service)
        .map(|c| c.base_path.clone())
        .unwrap_or_default();
    let headers = descriptor::service_headers(service)
        .iter()
        .map(build_header)
        .collect();

    let mut methods = Vec::new();
    for (i, method) in service.method.iter().enumerate() {
        for type_name in [method.input_type(), method.output_type()] {
            let fqn = type_name.trim_start_matches('.');
            if registry.message_entry(fqn).is_none() {
                return Err(WalkError::UnknownMessage {
                    service: name.clone(),
                    method: method.name().to_string(),
                    type_name: type_name.to_string(),
                });
            }
        }

        let config = descriptor::method_config(method);
        let mut comment_path = path.to_vec();
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        comment_path.extend([2, i as i32]);
        methods.push(Method {
            name: method.name().to_string(),
            verb: config.map_or(proto_rest_core::HttpMethod::Unspecified, |c| c.method()),
            path: config.map(|c| c.path.clone()).unwrap_or_default(),
            input: method.input_type().trim_start_matches('.').to_string(),
            output: method.output_type().trim_start_matches('.').to_string(),
            headers: descriptor::method_headers(method)
                .iter()
                .map(build_header)
                .collect(),
            doc: registry.comment(file_name, &comment_path),
        });
    }

    Ok(Service {
        name,
        base_path,
        methods,
        headers,
        doc: registry.comment(file_name, path),
    })
}

fn build_header(header: &descriptor::Header) -> Header {
    Header {
        name: header.name.clone(),
        description: header.description.clone(),
        ty: HeaderType::parse(&header.r#type),
        format: HeaderFormat::parse(&header.format),
        required: header.required,
        example: if header.example.is_empty() {
            None
        } else {
            Some(header.example.clone())
        },
        deprecated: header.deprecated,
    }
}

/// `snake_case` → `camelCase`, matching the compiler's default `json_name`.
fn camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;
    for ch in s.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
