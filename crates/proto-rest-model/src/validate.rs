//! Cross-annotation invariant checks.
//!
//! Runs after the walk and before any back-end. Fails fast on the first
//! violated invariant — continuing past a structural violation would produce
//! misleading downstream errors — and every message names the offending
//! entity plus an actionable remediation.

use std::collections::HashSet;

use crate::model::{Cardinality, Enum, FieldKind, Message, Model, Service};
use crate::route::{Route, RouteError};

/// The first violated invariant, with context and remediation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ValidateError {
    /// Route derivation failed for a method.
    #[error("in {service}.{method}: {source}")]
    Route {
        /// Service name.
        service: String,
        /// Method name.
        method: String,
        /// The underlying route violation.
        source: RouteError,
    },

    /// A `query` option on a method whose verb carries a body.
    #[error(
        "in {service}.{method}: field '{field}' has a 'query' option but the \
         method is {verb}. Query parameters are legal only on GET and DELETE \
         methods; move the field into the body or change the verb."
    )]
    QueryOnBodyVerb {
        /// Service name.
        service: String,
        /// Method name.
        method: String,
        /// The annotated field.
        field: String,
        /// The method's verb.
        verb: &'static str,
    },

    /// A `query` option on a non-scalar field.
    #[error(
        "in {service}.{method}: field '{field}' has a 'query' option but is \
         not a singular scalar. Query parameters must be string, integer, \
         bool, float, or double fields."
    )]
    QueryNotScalar {
        /// Service name.
        service: String,
        /// Method name.
        method: String,
        /// The annotated field.
        field: String,
    },

    /// More than one field of a message carries `unwrap = true`.
    #[error(
        "{message} has more than one field marked 'unwrap'. At most one field \
         per message may be unwrapped."
    )]
    MultipleUnwrap {
        /// The offending message.
        message: String,
    },

    /// `unwrap` on a field that is neither repeated nor a map.
    #[error(
        "{message}.{field} is marked 'unwrap' but is neither repeated nor a \
         map. Unwrap collapses a wrapper around exactly those two cardinalities."
    )]
    UnwrapCardinality {
        /// The owning message.
        message: String,
        /// The annotated field.
        field: String,
    },

    /// `unwrap` on a message that has sibling fields.
    #[error(
        "{message} marks '{field}' as 'unwrap' but declares other fields too. \
         An unwrapped wrapper must have exactly one field, or the siblings \
         would be lost on the wire."
    )]
    UnwrapNotSingleField {
        /// The offending message.
        message: String,
        /// The unwrapped field.
        field: String,
    },

    /// `nullable` and `unwrap` on the same field.
    #[error(
        "{message}.{field} combines 'nullable' with 'unwrap'; the two are \
         mutually exclusive. Drop one of the options."
    )]
    UnwrapNullable {
        /// The owning message.
        message: String,
        /// The annotated field.
        field: String,
    },

    /// `timestamp_format` on a field that is not a `google.protobuf.Timestamp`.
    #[error(
        "{message}.{field} sets 'timestamp_format' but is not a \
         google.protobuf.Timestamp field."
    )]
    TimestampFormatTarget {
        /// The owning message.
        message: String,
        /// The annotated field.
        field: String,
    },

    /// `flatten` on a field that is not a singular message.
    #[error(
        "{message}.{field} is marked 'flatten' but flatten applies only to \
         singular message fields."
    )]
    FlattenTarget {
        /// The owning message.
        message: String,
        /// The annotated field.
        field: String,
    },

    /// A flattened child key collides with another key of the parent.
    #[error(
        "flattening {message}.{field} produces key '{key}' which collides \
         with another field of {message}. Set a prefix on the 'flatten' \
         option or rename one of the fields."
    )]
    FlattenCollision {
        /// The owning message.
        message: String,
        /// The flattened field.
        field: String,
        /// The colliding wire key.
        key: String,
    },

    /// Two variants of a discriminated oneof share a tag value.
    #[error(
        "oneof '{oneof}' in {message} assigns discriminator value '{value}' \
         to more than one variant. Values must be distinct."
    )]
    DiscriminatorDuplicateValue {
        /// The owning message.
        message: String,
        /// The oneof name.
        oneof: String,
        /// The duplicated tag value.
        value: String,
    },

    /// A flattened discriminator with a non-message variant.
    #[error(
        "oneof '{oneof}' in {message} sets 'flatten' on its discriminator but \
         variant '{field}' is not message-typed. Scalar variants require \
         flatten = false."
    )]
    DiscriminatorScalarVariant {
        /// The owning message.
        message: String,
        /// The oneof name.
        oneof: String,
        /// The scalar variant field.
        field: String,
    },

    /// More than one flattened discriminated oneof in one message.
    #[error(
        "{message} has more than one discriminated oneof with flatten = true; \
         at most one may be flattened."
    )]
    MultipleFlattenedDiscriminators {
        /// The offending message.
        message: String,
    },

    /// Two values of an enum share a number.
    #[error("enum {name} declares number {number} more than once")]
    EnumDuplicateNumber {
        /// The enum full name.
        name: String,
        /// The duplicated number.
        number: i32,
    },

    /// Two values of an enum share a wire name.
    #[error(
        "enum {name} puts token '{token}' on the wire for more than one \
         value. Custom 'enum_value' names must keep all wire tokens distinct."
    )]
    EnumDuplicateWireName {
        /// The enum full name.
        name: String,
        /// The duplicated wire token.
        token: String,
    },
}

/// Validate the model, failing fast on the first violation.
///
/// Enums and messages across the whole request are checked first (dependency
/// types feed generated code too), then every service of every
/// generate-flagged file, in source order.
///
/// # Errors
///
/// Returns the first [`ValidateError`] encountered.
pub fn validate(model: &Model) -> Result<(), ValidateError> {
    for enum_def in model.enums() {
        validate_enum(enum_def)?;
    }
    for message in model.messages() {
        validate_message(message, model)?;
    }
    for file in model.files().iter().filter(|f| f.generate) {
        for service in &file.services {
            validate_service(service, model)?;
        }
    }
    Ok(())
}

fn validate_enum(enum_def: &Enum) -> Result<(), ValidateError> {
    let mut numbers = HashSet::new();
    for value in &enum_def.values {
        if !numbers.insert(value.number) {
            return Err(ValidateError::EnumDuplicateNumber {
                name: enum_def.fqn.clone(),
                number: value.number,
            });
        }
    }

    if enum_def.values.iter().any(|v| v.json_name.is_some()) {
        let mut tokens = HashSet::new();
        for value in &enum_def.values {
            if !tokens.insert(value.wire_name()) {
                return Err(ValidateError::EnumDuplicateWireName {
                    name: enum_def.fqn.clone(),
                    token: value.wire_name().to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_message(message: &Message, model: &Model) -> Result<(), ValidateError> {
    let mut unwrap_seen = false;
    for field in &message.fields {
        if field.encoding.unwrap {
            if unwrap_seen {
                return Err(ValidateError::MultipleUnwrap {
                    message: message.fqn.clone(),
                });
            }
            unwrap_seen = true;

            if !matches!(
                field.cardinality,
                Cardinality::Repeated | Cardinality::Map { .. }
            ) {
                return Err(ValidateError::UnwrapCardinality {
                    message: message.fqn.clone(),
                    field: field.name.clone(),
                });
            }
            if message.fields.len() > 1 {
                return Err(ValidateError::UnwrapNotSingleField {
                    message: message.fqn.clone(),
                    field: field.name.clone(),
                });
            }
            if field.encoding.nullable {
                return Err(ValidateError::UnwrapNullable {
                    message: message.fqn.clone(),
                    field: field.name.clone(),
                });
            }
        }

        if field.encoding.timestamp.is_some() && field.kind != FieldKind::Timestamp {
            return Err(ValidateError::TimestampFormatTarget {
                message: message.fqn.clone(),
                field: field.name.clone(),
            });
        }

        if field.encoding.flatten.is_some() {
            let singular_message = matches!(field.cardinality, Cardinality::Optional)
                && matches!(field.kind, FieldKind::Message(_));
            if !singular_message {
                return Err(ValidateError::FlattenTarget {
                    message: message.fqn.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }

    validate_flatten_keys(message, model)?;
    validate_oneofs(message)?;
    Ok(())
}

/// Every wire key a message produces must be unique once flattened children
/// are folded in.
fn validate_flatten_keys(message: &Message, model: &Model) -> Result<(), ValidateError> {
    let mut keys: HashSet<String> = message
        .fields
        .iter()
        .filter(|f| f.encoding.flatten.is_none())
        .map(|f| f.name.clone())
        .collect();

    for field in &message.fields {
        let Some(prefix) = &field.encoding.flatten else {
            continue;
        };
        let FieldKind::Message(child_fqn) = &field.kind else {
            continue;
        };
        let Some(child) = model.message(child_fqn) else {
            continue;
        };
        for child_field in &child.fields {
            let key = format!("{prefix}{}", child_field.name);
            if !keys.insert(key.clone()) {
                return Err(ValidateError::FlattenCollision {
                    message: message.fqn.clone(),
                    field: field.name.clone(),
                    key,
                });
            }
        }
    }
    Ok(())
}

fn validate_oneofs(message: &Message) -> Result<(), ValidateError> {
    let mut flattened = 0usize;
    for oneof in &message.oneofs {
        let Some(disc) = &oneof.discriminator else {
            continue;
        };

        let mut values = HashSet::new();
        for (_, value) in &disc.values {
            if !values.insert(value.as_str()) {
                return Err(ValidateError::DiscriminatorDuplicateValue {
                    message: message.fqn.clone(),
                    oneof: oneof.name.clone(),
                    value: value.clone(),
                });
            }
        }

        if disc.flatten {
            flattened += 1;
            if flattened > 1 {
                return Err(ValidateError::MultipleFlattenedDiscriminators {
                    message: message.fqn.clone(),
                });
            }
            for &field_index in &oneof.fields {
                let field = &message.fields[field_index];
                if !matches!(field.kind, FieldKind::Message(_)) {
                    return Err(ValidateError::DiscriminatorScalarVariant {
                        message: message.fqn.clone(),
                        oneof: oneof.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn validate_service(service: &Service, model: &Model) -> Result<(), ValidateError> {
    for method in &service.methods {
        let Some(input) = model.message(&method.input) else {
            // The walker already rejected unresolved inputs; nothing to do.
            continue;
        };

        let route = Route::derive(service, method, input).map_err(|source| {
            ValidateError::Route {
                service: service.name.clone(),
                method: method.name.clone(),
                source,
            }
        })?;

        for field in &input.fields {
            if field.query.is_none() {
                continue;
            }
            if route.verb.has_body() {
                return Err(ValidateError::QueryOnBodyVerb {
                    service: service.name.clone(),
                    method: method.name.clone(),
                    field: field.name.clone(),
                    verb: route.verb.as_verb(),
                });
            }
            let singular =
                matches!(field.cardinality, Cardinality::Singular | Cardinality::Optional);
            if !singular || !field.kind.is_path_scalar() {
                return Err(ValidateError::QueryNotScalar {
                    service: service.name.clone(),
                    method: method.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proto_rest_core::HttpMethod;

    use super::*;
    use crate::model::{
        EncodingPolicy, EnumValue, Field, File, Method, Oneof, OneofDiscriminator, QueryBinding,
    };

    fn field(name: &str, kind: FieldKind) -> Field {
        Field {
            name: name.to_string(),
            json_name: name.to_string(),
            number: 1,
            kind,
            cardinality: Cardinality::Singular,
            oneof_index: None,
            encoding: EncodingPolicy::default(),
            query: None,
            examples: vec![],
            rules: None,
            doc: String::new(),
        }
    }

    fn message(fqn: &str, fields: Vec<Field>) -> Message {
        Message {
            fqn: fqn.to_string(),
            local_name: fqn.rsplit('.').next().unwrap().to_string(),
            file: "test.proto".to_string(),
            package: "test.v1".to_string(),
            fields,
            oneofs: vec![],
            doc: String::new(),
        }
    }

    fn model_of(messages: Vec<Message>) -> Model {
        Model::new(vec![], messages, vec![])
    }

    fn model_with_service(service: Service, messages: Vec<Message>) -> Model {
        let file = File {
            name: "test.proto".to_string(),
            package: "test.v1".to_string(),
            generate: true,
            messages: messages.iter().map(|m| m.fqn.clone()).collect(),
            enums: vec![],
            services: vec![service],
        };
        Model::new(vec![file], messages, vec![])
    }

    fn get_method(path: &str, input: &str) -> Method {
        Method {
            name: "GetThing".to_string(),
            verb: HttpMethod::Get,
            path: path.to_string(),
            input: input.to_string(),
            output: input.to_string(),
            headers: vec![],
            doc: String::new(),
        }
    }

    fn service(methods: Vec<Method>) -> Service {
        Service {
            name: "ThingService".to_string(),
            base_path: String::new(),
            methods,
            headers: vec![],
            doc: String::new(),
        }
    }

    #[test]
    fn clean_model_passes() {
        let input = message("test.v1.Req", vec![field("id", FieldKind::String)]);
        let model = model_with_service(
            service(vec![get_method("/things/{id}", "test.v1.Req")]),
            vec![input],
        );
        validate(&model).unwrap();
    }

    #[test]
    fn route_error_carries_service_and_method() {
        let input = message("test.v1.Req", vec![field("id", FieldKind::String)]);
        let model = model_with_service(
            service(vec![get_method("/things/{missing}", "test.v1.Req")]),
            vec![input],
        );
        let err = validate(&model).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ThingService.GetThing"), "context: {msg}");
        assert!(msg.contains("{missing}"), "variable: {msg}");
    }

    #[test]
    fn unwrap_on_singular_rejected() {
        let mut wrapper = message("test.v1.W", vec![field("item", FieldKind::String)]);
        wrapper.fields[0].encoding.unwrap = true;
        let err = validate(&model_of(vec![wrapper])).unwrap_err();
        assert!(matches!(err, ValidateError::UnwrapCardinality { .. }));
        let msg = err.to_string();
        assert!(msg.contains("repeated"), "remediation: {msg}");
        assert!(msg.contains("map"), "remediation: {msg}");
    }

    #[test]
    fn unwrap_with_sibling_fields_rejected() {
        let mut wrapper = message(
            "test.v1.W",
            vec![field("items", FieldKind::String), field("count", FieldKind::Int32)],
        );
        wrapper.fields[0].cardinality = Cardinality::Repeated;
        wrapper.fields[0].encoding.unwrap = true;
        let err = validate(&model_of(vec![wrapper])).unwrap_err();
        assert!(matches!(err, ValidateError::UnwrapNotSingleField { .. }));
    }

    #[test]
    fn two_unwrap_fields_rejected() {
        let mut wrapper = message(
            "test.v1.W",
            vec![field("a", FieldKind::String), field("b", FieldKind::String)],
        );
        wrapper.fields[0].cardinality = Cardinality::Repeated;
        wrapper.fields[0].encoding.unwrap = true;
        wrapper.fields[1].cardinality = Cardinality::Repeated;
        wrapper.fields[1].encoding.unwrap = true;
        let err = validate(&model_of(vec![wrapper])).unwrap_err();
        assert!(matches!(err, ValidateError::MultipleUnwrap { .. }));
    }

    #[test]
    fn nullable_unwrap_combination_rejected() {
        let mut wrapper = message("test.v1.W", vec![field("items", FieldKind::String)]);
        wrapper.fields[0].cardinality = Cardinality::Repeated;
        wrapper.fields[0].encoding.unwrap = true;
        wrapper.fields[0].encoding.nullable = true;
        let err = validate(&model_of(vec![wrapper])).unwrap_err();
        assert!(matches!(err, ValidateError::UnwrapNullable { .. }));
    }

    #[test]
    fn timestamp_format_on_string_rejected() {
        let mut evt = message("test.v1.Evt", vec![field("when", FieldKind::String)]);
        evt.fields[0].encoding.timestamp = Some(proto_rest_core::TimestampFormat::Date);
        let err = validate(&model_of(vec![evt])).unwrap_err();
        assert!(matches!(err, ValidateError::TimestampFormatTarget { .. }));
    }

    #[test]
    fn timestamp_format_on_timestamp_allowed() {
        let mut evt = message("test.v1.Evt", vec![field("when", FieldKind::Timestamp)]);
        evt.fields[0].cardinality = Cardinality::Optional;
        evt.fields[0].encoding.timestamp = Some(proto_rest_core::TimestampFormat::UnixMillis);
        validate(&model_of(vec![evt])).unwrap();
    }

    #[test]
    fn flatten_on_repeated_rejected() {
        let mut parent = message(
            "test.v1.P",
            vec![field("child", FieldKind::Message("test.v1.C".to_string()))],
        );
        parent.fields[0].cardinality = Cardinality::Repeated;
        parent.fields[0].encoding.flatten = Some(String::new());
        let child = message("test.v1.C", vec![]);
        let err = validate(&model_of(vec![parent, child])).unwrap_err();
        assert!(matches!(err, ValidateError::FlattenTarget { .. }));
    }

    #[test]
    fn flatten_collision_rejected() {
        let mut parent = message(
            "test.v1.P",
            vec![
                field("name", FieldKind::String),
                field("child", FieldKind::Message("test.v1.C".to_string())),
            ],
        );
        parent.fields[1].cardinality = Cardinality::Optional;
        parent.fields[1].encoding.flatten = Some(String::new());
        let child = message("test.v1.C", vec![field("name", FieldKind::String)]);
        let err = validate(&model_of(vec![parent, child])).unwrap_err();
        assert!(matches!(err, ValidateError::FlattenCollision { .. }));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn flatten_prefix_avoids_collision() {
        let mut parent = message(
            "test.v1.P",
            vec![
                field("name", FieldKind::String),
                field("child", FieldKind::Message("test.v1.C".to_string())),
            ],
        );
        parent.fields[1].cardinality = Cardinality::Optional;
        parent.fields[1].encoding.flatten = Some("c_".to_string());
        let child = message("test.v1.C", vec![field("name", FieldKind::String)]);
        validate(&model_of(vec![parent, child])).unwrap();
    }

    #[test]
    fn duplicate_discriminator_values_rejected() {
        let mut login = message(
            "test.v1.Login",
            vec![
                field("email", FieldKind::Message("test.v1.A".to_string())),
                field("token", FieldKind::Message("test.v1.B".to_string())),
            ],
        );
        login.fields[0].oneof_index = Some(0);
        login.fields[1].oneof_index = Some(0);
        login.oneofs = vec![Oneof {
            name: "method".to_string(),
            fields: vec![0, 1],
            discriminator: Some(OneofDiscriminator {
                property: "kind".to_string(),
                flatten: false,
                values: vec![
                    ("email".to_string(), "x".to_string()),
                    ("token".to_string(), "x".to_string()),
                ],
            }),
            doc: String::new(),
        }];
        let a = message("test.v1.A", vec![]);
        let b = message("test.v1.B", vec![]);
        let err = validate(&model_of(vec![login, a, b])).unwrap_err();
        assert!(matches!(err, ValidateError::DiscriminatorDuplicateValue { .. }));
    }

    #[test]
    fn flattened_scalar_variant_rejected() {
        let mut login = message(
            "test.v1.Login",
            vec![
                field("email", FieldKind::Message("test.v1.A".to_string())),
                field("token", FieldKind::String),
            ],
        );
        login.fields[0].oneof_index = Some(0);
        login.fields[1].oneof_index = Some(0);
        login.oneofs = vec![Oneof {
            name: "method".to_string(),
            fields: vec![0, 1],
            discriminator: Some(OneofDiscriminator {
                property: "kind".to_string(),
                flatten: true,
                values: vec![
                    ("email".to_string(), "email".to_string()),
                    ("token".to_string(), "token".to_string()),
                ],
            }),
            doc: String::new(),
        }];
        let a = message("test.v1.A", vec![]);
        let err = validate(&model_of(vec![login, a])).unwrap_err();
        assert!(matches!(err, ValidateError::DiscriminatorScalarVariant { .. }));
        assert!(err.to_string().contains("flatten = false"));
    }

    #[test]
    fn query_on_post_rejected() {
        let mut input = message("test.v1.Req", vec![field("page", FieldKind::Int32)]);
        input.fields[0].query = Some(QueryBinding::default());
        let mut method = get_method("/things", "test.v1.Req");
        method.verb = HttpMethod::Post;
        let model = model_with_service(service(vec![method]), vec![input]);
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ValidateError::QueryOnBodyVerb { .. }));
        assert!(err.to_string().contains("GET and DELETE"));
    }

    #[test]
    fn query_on_message_field_rejected() {
        let mut input = message(
            "test.v1.Req",
            vec![field("filter", FieldKind::Message("test.v1.F".to_string()))],
        );
        input.fields[0].cardinality = Cardinality::Optional;
        input.fields[0].query = Some(QueryBinding::default());
        let f = message("test.v1.F", vec![]);
        let model = model_with_service(
            service(vec![get_method("/things", "test.v1.Req")]),
            vec![input, f],
        );
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ValidateError::QueryNotScalar { .. }));
    }

    #[test]
    fn duplicate_enum_numbers_rejected() {
        let bad = Enum {
            fqn: "test.v1.Status".to_string(),
            local_name: "Status".to_string(),
            file: "test.proto".to_string(),
            package: "test.v1".to_string(),
            values: vec![
                EnumValue {
                    name: "A".to_string(),
                    number: 1,
                    json_name: None,
                    doc: String::new(),
                },
                EnumValue {
                    name: "B".to_string(),
                    number: 1,
                    json_name: None,
                    doc: String::new(),
                },
            ],
            doc: String::new(),
        };
        let model = Model::new(vec![], vec![], vec![bad]);
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ValidateError::EnumDuplicateNumber { .. }));
    }

    #[test]
    fn duplicate_wire_tokens_rejected() {
        let bad = Enum {
            fqn: "test.v1.Status".to_string(),
            local_name: "Status".to_string(),
            file: "test.proto".to_string(),
            package: "test.v1".to_string(),
            values: vec![
                EnumValue {
                    name: "STATUS_A".to_string(),
                    number: 0,
                    json_name: Some("a".to_string()),
                    doc: String::new(),
                },
                EnumValue {
                    name: "a".to_string(),
                    number: 1,
                    json_name: None,
                    doc: String::new(),
                },
            ],
            doc: String::new(),
        };
        let model = Model::new(vec![], vec![], vec![bad]);
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ValidateError::EnumDuplicateWireName { .. }));
    }
}
