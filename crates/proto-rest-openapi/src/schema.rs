//! Message and enum schema lowering.
//!
//! Schemas describe the JSON wire shape the other back-ends produce, so the
//! rewrites are applied here too: unwrapped wrappers collapse to arrays or
//! maps, flattened children appear as prefixed siblings via `allOf`,
//! discriminated oneofs become `oneOf` with a `discriminator` block, STRING-
//! encoded 64-bit integers are strings, and timestamps are primitives.

use proto_rest_core::descriptor::FieldRules;
use proto_rest_core::{BytesEncoding, EnumEncoding, Int64Encoding, TimestampFormat};
use proto_rest_model::{Cardinality, Enum, Field, FieldKind, Message, Model, Oneof};
use serde_yaml_ng::{Mapping, Value};

use crate::naming_pascal;

pub(crate) fn s(value: &str) -> Value {
    Value::String(value.to_string())
}

pub(crate) fn entry(map: &mut Mapping, key: &str, value: Value) {
    map.insert(s(key), value);
}

pub(crate) fn obj(entries: Vec<(&str, Value)>) -> Value {
    let mut map = Mapping::new();
    for (key, value) in entries {
        entry(&mut map, key, value);
    }
    Value::Mapping(map)
}

pub(crate) fn ref_to(name: &str) -> Value {
    obj(vec![("$ref", s(&format!("#/components/schemas/{name}")))])
}

/// Component schema for an enum: a string union of wire tokens (the
/// `enum_value` overrides where present).
pub(crate) fn enum_schema(enum_def: &Enum) -> Value {
    let tokens: Vec<Value> = enum_def.values.iter().map(|v| s(v.wire_name())).collect();
    let mut map = Mapping::new();
    if !enum_def.doc.is_empty() {
        entry(&mut map, "description", s(&enum_def.doc));
    }
    entry(&mut map, "type", s("string"));
    entry(&mut map, "enum", Value::Sequence(tokens));
    Value::Mapping(map)
}

/// Component schema for a message.
pub(crate) fn message_schema(model: &Model, message: &Message) -> Value {
    // Unwrapped wrappers collapse to their single field's wire shape.
    if message.is_root_unwrap() {
        return property_schema(model, &message.fields[0]);
    }

    let discriminated: Vec<&Oneof> = message
        .oneofs
        .iter()
        .filter(|o| o.discriminator.is_some())
        .collect();
    let flattened: Vec<&Field> = message
        .fields
        .iter()
        .filter(|f| f.encoding.flatten.is_some())
        .collect();

    let base = base_object(model, message);

    if discriminated.is_empty() && flattened.is_empty() {
        return with_description(base, &message.doc);
    }

    let mut members = vec![base];
    for field in flattened {
        members.push(flatten_object(model, field));
    }
    for oneof in discriminated {
        members.push(oneof_block(message, oneof));
    }
    let schema = obj(vec![("allOf", Value::Sequence(members))]);
    with_description(schema, &message.doc)
}

fn with_description(schema: Value, doc: &str) -> Value {
    if doc.is_empty() {
        return schema;
    }
    let Value::Mapping(mut map) = schema else {
        return schema;
    };
    let mut with_doc = Mapping::new();
    entry(&mut with_doc, "description", s(doc));
    for (key, value) in map.iter_mut() {
        with_doc.insert(key.clone(), std::mem::take(value));
    }
    Value::Mapping(with_doc)
}

/// The plain-object part of a message: non-flattened fields, with
/// non-discriminated oneof members as optional properties.
fn base_object(model: &Model, message: &Message) -> Value {
    let mut properties = Mapping::new();
    let mut required: Vec<Value> = Vec::new();

    for field in &message.fields {
        if field.encoding.flatten.is_some() {
            continue;
        }
        if let Some(index) = field.oneof_index {
            if message.oneofs[index].discriminator.is_some() {
                continue;
            }
        }
        entry(&mut properties, &field.json_name, property_schema(model, field));
        if field_required(field) {
            required.push(s(&field.json_name));
        }
    }

    let mut map = Mapping::new();
    entry(&mut map, "type", s("object"));
    entry(&mut map, "properties", Value::Mapping(properties));
    if !required.is_empty() {
        entry(&mut map, "required", Value::Sequence(required));
    }
    Value::Mapping(map)
}

fn field_required(field: &Field) -> bool {
    match field.cardinality {
        Cardinality::Optional => field
            .rules
            .as_ref()
            .is_some_and(|r| r.required),
        _ => field.oneof_index.is_none(),
    }
}

/// The prefixed-sibling object a flattened child contributes to its parent.
fn flatten_object(model: &Model, field: &Field) -> Value {
    let prefix = field.encoding.flatten.as_deref().unwrap_or_default();
    let mut properties = Mapping::new();
    if let FieldKind::Message(child_fqn) = &field.kind {
        if let Some(child) = model.message(child_fqn) {
            for child_field in &child.fields {
                entry(
                    &mut properties,
                    &format!("{prefix}{}", child_field.json_name),
                    property_schema(model, child_field),
                );
            }
        }
    }
    obj(vec![
        ("type", s("object")),
        ("properties", Value::Mapping(properties)),
    ])
}

/// The `oneOf` + `discriminator` block for a discriminated oneof. Variant
/// schemas are referenced by name; [`variant_schemas`] emits them.
fn oneof_block(message: &Message, oneof: &Oneof) -> Value {
    let Some(disc) = &oneof.discriminator else {
        return Value::Null;
    };
    let mut variants = Vec::new();
    let mut mapping = Mapping::new();
    for (field_name, tag) in &disc.values {
        let name = variant_schema_name(message, field_name);
        variants.push(ref_to(&name));
        entry(&mut mapping, tag, s(&format!("#/components/schemas/{name}")));
    }
    obj(vec![
        ("oneOf", Value::Sequence(variants)),
        (
            "discriminator",
            obj(vec![
                ("propertyName", s(&disc.property)),
                ("mapping", Value::Mapping(mapping)),
            ]),
        ),
    ])
}

pub(crate) fn variant_schema_name(message: &Message, field_name: &str) -> String {
    format!("{}{}", message.type_name(), naming_pascal(field_name))
}

/// Per-variant component schemas for every discriminated oneof of a message.
pub(crate) fn variant_schemas(model: &Model, message: &Message) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    for oneof in &message.oneofs {
        let Some(disc) = &oneof.discriminator else {
            continue;
        };
        for &index in &oneof.fields {
            let field = &message.fields[index];
            let tag = disc.value_for(&field.name);
            let tag_property = obj(vec![
                ("type", s("string")),
                ("enum", Value::Sequence(vec![s(tag)])),
            ]);
            let schema = if disc.flatten {
                // Tag alongside the child's own fields.
                let tag_object = obj(vec![
                    ("type", s("object")),
                    (
                        "properties",
                        obj(vec![(disc.property.as_str(), tag_property)]),
                    ),
                    ("required", Value::Sequence(vec![s(&disc.property)])),
                ]);
                obj(vec![(
                    "allOf",
                    Value::Sequence(vec![tag_object, scalar_schema(model, field, &field.kind)]),
                )])
            } else {
                // Tag plus the variant value under its field name.
                let mut properties = Mapping::new();
                entry(&mut properties, &disc.property, tag_property);
                entry(
                    &mut properties,
                    &field.json_name,
                    scalar_schema(model, field, &field.kind),
                );
                obj(vec![
                    ("type", s("object")),
                    ("properties", Value::Mapping(properties)),
                    (
                        "required",
                        Value::Sequence(vec![s(&disc.property), s(&field.json_name)]),
                    ),
                ])
            };
            out.push((variant_schema_name(message, &field.name), schema));
        }
    }
    out
}

/// Property schema for a field: the scalar schema with cardinality,
/// nullability, validation constraints, doc, and examples applied.
pub(crate) fn property_schema(model: &Model, field: &Field) -> Value {
    let mut schema = match &field.cardinality {
        Cardinality::Repeated => obj(vec![
            ("type", s("array")),
            ("items", scalar_schema(model, field, &field.kind)),
        ]),
        Cardinality::Map { .. } => obj(vec![
            ("type", s("object")),
            ("additionalProperties", scalar_schema(model, field, &field.kind)),
        ]),
        _ => scalar_schema(model, field, &field.kind),
    };

    if let Some(rules) = &field.rules {
        schema = apply_rules(schema, rules);
    }
    if field.encoding.nullable {
        schema = nullable(schema);
    }

    let Value::Mapping(mut map) = schema else {
        return schema;
    };
    if !field.doc.is_empty() && !map.contains_key("$ref") {
        entry(&mut map, "description", s(&field.doc));
    }
    if !field.examples.is_empty() && !map.contains_key("$ref") {
        let values: Vec<Value> = field
            .examples
            .iter()
            .map(|e| example_value(field, e))
            .collect();
        entry(&mut map, "example", values[0].clone());
        entry(&mut map, "examples", Value::Sequence(values));
    }
    Value::Mapping(map)
}

/// Examples are annotated as strings; numeric and boolean fields get them
/// parsed into their JSON type where possible.
fn example_value(field: &Field, raw: &str) -> Value {
    match field.kind {
        FieldKind::Double | FieldKind::Float => raw
            .parse::<f64>()
            .map_or_else(|_| s(raw), |n| Value::Number(n.into())),
        FieldKind::Int32 | FieldKind::Uint32 => raw
            .parse::<i64>()
            .map_or_else(|_| s(raw), |n| Value::Number(n.into())),
        FieldKind::Int64 | FieldKind::Uint64 => match field.encoding.int64 {
            Int64Encoding::String => s(raw),
            Int64Encoding::Number => raw
                .parse::<i64>()
                .map_or_else(|_| s(raw), |n| Value::Number(n.into())),
        },
        FieldKind::Bool => raw
            .parse::<bool>()
            .map_or_else(|_| s(raw), Value::Bool),
        _ => s(raw),
    }
}

/// Wrap a schema so `null` validates too (JSON Schema style, per 3.1).
fn nullable(schema: Value) -> Value {
    if let Value::Mapping(map) = &schema {
        if let Some(Value::String(ty)) = map.get("type") {
            if map.len() == 1 || !map.contains_key("$ref") {
                let mut out = map.clone();
                out.insert(
                    s("type"),
                    Value::Sequence(vec![s(ty.as_str()), s("null")]),
                );
                return Value::Mapping(out);
            }
        }
    }
    obj(vec![(
        "anyOf",
        Value::Sequence(vec![schema, obj(vec![("type", s("null"))])]),
    )])
}

/// Schema of a field's value, references included.
#[allow(clippy::too_many_lines)]
pub(crate) fn scalar_schema(model: &Model, field: &Field, kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Double => obj(vec![("type", s("number")), ("format", s("double"))]),
        FieldKind::Float => obj(vec![("type", s("number")), ("format", s("float"))]),
        FieldKind::Int32 => obj(vec![("type", s("integer")), ("format", s("int32"))]),
        FieldKind::Uint32 => {
            let mut map = Mapping::new();
            entry(&mut map, "type", s("integer"));
            entry(&mut map, "format", s("int32"));
            entry(&mut map, "minimum", Value::Number(0.into()));
            Value::Mapping(map)
        }
        FieldKind::Int64 => int64_schema(field, "int64"),
        FieldKind::Uint64 => int64_schema(field, "uint64"),
        FieldKind::Bool => obj(vec![("type", s("boolean"))]),
        FieldKind::String => obj(vec![("type", s("string"))]),
        FieldKind::Bytes => {
            let format = match field.encoding.bytes {
                BytesEncoding::Hex => "hex",
                _ => "byte",
            };
            obj(vec![("type", s("string")), ("format", s(format))])
        }
        FieldKind::Enum(fqn) => match field.encoding.enums {
            EnumEncoding::Name => model
                .enum_def(fqn)
                .map_or_else(|| obj(vec![("type", s("string"))]), |e| ref_to(&e.type_name())),
            EnumEncoding::Number => obj(vec![("type", s("integer"))]),
        },
        FieldKind::Message(fqn) => model.message(fqn).map_or_else(
            || obj(vec![("type", s("object"))]),
            |m| ref_to(&m.type_name()),
        ),
        FieldKind::Timestamp => match field.encoding.timestamp.unwrap_or_default() {
            TimestampFormat::Rfc3339 => {
                obj(vec![("type", s("string")), ("format", s("date-time"))])
            }
            TimestampFormat::Date => obj(vec![("type", s("string")), ("format", s("date"))]),
            TimestampFormat::UnixSeconds | TimestampFormat::UnixMillis => {
                obj(vec![("type", s("integer")), ("format", s("int64"))])
            }
        },
    }
}

/// Per proto3 JSON, STRING-encoded 64-bit integers are strings on the wire;
/// NUMBER switches them to integers.
fn int64_schema(field: &Field, format: &str) -> Value {
    match field.encoding.int64 {
        Int64Encoding::String => obj(vec![("type", s("string")), ("format", s(format))]),
        Int64Encoding::Number => obj(vec![("type", s("integer"))]),
    }
}

/// Merge validation rules into a schema mapping.
fn apply_rules(schema: Value, rules: &FieldRules) -> Value {
    let Value::Mapping(mut map) = schema else {
        return schema;
    };

    if let Some(string_rules) = &rules.string {
        if string_rules.min_len > 0 {
            entry(&mut map, "minLength", Value::Number(string_rules.min_len.into()));
        }
        if string_rules.max_len > 0 {
            entry(&mut map, "maxLength", Value::Number(string_rules.max_len.into()));
        }
        if !string_rules.pattern.is_empty() {
            entry(&mut map, "pattern", s(&string_rules.pattern));
        }
        if !string_rules.r#in.is_empty() {
            let values: Vec<Value> = string_rules.r#in.iter().map(|v| s(v)).collect();
            entry(&mut map, "enum", Value::Sequence(values));
        }
        if !string_rules.well_known.is_empty() {
            entry(&mut map, "format", s(&string_rules.well_known));
        }
    }

    if let Some(numeric) = &rules.numeric {
        if numeric.has_gte {
            entry(&mut map, "minimum", number(numeric.gte));
        } else if numeric.has_gt {
            entry(&mut map, "exclusiveMinimum", number(numeric.gt));
        }
        if numeric.has_lte {
            entry(&mut map, "maximum", number(numeric.lte));
        } else if numeric.has_lt {
            entry(&mut map, "exclusiveMaximum", number(numeric.lt));
        }
    }

    if let Some(repeated) = &rules.repeated {
        if repeated.has_min_items {
            entry(&mut map, "minItems", Value::Number(repeated.min_items.into()));
        }
        if repeated.has_max_items {
            entry(&mut map, "maxItems", Value::Number(repeated.max_items.into()));
        }
    }

    Value::Mapping(map)
}

fn number(value: f64) -> Value {
    Value::Number(serde_yaml_ng::Number::from(value))
}

/// The always-present built-in error schemas.
pub(crate) fn builtin_error_schemas() -> Vec<(String, Value)> {
    let field_violation = obj(vec![
        ("type", s("object")),
        (
            "properties",
            obj(vec![
                ("field", obj(vec![("type", s("string"))])),
                ("description", obj(vec![("type", s("string"))])),
            ]),
        ),
        (
            "required",
            Value::Sequence(vec![s("field"), s("description")]),
        ),
    ]);
    let validation_error = obj(vec![
        ("type", s("object")),
        (
            "properties",
            obj(vec![(
                "violations",
                obj(vec![
                    ("type", s("array")),
                    ("items", ref_to("FieldViolation")),
                ]),
            )]),
        ),
        ("required", Value::Sequence(vec![s("violations")])),
    ]);
    let error = obj(vec![
        ("type", s("object")),
        (
            "properties",
            obj(vec![("message", obj(vec![("type", s("string"))]))]),
        ),
        ("required", Value::Sequence(vec![s("message")])),
    ]);
    vec![
        ("Error".to_string(), error),
        ("FieldViolation".to_string(), field_violation),
        ("ValidationError".to_string(), validation_error),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proto_rest_model::EncodingPolicy;

    use super::*;

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
            file: "shop.proto".to_string(),
            package: "shop.v1".to_string(),
            fields,
            oneofs: vec![],
            doc: String::new(),
        }
    }

    fn empty_model() -> Model {
        Model::new(vec![], vec![], vec![])
    }

    fn as_yaml(value: &Value) -> String {
        serde_yaml_ng::to_string(value).unwrap()
    }

    #[test]
    fn integer_formats_follow_proto3_json() {
        let model = empty_model();
        assert_eq!(
            as_yaml(&scalar_schema(&model, &field("x", FieldKind::Int32), &FieldKind::Int32)),
            "type: integer\nformat: int32\n",
        );
        let uint32 = as_yaml(&scalar_schema(
            &model,
            &field("x", FieldKind::Uint32),
            &FieldKind::Uint32,
        ));
        assert!(uint32.contains("minimum: 0"), "uint32 adds minimum: {uint32}");
        // int64 defaults to STRING encoding.
        assert_eq!(
            as_yaml(&scalar_schema(&model, &field("x", FieldKind::Int64), &FieldKind::Int64)),
            "type: string\nformat: int64\n",
        );
        let mut number_field = field("x", FieldKind::Uint64);
        number_field.encoding.int64 = Int64Encoding::Number;
        assert_eq!(
            as_yaml(&scalar_schema(&model, &number_field, &FieldKind::Uint64)),
            "type: integer\n",
        );
    }

    #[test]
    fn timestamp_is_primitive_never_a_ref() {
        let model = empty_model();
        let mut ts = field("at", FieldKind::Timestamp);
        assert_eq!(
            as_yaml(&scalar_schema(&model, &ts, &FieldKind::Timestamp)),
            "type: string\nformat: date-time\n",
        );
        ts.encoding.timestamp = Some(TimestampFormat::UnixMillis);
        assert_eq!(
            as_yaml(&scalar_schema(&model, &ts, &FieldKind::Timestamp)),
            "type: integer\nformat: int64\n",
        );
        ts.encoding.timestamp = Some(TimestampFormat::Date);
        assert_eq!(
            as_yaml(&scalar_schema(&model, &ts, &FieldKind::Timestamp)),
            "type: string\nformat: date\n",
        );
    }

    #[test]
    fn repeated_and_map_cardinalities() {
        let model = empty_model();
        let mut tags = field("tags", FieldKind::String);
        tags.cardinality = Cardinality::Repeated;
        let yaml = as_yaml(&property_schema(&model, &tags));
        assert!(yaml.contains("type: array"));
        assert!(yaml.contains("items:"));

        let mut counts = field("counts", FieldKind::Int32);
        counts.cardinality = Cardinality::Map {
            key: FieldKind::String,
            value: FieldKind::Int32,
        };
        let yaml = as_yaml(&property_schema(&model, &counts));
        assert!(yaml.contains("additionalProperties:"));
    }

    #[test]
    fn unwrapped_wrapper_collapses_to_array() {
        let bar = message("shop.v1.Bar", vec![field("symbol", FieldKind::String)]);
        let mut bar_list = message(
            "shop.v1.BarList",
            vec![field("bars", FieldKind::Message("shop.v1.Bar".to_string()))],
        );
        bar_list.fields[0].cardinality = Cardinality::Repeated;
        bar_list.fields[0].encoding.unwrap = true;
        let model = Model::new(vec![], vec![bar, bar_list.clone()], vec![]);

        let yaml = as_yaml(&message_schema(&model, &bar_list));
        assert!(yaml.contains("type: array"), "collapsed: {yaml}");
        assert!(!yaml.contains("properties"), "no wrapper object: {yaml}");
        assert!(yaml.contains("#/components/schemas/Bar"));
    }

    #[test]
    fn flatten_is_modeled_via_all_of() {
        let addr = message(
            "shop.v1.Address",
            vec![field("street", FieldKind::String), field("zip", FieldKind::String)],
        );
        let mut depot = message(
            "shop.v1.Depot",
            vec![
                field("name", FieldKind::String),
                field("address", FieldKind::Message("shop.v1.Address".to_string())),
            ],
        );
        depot.fields[1].cardinality = Cardinality::Optional;
        depot.fields[1].encoding.flatten = Some("addr_".to_string());
        let model = Model::new(vec![], vec![addr, depot.clone()], vec![]);

        let yaml = as_yaml(&message_schema(&model, &depot));
        assert!(yaml.contains("allOf:"), "allOf present: {yaml}");
        assert!(yaml.contains("addr_street:"), "prefixed sibling: {yaml}");
        assert!(yaml.contains("addr_zip:"), "prefixed sibling: {yaml}");
    }

    #[test]
    fn discriminated_oneof_emits_one_of_with_mapping() {
        let email = message("shop.v1.EmailAuth", vec![field("address", FieldKind::String)]);
        let token = message("shop.v1.TokenAuth", vec![field("value", FieldKind::String)]);
        let mut login = message(
            "shop.v1.Login",
            vec![
                field("email", FieldKind::Message("shop.v1.EmailAuth".to_string())),
                field("token", FieldKind::Message("shop.v1.TokenAuth".to_string())),
            ],
        );
        login.fields[0].oneof_index = Some(0);
        login.fields[1].oneof_index = Some(0);
        login.oneofs = vec![Oneof {
            name: "method".to_string(),
            fields: vec![0, 1],
            discriminator: Some(proto_rest_model::OneofDiscriminator {
                property: "kind".to_string(),
                flatten: true,
                values: vec![
                    ("email".to_string(), "email".to_string()),
                    ("token".to_string(), "token".to_string()),
                ],
            }),
            doc: String::new(),
        }];
        let model = Model::new(vec![], vec![email, token, login.clone()], vec![]);

        let yaml = as_yaml(&message_schema(&model, &login));
        assert!(yaml.contains("oneOf:"));
        assert!(yaml.contains("propertyName: kind"));
        assert!(yaml.contains("#/components/schemas/LoginEmail"));

        let variants = variant_schemas(&model, &login);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].0, "LoginEmail");
        let variant_yaml = as_yaml(&variants[0].1);
        assert!(variant_yaml.contains("allOf:"), "flattened variant: {variant_yaml}");
        assert!(variant_yaml.contains("#/components/schemas/EmailAuth"));
    }

    #[test]
    fn validation_rules_become_constraints() {
        let model = empty_model();
        let mut name = field("name", FieldKind::String);
        name.rules = Some(FieldRules {
            string: Some(proto_rest_core::descriptor::StringRules {
                min_len: 3,
                max_len: 64,
                pattern: "^[a-z]+$".to_string(),
                r#in: vec![],
                well_known: String::new(),
            }),
            numeric: None,
            repeated: None,
            required: false,
        });
        let yaml = as_yaml(&property_schema(&model, &name));
        assert!(yaml.contains("minLength: 3"));
        assert!(yaml.contains("maxLength: 64"));
        assert!(yaml.contains("pattern: ^[a-z]+$"));
    }

    #[test]
    fn examples_propagate_with_first_as_example() {
        let model = empty_model();
        let mut price = field("price", FieldKind::Double);
        price.examples = vec!["150.0".to_string(), "200.5".to_string()];
        let yaml = as_yaml(&property_schema(&model, &price));
        assert!(yaml.contains("example: 150"), "first example: {yaml}");
        assert!(yaml.contains("examples:"), "examples list: {yaml}");
    }

    #[test]
    fn nullable_allows_null_type() {
        let model = empty_model();
        let mut nick = field("nick", FieldKind::String);
        nick.cardinality = Cardinality::Optional;
        nick.encoding.nullable = true;
        let yaml = as_yaml(&property_schema(&model, &nick));
        assert!(yaml.contains("null"), "null accepted: {yaml}");
    }

    #[test]
    fn builtin_error_schemas_are_complete() {
        let schemas = builtin_error_schemas();
        let names: Vec<&str> = schemas.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Error", "FieldViolation", "ValidationError"]);
        let validation = &schemas[2].1;
        let yaml = as_yaml(validation);
        assert!(yaml.contains("#/components/schemas/FieldViolation"));
    }
}
