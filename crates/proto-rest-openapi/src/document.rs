//! Per-service document assembly.
//!
//! One OpenAPI 3.1.0 document per service: `info`, `paths` (verb, header /
//! path / query parameters, request body, the shared response set), and
//! `components.schemas` holding the transitive message closure plus the
//! built-in error shapes. Everything is built in model order so output is
//! byte-stable across runs.

use proto_rest_core::plugin::GeneratedFile;
use proto_rest_gen::GenerateError;
use proto_rest_model::{
    Cardinality, FieldKind, Header, HeaderType, Message, Model, Route, Service,
};
use serde_yaml_ng::{Mapping, Value};

use crate::config::OpenapiGenConfig;
use crate::schema::{
    builtin_error_schemas, entry, enum_schema, message_schema, obj, property_schema, ref_to, s,
    scalar_schema, variant_schemas,
};

/// Generate one document per service across the generate-flagged files.
///
/// # Errors
///
/// Returns [`GenerateError`] if route derivation fails (possible only on an
/// unvalidated model).
pub fn generate_openapi(
    model: &Model,
    config: &OpenapiGenConfig,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let mut files = Vec::new();
    for file in model.files().iter().filter(|f| f.generate) {
        for service in &file.services {
            let document = service_document(model, service)?;
            let (name, content) = if config.json_format {
                (
                    format!("{}.openapi.json", service.name),
                    to_json(&document)?,
                )
            } else {
                (
                    format!("{}.openapi.yaml", service.name),
                    serde_yaml_ng::to_string(&document)
                        .map_err(|e| GenerateError::Render(e.to_string()))?,
                )
            };
            files.push(GeneratedFile::new(name, content));
        }
    }
    Ok(files)
}

fn to_json(document: &Value) -> Result<String, GenerateError> {
    let mut out = serde_json::to_string_pretty(document)
        .map_err(|e| GenerateError::Render(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn service_document(model: &Model, service: &Service) -> Result<Value, GenerateError> {
    let mut document = Mapping::new();
    entry(&mut document, "openapi", s("3.1.0"));
    entry(
        &mut document,
        "info",
        obj(vec![
            ("title", s(&format!("{} API", service.name))),
            ("version", s("1.0.0")),
        ]),
    );

    // Paths, method order; multiple methods on one path share its entry.
    let mut paths = Mapping::new();
    for method in &service.methods {
        let Some(input) = model.message(&method.input) else {
            continue;
        };
        let route = Route::derive(service, method, input)?;
        let operation = operation(model, method, input, &route);
        let path_key = s(&route.path);
        let verb = route.verb.as_verb().to_ascii_lowercase();
        match paths.get_mut(&path_key) {
            Some(Value::Mapping(existing)) => {
                entry(existing, &verb, operation);
            }
            _ => {
                let mut item = Mapping::new();
                entry(&mut item, &verb, operation);
                paths.insert(path_key, Value::Mapping(item));
            }
        }
    }
    entry(&mut document, "paths", Value::Mapping(paths));

    // Component schemas: the service's transitive closure, then variant
    // schemas, enums, and the built-in error shapes.
    let mut roots: Vec<&str> = Vec::new();
    for method in &service.methods {
        roots.push(&method.input);
        roots.push(&method.output);
    }
    let messages = model.reachable_messages(&roots);

    let mut schemas = Mapping::new();
    for message in &messages {
        entry(&mut schemas, &message.type_name(), message_schema(model, message));
        for (name, schema) in variant_schemas(model, message) {
            entry(&mut schemas, &name, schema);
        }
    }
    for message in &messages {
        for field in &message.fields {
            let mut add_enum = |fqn: &str| {
                if let Some(enum_def) = model.enum_def(fqn) {
                    if field.encoding.enums == proto_rest_core::EnumEncoding::Name
                        && !schemas.contains_key(enum_def.type_name().as_str())
                    {
                        entry(&mut schemas, &enum_def.type_name(), enum_schema(enum_def));
                    }
                }
            };
            if let FieldKind::Enum(fqn) = &field.kind {
                add_enum(fqn);
            }
            if let Cardinality::Map { value, .. } = &field.cardinality {
                if let FieldKind::Enum(fqn) = value {
                    add_enum(fqn);
                }
            }
        }
    }
    for (name, schema) in builtin_error_schemas() {
        if !schemas.contains_key(name.as_str()) {
            entry(&mut schemas, &name, schema);
        }
    }

    entry(
        &mut document,
        "components",
        obj(vec![("schemas", Value::Mapping(schemas))]),
    );

    Ok(Value::Mapping(document))
}

fn operation(
    model: &Model,
    method: &proto_rest_model::Method,
    input: &Message,
    route: &Route,
) -> Value {
    let mut op = Mapping::new();
    entry(&mut op, "operationId", s(&method.name));
    if !method.doc.is_empty() {
        let mut lines = method.doc.lines();
        entry(&mut op, "summary", s(lines.next().unwrap_or_default()));
        let rest: Vec<&str> = lines.collect();
        if !rest.is_empty() {
            entry(&mut op, "description", s(rest.join("\n").trim_start()));
        }
    }

    let mut parameters = Vec::new();
    for header in &route.headers {
        parameters.push(header_parameter(header));
    }
    for path_var in &route.path_vars {
        let field = &input.fields[path_var.field];
        parameters.push(obj(vec![
            ("name", s(&path_var.var)),
            ("in", s("path")),
            ("required", Value::Bool(true)),
            ("schema", scalar_schema(model, field, &field.kind)),
        ]));
    }
    for query_param in &route.query_params {
        let field = &input.fields[query_param.field];
        parameters.push(obj(vec![
            ("name", s(&query_param.name)),
            ("in", s("query")),
            ("required", Value::Bool(query_param.required)),
            ("schema", property_schema(model, field)),
        ]));
    }
    if !parameters.is_empty() {
        entry(&mut op, "parameters", Value::Sequence(parameters));
    }

    if route.has_body() {
        entry(
            &mut op,
            "requestBody",
            obj(vec![
                ("required", Value::Bool(true)),
                (
                    "content",
                    obj(vec![(
                        "application/json",
                        obj(vec![("schema", ref_to(&input.type_name()))]),
                    )]),
                ),
            ]),
        );
    }

    let output_ref = model
        .message(&method.output)
        .map_or_else(|| obj(vec![("type", s("object"))]), |m| ref_to(&m.type_name()));
    entry(
        &mut op,
        "responses",
        obj(vec![
            (
                "200",
                response("Success", output_ref),
            ),
            (
                "400",
                response("Request validation failure", ref_to("ValidationError")),
            ),
            ("default", response("Unexpected error", ref_to("Error"))),
        ]),
    );

    Value::Mapping(op)
}

fn response(description: &str, schema: Value) -> Value {
    obj(vec![
        ("description", s(description)),
        (
            "content",
            obj(vec![("application/json", obj(vec![("schema", schema)]))]),
        ),
    ])
}

fn header_parameter(header: &Header) -> Value {
    let mut schema = Mapping::new();
    entry(&mut schema, "type", s(header.ty.as_openapi()));
    if header.ty == HeaderType::Array {
        entry(&mut schema, "items", obj(vec![("type", s("string"))]));
    }
    if let Some(format) = header.format {
        entry(&mut schema, "format", s(format.as_openapi()));
    }

    let mut parameter = Mapping::new();
    entry(&mut parameter, "name", s(&header.name));
    entry(&mut parameter, "in", s("header"));
    if !header.description.is_empty() {
        entry(&mut parameter, "description", s(&header.description));
    }
    entry(&mut parameter, "required", Value::Bool(header.required));
    if header.deprecated {
        entry(&mut parameter, "deprecated", Value::Bool(true));
    }
    entry(&mut parameter, "schema", Value::Mapping(schema));
    if let Some(example) = &header.example {
        entry(&mut parameter, "example", s(example));
    }
    Value::Mapping(parameter)
}
