//! TypeScript client back-end.
//!
//! Emits exactly one module per generate-flagged proto file with services:
//! string-literal enum unions, interfaces for every message reachable from
//! the file's services, a fetch-based client class per service, and the
//! error classes of the shared contract.
//!
//! The interfaces describe the wire shape directly — flattened fields appear
//! inlined, discriminated oneofs as tagged unions, unwrapped wrappers as
//! type aliases, STRING-encoded 64-bit integers as `string` — so message
//! marshalling is `JSON.stringify`/`JSON.parse`; the generated codec only
//! adds unknown-discriminator detection and error-shape decoding.

use proto_rest_core::{EnumEncoding, Int64Encoding, TimestampFormat};
use proto_rest_core::plugin::GeneratedFile;
use proto_rest_model::{
    Cardinality, Enum, Field, FieldKind, File, Message, Model, Oneof, Route, Service,
};

use crate::config::{GenerateError, Parameter, PathsMode};
use crate::naming::{header_ident, to_camel_case, to_pascal_case};
use crate::printer::Printer;

const TOOL: &str = "protoc-gen-rest-ts";

/// Configuration for the TypeScript back-end.
#[derive(Debug, Clone, Default)]
pub struct TsGenConfig {
    pub(crate) paths: PathsMode,
}

impl TsGenConfig {
    /// Create a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output path layout.
    #[must_use]
    pub fn paths(mut self, mode: PathsMode) -> Self {
        self.paths = mode;
        self
    }

    pub(crate) fn from_parameter(parameter: &Parameter) -> Self {
        Self {
            paths: parameter.paths,
        }
    }
}

/// Generate one TypeScript module per generate-flagged file with services.
///
/// # Errors
///
/// Returns [`GenerateError`] if route derivation fails (possible only on an
/// unvalidated model).
pub fn generate_typescript(
    model: &Model,
    config: &TsGenConfig,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let mut files = Vec::new();
    for file in model.files().iter().filter(|f| f.generate) {
        if file.services.is_empty() {
            continue;
        }
        let base = file.basename().to_string();
        files.push(GeneratedFile::new(
            config.paths.output_path(file, &format!("{base}_client.ts")),
            emit_module(model, file)?,
        ));
    }
    Ok(files)
}

fn emit_module(model: &Model, file: &File) -> Result<String, GenerateError> {
    let mut p = Printer::new();
    p.line(&format!("// Code generated by {TOOL}. DO NOT EDIT."));
    p.line(&format!("// source: {}", file.name));
    p.line("");
    p.line("/* eslint-disable */");
    p.line("");
    emit_error_classes(&mut p);
    p.line("");

    let (messages, enums) = reachable_from_services(model, file);

    for enum_def in &enums {
        emit_enum(&mut p, enum_def);
        p.line("");
    }
    for message in &messages {
        emit_message(&mut p, model, message);
        p.line("");
    }
    for message in &messages {
        if message.oneofs.iter().any(|o| o.discriminator.is_some()) {
            emit_variant_check(&mut p, message);
            p.line("");
        }
    }

    for service in &file.services {
        emit_client_class(&mut p, model, service)?;
        p.line("");
    }

    Ok(p.finish())
}

/// Messages reachable from the file's service signatures (transitive
/// closure), plus the enums they reference.
fn reachable_from_services<'a>(model: &'a Model, file: &File) -> (Vec<&'a Message>, Vec<&'a Enum>) {
    let mut roots: Vec<&str> = Vec::new();
    for service in &file.services {
        for method in &service.methods {
            roots.push(&method.input);
            roots.push(&method.output);
        }
    }
    let messages = model.reachable_messages(&roots);

    let mut enums: Vec<&Enum> = Vec::new();
    for message in &messages {
        for field in &message.fields {
            let mut push = |fqn: &str| {
                if let Some(e) = model.enum_def(fqn) {
                    if !enums.iter().any(|known| known.fqn == e.fqn) {
                        enums.push(e);
                    }
                }
            };
            if let FieldKind::Enum(fqn) = &field.kind {
                push(fqn);
            }
            if let Cardinality::Map { value, .. } = &field.cardinality {
                if let FieldKind::Enum(fqn) = value {
                    push(fqn);
                }
            }
        }
    }
    (messages, enums)
}

fn emit_error_classes(p: &mut Printer) {
    p.lines(
        "/** A single failed check on one field or header. */
export interface FieldViolation {
  field: string;
  description: string;
}

/** Request validation failure (HTTP 400). Discriminate with `instanceof`. */
export class ValidationError extends globalThis.Error {
  readonly violations: FieldViolation[];

  constructor(violations: FieldViolation[]) {
    super(
      violations.length > 0
        ? `ValidationError: ${violations[0].field}: ${violations[0].description}`
        : \"ValidationError: validation failed\",
    );
    this.name = \"ValidationError\";
    this.violations = violations;
  }
}

/** Generic API error envelope. Discriminate with `instanceof`. */
export class Error extends globalThis.Error {
  readonly status: number;

  constructor(status: number, message: string) {
    super(`Error: ${message}`);
    this.name = \"Error\";
    this.status = status;
  }
}

/** A discriminated oneof carried an unrecognized tag value. */
export class UnknownVariantError extends globalThis.Error {
  readonly property: string;
  readonly value: string;

  constructor(property: string, value: string) {
    super(`unknown discriminator value '${value}' for '${property}'`);
    this.name = \"UnknownVariantError\";
    this.property = property;
    this.value = value;
  }
}

/** Decode a non-2xx response body into the matching error shape. */
function decodeError(status: number, body: string): globalThis.Error {
  try {
    const parsed = JSON.parse(body);
    if (status === 400 && Array.isArray(parsed?.violations)) {
      return new ValidationError(parsed.violations);
    }
    if (typeof parsed?.message === \"string\" && parsed.message.length > 0) {
      return new Error(status, parsed.message);
    }
  } catch {
    // not JSON; fall through to the raw body
  }
  return new Error(status, body);
}",
    );
}

fn emit_enum(p: &mut Printer, enum_def: &Enum) {
    ts_doc(p, &enum_def.doc);
    let tokens: Vec<String> = enum_def
        .values
        .iter()
        .map(|v| format!("\"{}\"", v.wire_name()))
        .collect();
    p.line(&format!(
        "export type {} = {};",
        enum_def.type_name(),
        tokens.join(" | "),
    ));
}

fn ts_doc(p: &mut Printer, doc: &str) {
    if doc.is_empty() {
        return;
    }
    let mut lines = doc.lines();
    if doc.lines().count() == 1 {
        p.line(&format!("/** {} */", lines.next().unwrap_or_default()));
    } else {
        p.line("/**");
        for line in lines {
            p.line(&format!(" * {line}"));
        }
        p.line(" */");
    }
}

/// Wire-shape TypeScript type of a field's value.
fn ts_scalar(model: &Model, field: &Field, kind: &FieldKind) -> String {
    match kind {
        FieldKind::Double
        | FieldKind::Float
        | FieldKind::Int32
        | FieldKind::Uint32 => "number".to_string(),
        FieldKind::Int64 | FieldKind::Uint64 => match field.encoding.int64 {
            Int64Encoding::String => "string".to_string(),
            Int64Encoding::Number => "number".to_string(),
        },
        FieldKind::Bool => "boolean".to_string(),
        // JSON wire is textual regardless of the base64/hex variant.
        FieldKind::String | FieldKind::Bytes => "string".to_string(),
        FieldKind::Enum(fqn) => match field.encoding.enums {
            EnumEncoding::Name => model
                .enum_def(fqn)
                .map_or_else(|| "string".to_string(), Enum::type_name),
            EnumEncoding::Number => "number".to_string(),
        },
        FieldKind::Message(fqn) => model
            .message(fqn)
            .map_or_else(|| "unknown".to_string(), Message::type_name),
        FieldKind::Timestamp => match field.encoding.timestamp.unwrap_or_default() {
            TimestampFormat::Rfc3339 | TimestampFormat::Date => "string".to_string(),
            TimestampFormat::UnixSeconds | TimestampFormat::UnixMillis => "number".to_string(),
        },
    }
}

fn ts_type(model: &Model, field: &Field) -> String {
    match &field.cardinality {
        Cardinality::Repeated => format!("{}[]", ts_scalar(model, field, &field.kind)),
        Cardinality::Map { .. } => {
            format!("Record<string, {}>", ts_scalar(model, field, &field.kind))
        }
        _ => ts_scalar(model, field, &field.kind),
    }
}

fn emit_message(p: &mut Printer, model: &Model, message: &Message) {
    let name = message.type_name();

    // Unwrapped wrappers collapse to their single field's wire type.
    if message.is_root_unwrap() {
        ts_doc(p, &message.doc);
        p.line(&format!(
            "export type {name} = {};",
            ts_type(model, &message.fields[0]),
        ));
        return;
    }

    let discriminated: Vec<&Oneof> = message
        .oneofs
        .iter()
        .filter(|o| o.discriminator.is_some())
        .collect();

    if discriminated.is_empty() {
        ts_doc(p, &message.doc);
        p.open(&format!("export interface {name} {{"));
        emit_base_fields(p, model, message);
        p.close("}");
        return;
    }

    // Tagged unions: base interface (when it has fields) intersected with
    // one union per discriminated oneof.
    let has_base = message
        .fields
        .iter()
        .any(|f| f.oneof_index.is_none() || discriminated_index(message, f).is_none());
    if has_base {
        ts_doc(p, &message.doc);
        p.open(&format!("export interface {name}Base {{"));
        emit_base_fields(p, model, message);
        p.close("}");
        p.line("");
    }

    let mut unions = Vec::new();
    for oneof in &discriminated {
        let Some(disc) = &oneof.discriminator else {
            continue;
        };
        let mut variants = Vec::new();
        for &index in &oneof.fields {
            let field = &message.fields[index];
            let tag = disc.value_for(&field.name);
            if disc.flatten {
                variants.push(format!(
                    "({{ {}: \"{tag}\" }} & {})",
                    disc.property,
                    ts_scalar(model, field, &field.kind),
                ));
            } else {
                variants.push(format!(
                    "{{ {}: \"{tag}\"; {}: {} }}",
                    disc.property,
                    field.json_name,
                    ts_scalar(model, field, &field.kind),
                ));
            }
        }
        // The oneof may be unset; an undefined tag selects no variant.
        variants.push(format!("{{ {}?: undefined }}", disc.property));
        unions.push(format!("({})", variants.join(" | ")));
    }

    if has_base {
        p.line(&format!(
            "export type {name} = {name}Base & {};",
            unions.join(" & "),
        ));
    } else {
        ts_doc(p, &message.doc);
        p.line(&format!("export type {name} = {};", unions.join(" & ")));
    }
}

fn discriminated_index(message: &Message, field: &Field) -> Option<usize> {
    let index = field.oneof_index?;
    message.oneofs[index]
        .discriminator
        .as_ref()
        .map(|_| index)
}

/// Interface properties: plain fields, inlined flattened children, and
/// non-discriminated oneof members as optional properties.
fn emit_base_fields(p: &mut Printer, model: &Model, message: &Message) {
    for field in &message.fields {
        if let Some(index) = field.oneof_index {
            if message.oneofs[index].discriminator.is_some() {
                continue;
            }
            ts_doc(p, &field.doc);
            p.line(&format!(
                "{}?: {};",
                field.json_name,
                ts_scalar(model, field, &field.kind),
            ));
            continue;
        }

        if let Some(prefix) = &field.encoding.flatten {
            if let FieldKind::Message(child_fqn) = &field.kind {
                if let Some(child) = model.message(child_fqn) {
                    for child_field in &child.fields {
                        p.line(&format!(
                            "{prefix}{}?: {};",
                            child_field.json_name,
                            ts_type(model, child_field),
                        ));
                    }
                    continue;
                }
            }
        }

        ts_doc(p, &field.doc);
        let optional = matches!(field.cardinality, Cardinality::Optional);
        if field.encoding.nullable {
            p.line(&format!(
                "{}?: {} | null;",
                field.json_name,
                ts_type(model, field),
            ));
        } else if optional {
            p.line(&format!("{}?: {};", field.json_name, ts_type(model, field)));
        } else {
            p.line(&format!("{}: {};", field.json_name, ts_type(model, field)));
        }
    }
}

/// Decode-side guard: reject unknown discriminator values instead of
/// returning a value whose tag matches no variant.
fn emit_variant_check(p: &mut Printer, message: &Message) {
    let name = message.type_name();
    p.line(&format!(
        "/** Validate discriminator tags before treating a value as {name}. */",
    ));
    p.open(&format!(
        "function decode{name}(value: unknown): {name} {{",
    ));
    p.line("const record = value as Record<string, unknown>;");
    for oneof in &message.oneofs {
        let Some(disc) = &oneof.discriminator else { continue };
        let tags: Vec<String> = disc
            .values
            .iter()
            .map(|(_, tag)| format!("\"{tag}\""))
            .collect();
        p.line(&format!(
            "const {} = record?.[\"{}\"];",
            to_camel_case(&disc.property),
            disc.property,
        ));
        p.open(&format!(
            "if ({0} !== undefined && ![{1}].includes({0} as string)) {{",
            to_camel_case(&disc.property),
            tags.join(", "),
        ));
        p.line(&format!(
            "throw new UnknownVariantError(\"{}\", String({}));",
            disc.property,
            to_camel_case(&disc.property),
        ));
        p.close("}");
    }
    p.line(&format!("return value as {name};"));
    p.close("}");
}

fn emit_client_class(p: &mut Printer, model: &Model, service: &Service) -> Result<(), GenerateError> {
    let name = &service.name;
    p.open(&format!("export interface {name}ClientOptions {{"));
    p.line("/** Alternative fetch implementation (polyfill, instrumentation). */");
    p.line("fetch?: typeof fetch;");
    p.line("/** Headers sent on every call. */");
    p.line("headers?: Record<string, string>;");
    p.line("/** Content type for request bodies (JSON only in this client). */");
    p.line("contentType?: string;");
    p.close("}");
    p.line("");

    ts_doc(p, &service.doc);
    if service.doc.is_empty() {
        p.line(&format!("/** HTTP client for {name}. */"));
    }
    p.open(&format!("export class {name}Client {{"));
    p.line("private readonly baseUrl: string;");
    p.line("private readonly fetchImpl: typeof fetch;");
    p.line("private readonly defaultHeaders: Record<string, string>;");
    p.line("private readonly contentType: string;");
    p.line("");
    p.open(&format!(
        "constructor(baseUrl: string, options: {name}ClientOptions = {{}}) {{",
    ));
    p.line("this.baseUrl = baseUrl.replace(/\\/+$/, \"\");");
    p.line("this.fetchImpl = options.fetch ?? fetch;");
    p.line("this.defaultHeaders = { ...(options.headers ?? {}) };");
    p.line("this.contentType = options.contentType ?? \"application/json\";");
    p.close("}");

    for header in crate::client::declared_headers(service) {
        p.line("");
        if header.description.is_empty() {
            p.line(&format!("/** Set the {} header on every call. */", header.name));
        } else {
            p.line(&format!(
                "/** Set the {} header on every call: {} */",
                header.name, header.description,
            ));
        }
        let camel = to_pascal_case(&header_ident(&header.name));
        p.open(&format!("with{camel}(value: string): this {{"));
        p.line(&format!("this.defaultHeaders[\"{}\"] = value;", header.name));
        p.line("return this;");
        p.close("}");
    }

    for method in &service.methods {
        let Some(input) = model.message(&method.input) else {
            continue;
        };
        let route = Route::derive(service, method, input)?;
        p.line("");
        emit_ts_method(p, model, service, method, input, &route);
    }
    p.close("}");
    Ok(())
}

fn emit_ts_method(
    p: &mut Printer,
    model: &Model,
    service: &Service,
    method: &proto_rest_model::Method,
    input: &Message,
    route: &Route,
) {
    let camel = to_camel_case(&crate::naming::to_snake_case(&method.name));
    let input_type = input.type_name();
    let output = model.message(&method.output);
    let output_type = output.map_or_else(|| "unknown".to_string(), Message::type_name);

    ts_doc(p, &method.doc);
    if method.doc.is_empty() {
        p.line(&format!("/** Call {}.{}. */", service.name, method.name));
    }
    p.open(&format!(
        "async {camel}(request: {input_type}, options?: {{ headers?: Record<string, string> }}): Promise<{output_type}> {{",
    ));

    // Path substitution.
    let template = ts_path_template(route, input);
    p.line(&format!("let url = `${{this.baseUrl}}{template}`;"));

    // Query parameters, zero values omitted.
    if route.query_params.is_empty() {
        p.line("const query: string[] = [];");
    } else {
        p.line("const query: string[] = [];");
        for query_param in &route.query_params {
            let field = &input.fields[query_param.field];
            let access = format!("request.{}", field.json_name);
            let zero_check = match (&field.cardinality, &field.kind) {
                (Cardinality::Optional, _) => format!("{access} !== undefined && {access} !== null"),
                (_, FieldKind::String) => format!("{access} !== \"\""),
                (_, FieldKind::Bool) => access.clone(),
                (_, FieldKind::Int64 | FieldKind::Uint64)
                    if field.encoding.int64 == Int64Encoding::String =>
                {
                    format!("{access} !== \"0\" && {access} !== \"\"")
                }
                _ => format!("{access} !== 0"),
            };
            p.open(&format!("if ({zero_check}) {{"));
            p.line(&format!(
                "query.push(`{}=${{encodeURIComponent(String({access}))}}`);",
                query_param.name,
            ));
            p.close("}");
        }
    }
    p.open("if (query.length > 0) {");
    p.line("url += `?${query.join(\"&\")}`;");
    p.close("}");

    // Request.
    p.open("const response = await this.fetchImpl(url, {");
    p.line(&format!("method: \"{}\",", route.verb.as_verb()));
    p.open("headers: {");
    p.line("...this.defaultHeaders,");
    p.line("...(options?.headers ?? {}),");
    p.line("Accept: this.contentType,");
    if route.has_body() {
        p.line("\"Content-Type\": this.contentType,");
    }
    p.close("},");
    if route.has_body() {
        p.line("body: JSON.stringify(request),");
    }
    p.close("});");

    p.line("const text = await response.text();");
    p.open("if (!response.ok) {");
    p.line("throw decodeError(response.status, text);");
    p.close("}");
    let needs_check = output.is_some_and(|m| m.oneofs.iter().any(|o| o.discriminator.is_some()));
    if needs_check {
        p.line(&format!(
            "return decode{output_type}(JSON.parse(text));",
        ));
    } else {
        p.line(&format!("return JSON.parse(text) as {output_type};"));
    }
    p.close("}");
}

/// Template-literal path with `${request.field}` substitutions.
fn ts_path_template(route: &Route, input: &Message) -> String {
    let mut template = String::new();
    let mut rest = route.path.as_str();
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        template.push_str(&rest[..start]);
        let var = &rest[start + 1..start + end];
        if let Some(path_var) = route.path_vars.iter().find(|pv| pv.var == var) {
            template.push_str(&format!(
                "${{request.{}}}",
                input.fields[path_var.field].json_name,
            ));
        }
        rest = &rest[start + end + 1..];
    }
    template.push_str(rest);
    template
}
