//! HTTP server back-end.
//!
//! For each generate-flagged proto file this emits:
//!
//! - `<proto>_http.rs` — message types with the JSON codec (shared with the
//!   client back-end)
//! - `<proto>_http_binding.rs` — the service contract trait, router
//!   registration, and one dispatch handler per method implementing the
//!   request state machine (match → headers → decode → bind → invoke →
//!   respond; every terminal state writes a body)
//! - `<proto>_http_config.rs` — the per-service option set
//! - `<proto>_http_mock.rs` — optional deterministic mock implementations
//!
//! Generated code targets axum routers and the `proto-rest` runtime crate.
//! The emitted modules expect to be compiled as siblings
//! (`mod shop_http; mod shop_http_binding; ...`).

use std::collections::HashSet;

use proto_rest_core::descriptor::FieldRules;
use proto_rest_core::plugin::GeneratedFile;
use proto_rest_model::{
    Cardinality, Field, FieldKind, File, Header, Message, Method, Model, Route, Service,
};

use crate::config::{GenerateError, ServerGenConfig};
use crate::message_gen;
use crate::naming::{rust_field_ident, str_lit, to_snake_case};
use crate::printer::Printer;

const TOOL: &str = "protoc-gen-rest-server";

/// Generate the server files for every generate-flagged file in the model.
///
/// The model must already have passed [`proto_rest_model::validate`]; route
/// derivation is repeated here only to read the bindings.
///
/// # Errors
///
/// Returns [`GenerateError`] if route derivation fails (possible only on an
/// unvalidated model).
pub fn generate_server(
    model: &Model,
    config: &ServerGenConfig,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let mut files = Vec::new();
    for file in model.files().iter().filter(|f| f.generate) {
        let base = file.basename().to_string();

        files.push(GeneratedFile::new(
            config.paths.output_path(file, &format!("{base}_http.rs")),
            message_gen::emit_types(model, file, TOOL),
        ));

        if file.services.is_empty() {
            continue;
        }
        files.push(GeneratedFile::new(
            config.paths.output_path(file, &format!("{base}_http_config.rs")),
            emit_config(file, &base),
        ));
        files.push(GeneratedFile::new(
            config.paths.output_path(file, &format!("{base}_http_binding.rs")),
            emit_binding(model, file, &base)?,
        ));
        if config.generate_mock {
            files.push(GeneratedFile::new(
                config.paths.output_path(file, &format!("{base}_http_mock.rs")),
                emit_mock(model, file, &base),
            ));
        }
    }
    Ok(files)
}

fn file_header(p: &mut Printer, file: &File, siblings: &str) {
    p.line(&format!("// Code generated by {TOOL}. DO NOT EDIT."));
    p.line(&format!("// source: {}", file.name));
    p.line("//");
    p.line(&format!(
        "// Compile as a sibling module of the other generated files: {siblings}",
    ));
    p.line("");
    p.line("#![allow(clippy::all, clippy::pedantic)]");
    p.line("#![allow(unused_mut)]");
    p.line("");
}

// --- config file ---

fn emit_config(file: &File, base: &str) -> String {
    let mut p = Printer::new();
    file_header(&mut p, file, &format!("{base}_http.rs, {base}_http_binding.rs"));

    for service in &file.services {
        let name = &service.name;
        p.line(&format!("/// Options for the generated `{name}` HTTP surface."));
        p.line("///");
        p.line("/// All options are optional; the defaults accept JSON and binary");
        p.line("/// protobuf, answer in JSON, and route under the annotated base path.");
        p.line("#[derive(Clone)]");
        p.open(&format!("pub struct {name}HttpConfig {{"));
        p.line("pub(crate) router: Option<::axum::Router>,");
        p.line("pub(crate) content_types: Vec<::proto_rest::ContentType>,");
        p.line("pub(crate) default_content_type: ::proto_rest::ContentType,");
        p.line("pub(crate) base_path: Option<String>,");
        p.line("pub(crate) error_status: ::std::collections::HashMap<String, ::axum::http::StatusCode>,");
        p.close("}");
        p.line("");
        p.open(&format!("impl Default for {name}HttpConfig {{"));
        p.open("fn default() -> Self {");
        p.open("Self {");
        p.line("router: None,");
        p.line("content_types: vec![::proto_rest::ContentType::Json, ::proto_rest::ContentType::Proto],");
        p.line("default_content_type: ::proto_rest::ContentType::Json,");
        p.line("base_path: None,");
        p.line("error_status: ::std::collections::HashMap::new(),");
        p.close("}");
        p.close("}");
        p.close("}");
        p.line("");
        p.open(&format!("impl {name}HttpConfig {{"));
        p.line("/// Create a config with defaults.");
        p.open("pub fn new() -> Self {");
        p.line("Self::default()");
        p.close("}");
        p.line("");
        p.line("/// Merge the generated routes into an existing router instead of a");
        p.line("/// fresh one.");
        p.open("pub fn with_router(mut self, router: ::axum::Router) -> Self {");
        p.line("self.router = Some(router);");
        p.line("self");
        p.close("}");
        p.line("");
        p.line("/// Restrict the accepted wire formats.");
        p.open("pub fn with_content_types(mut self, content_types: &[::proto_rest::ContentType]) -> Self {");
        p.line("self.content_types = content_types.to_vec();");
        p.line("self");
        p.close("}");
        p.line("");
        p.line("/// Set the wire format used when the request names none.");
        p.open("pub fn with_default_content_type(mut self, content_type: ::proto_rest::ContentType) -> Self {");
        p.line("self.default_content_type = content_type;");
        p.line("self");
        p.close("}");
        p.line("");
        p.line("/// Route under this base path instead of the annotated one.");
        p.open("pub fn with_base_path_override(mut self, base_path: &str) -> Self {");
        p.line("self.base_path = Some(base_path.to_string());");
        p.line("self");
        p.close("}");
        p.line("");
        p.line("/// Status code for handler errors of the named type (the unqualified");
        p.line("/// message name, e.g. `\"QuotaError\"`). Unmapped types default to 500;");
        p.line("/// `ValidationError` stays 400.");
        p.open("pub fn with_error_status(mut self, type_name: &str, status: ::axum::http::StatusCode) -> Self {");
        p.line("self.error_status.insert(type_name.to_string(), status);");
        p.line("self");
        p.close("}");
        p.close("}");
        p.line("");
    }

    p.finish()
}

// --- binding file ---

fn emit_binding(model: &Model, file: &File, base: &str) -> Result<String, GenerateError> {
    let mut p = Printer::new();
    file_header(&mut p, file, &format!("{base}_http.rs, {base}_http_config.rs"));
    p.line(&format!("use super::{base}_http::*;"));
    p.line(&format!("use super::{base}_http_config::*;"));
    p.line("");

    for service in &file.services {
        emit_trait(&mut p, model, service);
        p.line("");
        emit_state(&mut p, service);
        p.line("");
        emit_register(&mut p, model, service)?;

        let mut validated: HashSet<String> = HashSet::new();
        for method in &service.methods {
            let Some(input) = model.message(&method.input) else {
                continue;
            };
            let route = Route::derive(service, method, input)?;
            p.line("");
            emit_header_specs(&mut p, service, method, &route.headers);
            p.line("");
            emit_handler(&mut p, service, method, input, &route);
            if has_rules(input) && validated.insert(input.fqn.clone()) {
                p.line("");
                emit_validate_fn(&mut p, input);
            }
        }
        p.line("");
    }

    Ok(p.finish())
}

fn emit_trait(p: &mut Printer, model: &Model, service: &Service) {
    p.doc(&service.doc);
    if service.doc.is_empty() {
        p.line(&format!("/// Contract implemented by `{}` handlers.", service.name));
    }
    p.open(&format!("pub trait {} {{", service.name));
    for method in &service.methods {
        let input = model.message(&method.input).map_or_else(String::new, Message::type_name);
        let output = model.message(&method.output).map_or_else(String::new, Message::type_name);
        p.doc(&method.doc);
        p.line(&format!(
            "fn {}(&self, request: {input}) -> impl ::std::future::Future<Output = Result<{output}, ::proto_rest::HandlerError>> + Send;",
            to_snake_case(&method.name),
        ));
    }
    p.close("}");
}

fn emit_state(p: &mut Printer, service: &Service) {
    let name = &service.name;
    p.line("/// Shared handler state: the implementation plus resolved options.");
    p.open(&format!("pub struct {name}State<S> {{"));
    p.line("service: ::std::sync::Arc<S>,");
    p.line(&format!("options: ::std::sync::Arc<{name}HttpConfig>,"));
    p.close("}");
    p.line("");
    p.open(&format!("impl<S> Clone for {name}State<S> {{"));
    p.open("fn clone(&self) -> Self {");
    p.open("Self {");
    p.line("service: self.service.clone(),");
    p.line("options: self.options.clone(),");
    p.close("}");
    p.close("}");
    p.close("}");
}

fn emit_register(p: &mut Printer, model: &Model, service: &Service) -> Result<(), GenerateError> {
    let name = &service.name;
    let snake = to_snake_case(name);
    p.line(&format!("/// Attach `{name}` routes to an axum router."));
    p.line("///");
    p.line("/// Routes are registered under the configured base path override or the");
    p.line("/// annotated base path.");
    p.line(&format!(
        "pub fn register_{snake}<S>(config: {name}HttpConfig, service: ::std::sync::Arc<S>) -> ::axum::Router",
    ));
    p.line("where");
    p.line(&format!("    S: {name} + Send + Sync + 'static,"));
    p.open("{");
    p.line("let mut config = config;");
    p.line("let user_router = config.router.take();");
    p.line(&format!(
        "let base = config.base_path.clone().unwrap_or_else(|| \"{}\".to_string());",
        str_lit(&service.base_path),
    ));
    p.line(&format!(
        "let state = {name}State {{ service, options: ::std::sync::Arc::new(config) }};",
    ));
    p.line("let routes = ::axum::Router::new()");
    for method in &service.methods {
        let Some(input) = model.message(&method.input) else {
            continue;
        };
        let route = Route::derive(service, method, input)?;
        let verb = route.verb.as_verb().to_ascii_lowercase();
        p.line(&format!(
            "    .route(&::proto_rest::join_path(&base, \"{}\"), ::axum::routing::{verb}({snake}_{}::<S>))",
            str_lit(&proto_rest_model::normalize_path(&method.path)),
            to_snake_case(&method.name),
        ));
    }
    p.line("    .with_state(state);");
    p.open("match user_router {");
    p.line("Some(router) => router.merge(routes),");
    p.line("None => routes,");
    p.close("}");
    p.close("}");
    Ok(())
}

fn header_specs_const(service: &Service, method: &Method) -> String {
    format!(
        "{}_{}_HEADERS",
        to_snake_case(&service.name).to_ascii_uppercase(),
        to_snake_case(&method.name).to_ascii_uppercase(),
    )
}

fn emit_header_specs(p: &mut Printer, service: &Service, method: &Method, headers: &[Header]) {
    p.open(&format!(
        "const {}: &[::proto_rest::HeaderSpec] = &[",
        header_specs_const(service, method),
    ));
    for header in headers {
        let kind = match header.ty {
            proto_rest_model::HeaderType::String => "String",
            proto_rest_model::HeaderType::Integer => "Integer",
            proto_rest_model::HeaderType::Number => "Number",
            proto_rest_model::HeaderType::Boolean => "Boolean",
            proto_rest_model::HeaderType::Array => "Array",
        };
        let format = match header.format {
            None => "None".to_string(),
            Some(f) => format!(
                "Some(::proto_rest::HeaderFormatKind::{})",
                match f {
                    proto_rest_model::HeaderFormat::Uuid => "Uuid",
                    proto_rest_model::HeaderFormat::Email => "Email",
                    proto_rest_model::HeaderFormat::DateTime => "DateTime",
                    proto_rest_model::HeaderFormat::Date => "Date",
                    proto_rest_model::HeaderFormat::Time => "Time",
                },
            ),
        };
        p.line(&format!(
            "::proto_rest::HeaderSpec {{ name: \"{}\", kind: ::proto_rest::HeaderKind::{kind}, format: {format}, required: {}, deprecated: {} }},",
            str_lit(&header.name),
            header.required,
            header.deprecated,
        ));
    }
    p.close("];");
}

fn emit_respond_error(p: &mut Printer, content_type: &str, error_expr: &str) {
    p.line(&format!(
        "return ::proto_rest::respond_error({content_type}, &{error_expr}, None);",
    ));
}

#[allow(clippy::too_many_lines)]
fn emit_handler(
    p: &mut Printer,
    service: &Service,
    method: &Method,
    input: &Message,
    route: &Route,
) {
    let snake_service = to_snake_case(&service.name);
    let snake_method = to_snake_case(&method.name);
    let input_type = input.type_name();
    let headers_const = header_specs_const(service, method);

    p.open(&format!("async fn {snake_service}_{snake_method}<S>("));
    p.line(&format!(
        "::axum::extract::State(state): ::axum::extract::State<{}State<S>>,",
        service.name,
    ));
    match route.path_vars.len() {
        0 => {}
        1 => p.line(&format!(
            "::axum::extract::Path(raw_{}): ::axum::extract::Path<String>,",
            route.path_vars[0].var,
        )),
        n => {
            let names: Vec<String> = route
                .path_vars
                .iter()
                .map(|pv| format!("raw_{}", pv.var))
                .collect();
            let types = vec!["String"; n].join(", ");
            p.line(&format!(
                "::axum::extract::Path(({})): ::axum::extract::Path<({types})>,",
                names.join(", "),
            ));
        }
    }
    if !route.query_params.is_empty() {
        p.line("::axum::extract::RawQuery(raw_query): ::axum::extract::RawQuery,");
    }
    p.line("headers: ::axum::http::HeaderMap,");
    if route.has_body() {
        p.line("body: ::axum::body::Bytes,");
    }
    p.close(") -> ::axum::response::Response");
    p.line("where");
    p.line(&format!("    S: {} + Send + Sync + 'static,", service.name));
    p.open("{");

    // Response format first, so every failure can be answered in it.
    p.open("let response_ct = match ::proto_rest::negotiate_response(&headers, &state.options.content_types, state.options.default_content_type) {");
    p.line("Ok(ct) => ct,");
    p.open("Err(media_type) => {");
    p.line("return ::proto_rest::respond_error(");
    p.line("    state.options.default_content_type,");
    p.line("    &::proto_rest::HandlerError::message(format!(\"unsupported media type '{media_type}'\"))");
    p.line("        .with_status(::axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE),");
    p.line("    None,");
    p.line(");");
    p.close("}");
    p.close("};");

    // Declared headers.
    p.open(&format!(
        "if let Err(validation) = ::proto_rest::validate_headers(&headers, {headers_const}) {{",
    ));
    emit_respond_error(p, "response_ct", "::proto_rest::HandlerError::typed(validation)");
    p.close("}");

    // Body (or zero value for bodyless verbs).
    if route.has_body() {
        p.open("let request_ct = match ::proto_rest::negotiate_request(&headers, &state.options.content_types, state.options.default_content_type) {");
        p.line("Ok(ct) => ct,");
        p.open("Err(media_type) => {");
        p.line("return ::proto_rest::respond_error(");
        p.line("    response_ct,");
        p.line("    &::proto_rest::HandlerError::message(format!(\"unsupported media type '{media_type}'\"))");
        p.line("        .with_status(::axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE),");
        p.line("    None,");
        p.line(");");
        p.close("}");
        p.close("};");
        p.open("let mut request = if body.is_empty() {");
        p.line(&format!("{input_type}::default()"));
        p.next("} else {");
        p.open("match request_ct {");
        p.open(&format!(
            "::proto_rest::ContentType::Json => match ::serde_json::from_slice::<{input_type}>(&body) {{",
        ));
        p.line("Ok(request) => request,");
        p.open("Err(e) => {");
        p.line("return ::proto_rest::respond_error(");
        p.line("    response_ct,");
        p.line("    &::proto_rest::HandlerError::message(format!(\"malformed request body: {e}\"))");
        p.line("        .with_status(::axum::http::StatusCode::BAD_REQUEST),");
        p.line("    None,");
        p.line(");");
        p.close("}");
        p.close("},");
        p.open(&format!(
            "::proto_rest::ContentType::Proto => match <{input_type} as ::prost::Message>::decode(body.as_ref()) {{",
        ));
        p.line("Ok(request) => request,");
        p.open("Err(e) => {");
        p.line("return ::proto_rest::respond_error(");
        p.line("    response_ct,");
        p.line("    &::proto_rest::HandlerError::message(format!(\"malformed request body: {e}\"))");
        p.line("        .with_status(::axum::http::StatusCode::BAD_REQUEST),");
        p.line("    None,");
        p.line(");");
        p.close("}");
        p.close("},");
        p.close("}");
        p.close("};");
    } else {
        p.line(&format!("let mut request = {input_type}::default();"));
    }

    // Path variables.
    for path_var in &route.path_vars {
        let field = &input.fields[path_var.field];
        p.open(&format!(
            "request.{} = match ::proto_rest::parse_path_var(\"{}\", &raw_{}) {{",
            rust_field_ident(&field.name),
            str_lit(&path_var.var),
            path_var.var,
        ));
        p.line("Ok(value) => value,");
        p.line("Err(validation) => return ::proto_rest::respond_error(response_ct, &::proto_rest::HandlerError::typed(validation), None),");
        p.close("};");
    }

    // Query parameters.
    if !route.query_params.is_empty() {
        p.open("let query = match ::proto_rest::QueryMap::parse(raw_query.as_deref()) {");
        p.line("Ok(query) => query,");
        p.line("Err(validation) => return ::proto_rest::respond_error(response_ct, &::proto_rest::HandlerError::typed(validation), None),");
        p.close("};");
        for query_param in &route.query_params {
            let field = &input.fields[query_param.field];
            p.open(&format!(
                "match query.typed(\"{}\", {}) {{",
                str_lit(&query_param.name),
                query_param.required,
            ));
            if matches!(field.cardinality, Cardinality::Optional) {
                p.line(&format!(
                    "Ok(value) => request.{} = value,",
                    rust_field_ident(&field.name),
                ));
            } else {
                p.line(&format!(
                    "Ok(Some(value)) => request.{} = value,",
                    rust_field_ident(&field.name),
                ));
                p.line("Ok(None) => {}");
            }
            p.line("Err(validation) => return ::proto_rest::respond_error(response_ct, &::proto_rest::HandlerError::typed(validation), None),");
            p.close("}");
        }
    }

    // Body rules.
    if has_rules(input) {
        p.open(&format!(
            "if let Err(validation) = validate_{}(&request) {{",
            to_snake_case(&input_type),
        ));
        emit_respond_error(p, "response_ct", "::proto_rest::HandlerError::typed(validation)");
        p.close("}");
    }

    // Invoke and respond.
    p.open(&format!("match state.service.{snake_method}(request).await {{"));
    p.line("Ok(response) => ::proto_rest::respond(response_ct, &response),");
    p.open("Err(error) => {");
    p.line("let status = state.options.error_status.get(error.type_name()).copied();");
    p.line("::proto_rest::respond_error(response_ct, &error, status)");
    p.close("}");
    p.close("}");
    p.close("}");
}

// --- body rules ---

fn has_rules(input: &Message) -> bool {
    input.fields.iter().any(|f| f.rules.is_some())
}

fn emit_validate_fn(p: &mut Printer, input: &Message) {
    p.line("#[allow(clippy::cast_precision_loss)]");
    p.open(&format!(
        "fn validate_{}(request: &{}) -> Result<(), ::proto_rest::ValidationError> {{",
        to_snake_case(&input.type_name()),
        input.type_name(),
    ));
    p.line("let mut violations = Vec::new();");
    for field in &input.fields {
        let Some(rules) = &field.rules else { continue };
        emit_field_rules(p, field, rules);
    }
    p.open("if violations.is_empty() {");
    p.line("Ok(())");
    p.next("} else {");
    p.line("Err(::proto_rest::ValidationError::new(violations))");
    p.close("}");
    p.close("}");
}

fn emit_field_rules(p: &mut Printer, field: &Field, rules: &FieldRules) {
    let ident = rust_field_ident(&field.name);
    let name = str_lit(&field.name);

    if rules.required && matches!(field.cardinality, Cardinality::Optional) {
        p.line(&format!(
            "::proto_rest::rules::check_required(\"{name}\", &request.{ident}, &mut violations);",
        ));
    }

    if let Some(repeated) = &rules.repeated {
        let min = bound(repeated.has_min_items, repeated.min_items);
        let max = bound(repeated.has_max_items, repeated.max_items);
        p.line(&format!(
            "::proto_rest::rules::check_items(\"{name}\", request.{ident}.len(), {min}, {max}, &mut violations);",
        ));
    }

    if let Some(string_rules) = &rules.string {
        let optional = matches!(field.cardinality, Cardinality::Optional);
        let access = if optional {
            p.open(&format!("if let Some(value) = &request.{ident} {{"));
            "value".to_string()
        } else {
            format!("&request.{ident}")
        };
        if string_rules.min_len > 0 || string_rules.max_len > 0 {
            let min = bound(string_rules.min_len > 0, string_rules.min_len);
            let max = bound(string_rules.max_len > 0, string_rules.max_len);
            p.line(&format!(
                "::proto_rest::rules::check_len(\"{name}\", {access}, {min}, {max}, &mut violations);",
            ));
        }
        if !string_rules.pattern.is_empty() {
            p.line(&format!(
                "::proto_rest::rules::check_pattern(\"{name}\", {access}, \"{}\", &mut violations);",
                str_lit(&string_rules.pattern),
            ));
        }
        if !string_rules.r#in.is_empty() {
            let allowed: Vec<String> = string_rules
                .r#in
                .iter()
                .map(|v| format!("\"{}\"", str_lit(v)))
                .collect();
            p.line(&format!(
                "::proto_rest::rules::check_in(\"{name}\", {access}, &[{}], &mut violations);",
                allowed.join(", "),
            ));
        }
        if !string_rules.well_known.is_empty() {
            p.line(&format!(
                "::proto_rest::rules::check_well_known(\"{name}\", {access}, \"{}\", &mut violations);",
                str_lit(&string_rules.well_known),
            ));
        }
        if optional {
            p.close("}");
        }
    }

    if let Some(numeric) = &rules.numeric {
        let lower = if numeric.has_gte {
            format!("Some(({:?}, true))", numeric.gte)
        } else if numeric.has_gt {
            format!("Some(({:?}, false))", numeric.gt)
        } else {
            "None".to_string()
        };
        let upper = if numeric.has_lte {
            format!("Some(({:?}, true))", numeric.lte)
        } else if numeric.has_lt {
            format!("Some(({:?}, false))", numeric.lt)
        } else {
            "None".to_string()
        };
        if lower != "None" || upper != "None" {
            let optional = matches!(field.cardinality, Cardinality::Optional);
            let access = if optional {
                p.open(&format!("if let Some(value) = request.{ident} {{"));
                "value as f64".to_string()
            } else {
                format!("request.{ident} as f64")
            };
            p.line(&format!(
                "::proto_rest::rules::check_range(\"{name}\", {access}, {lower}, {upper}, &mut violations);",
            ));
            if optional {
                p.close("}");
            }
        }
    }
}

fn bound(set: bool, value: u64) -> String {
    if set {
        format!("Some({value})")
    } else {
        "None".to_string()
    }
}

// --- mock file ---

fn emit_mock(model: &Model, file: &File, base: &str) -> String {
    let mut p = Printer::new();
    file_header(&mut p, file, &format!("{base}_http.rs, {base}_http_binding.rs"));
    p.line(&format!("use super::{base}_http::*;"));
    p.line(&format!("use super::{base}_http_binding::*;"));
    p.line("");

    for service in &file.services {
        let name = &service.name;
        p.line(&format!("/// Mock `{name}` filling responses from `field_examples`."));
        p.line("///");
        p.line("/// Deterministic by default (first example wins); [`seeded`] picks");
        p.line("/// examples reproducibly for a given seed.");
        p.line("///");
        p.line(&format!("/// [`seeded`]: Mock{name}::seeded"));
        p.open(&format!("pub struct Mock{name} {{"));
        p.line("mock: ::std::sync::Mutex<::proto_rest::Mock>,");
        p.close("}");
        p.line("");
        p.open(&format!("impl Mock{name} {{"));
        p.line("/// Deterministic mock: first example wins, zero values elsewhere.");
        p.open("pub fn new() -> Self {");
        p.line("Self { mock: ::std::sync::Mutex::new(::proto_rest::Mock::deterministic()) }");
        p.close("}");
        p.line("");
        p.line("/// Reproducible pseudo-random example selection.");
        p.open("pub fn seeded(seed: u64) -> Self {");
        p.line("Self { mock: ::std::sync::Mutex::new(::proto_rest::Mock::seeded(seed)) }");
        p.close("}");
        p.close("}");
        p.line("");
        p.open(&format!("impl Default for Mock{name} {{"));
        p.open("fn default() -> Self {");
        p.line("Self::new()");
        p.close("}");
        p.close("}");
        p.line("");
        p.open(&format!("impl {name} for Mock{name} {{"));
        for method in &service.methods {
            let input_type = model
                .message(&method.input)
                .map_or_else(String::new, Message::type_name);
            let output_type = model
                .message(&method.output)
                .map_or_else(String::new, Message::type_name);
            p.open(&format!(
                "async fn {}(&self, _request: {input_type}) -> Result<{output_type}, ::proto_rest::HandlerError> {{",
                to_snake_case(&method.name),
            ));
            p.line("let mut mock = self.mock.lock().unwrap_or_else(::std::sync::PoisonError::into_inner);");
            p.line(&format!("let mut response = {output_type}::default();"));
            let mut assigned = false;
            if let Some(message) = model.message(&method.output) {
                for field in &message.fields {
                    if field.oneof_index.is_some() {
                        continue;
                    }
                    if let Some(assign) = mock_assignment(field) {
                        p.line(&assign);
                        assigned = true;
                    }
                }
            }
            if !assigned {
                p.line("let _ = &mut mock;");
            }
            p.line("Ok(response)");
            p.close("}");
        }
        p.close("}");
        p.line("");
    }

    p.finish()
}

/// Mock value assignment for a field, if it is a singular scalar (everything
/// else keeps its zero value).
fn mock_assignment(field: &Field) -> Option<String> {
    if !matches!(field.cardinality, Cardinality::Singular) {
        return None;
    }
    let examples: Vec<String> = field
        .examples
        .iter()
        .map(|e| format!("\"{}\"", str_lit(e)))
        .collect();
    let examples = examples.join(", ");
    let ident = rust_field_ident(&field.name);
    match field.kind {
        FieldKind::String => Some(format!("response.{ident} = mock.string(&[{examples}]);")),
        FieldKind::Double
        | FieldKind::Float
        | FieldKind::Int32
        | FieldKind::Int64
        | FieldKind::Uint32
        | FieldKind::Uint64
        | FieldKind::Bool => Some(format!("response.{ident} = mock.parsed(&[{examples}]);")),
        _ => None,
    }
}
