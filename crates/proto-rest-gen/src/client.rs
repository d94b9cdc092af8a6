//! Rust client back-end.
//!
//! For each generate-flagged proto file this emits `<proto>_http.rs` (the
//! same types module the server back-end produces — byte-identical, so both
//! can land in one crate) and `<proto>_client.rs` with one reqwest-based
//! client per service: path substitution from request fields, query
//! parameters omitted at their proto zero value, content-type negotiation,
//! and non-2xx decoding through the shared error contract.

use proto_rest_core::plugin::GeneratedFile;
use proto_rest_model::{
    Cardinality, Field, FieldKind, File, Header, Message, Model, Route, Service,
};

use crate::config::{GenerateError, Parameter, PathsMode};
use crate::message_gen;
use crate::naming::{header_ident, rust_field_ident, str_lit, to_snake_case};
use crate::printer::Printer;

const TOOL: &str = "protoc-gen-rest-client";

/// Configuration for the client back-end.
#[derive(Debug, Clone, Default)]
pub struct ClientGenConfig {
    pub(crate) paths: PathsMode,
}

impl ClientGenConfig {
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

/// Generate the client files for every generate-flagged file in the model.
///
/// # Errors
///
/// Returns [`GenerateError`] if route derivation fails (possible only on an
/// unvalidated model).
pub fn generate_client(
    model: &Model,
    config: &ClientGenConfig,
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
            config.paths.output_path(file, &format!("{base}_client.rs")),
            emit_client(model, file, &base)?,
        ));
    }
    Ok(files)
}

fn emit_client(model: &Model, file: &File, base: &str) -> Result<String, GenerateError> {
    let mut p = Printer::new();
    p.line(&format!("// Code generated by {TOOL}. DO NOT EDIT."));
    p.line(&format!("// source: {}", file.name));
    p.line("//");
    p.line(&format!(
        "// Compile as a sibling module of the generated types: {base}_http.rs",
    ));
    p.line("");
    p.line("#![allow(clippy::all, clippy::pedantic)]");
    p.line("");
    p.line(&format!("use super::{base}_http::*;"));
    p.line("");

    for service in &file.services {
        emit_call_options(&mut p, service);
        p.line("");
        emit_service_client(&mut p, model, service)?;
        p.line("");
    }

    Ok(p.finish())
}

/// Declared headers across the service and its methods, deduplicated by
/// name in first-declared order. Each yields a helper on the call options
/// (and on the TypeScript client class).
pub(crate) fn declared_headers(service: &Service) -> Vec<&Header> {
    let mut headers: Vec<&Header> = Vec::new();
    for header in service
        .headers
        .iter()
        .chain(service.methods.iter().flat_map(|m| m.headers.iter()))
    {
        if header.name.is_empty() {
            continue;
        }
        if !headers.iter().any(|h| h.name == header.name) {
            headers.push(header);
        }
    }
    headers
}

fn emit_call_options(p: &mut Printer, service: &Service) {
    let name = &service.name;
    p.line(&format!("/// Per-call options for [`{name}Client`]."));
    p.line("#[derive(Clone, Default)]");
    p.open(&format!("pub struct {name}CallOptions {{"));
    p.line("content_type: Option<::proto_rest::ContentType>,");
    p.line("headers: ::reqwest::header::HeaderMap,");
    p.close("}");
    p.line("");
    p.open(&format!("impl {name}CallOptions {{"));
    p.line("/// Create empty options.");
    p.open("pub fn new() -> Self {");
    p.line("Self::default()");
    p.close("}");
    p.line("");
    p.line("/// Wire format for this call only.");
    p.open("pub fn content_type(mut self, content_type: ::proto_rest::ContentType) -> Self {");
    p.line("self.content_type = Some(content_type);");
    p.line("self");
    p.close("}");
    p.line("");
    p.line("/// Additional header for this call. Invalid names or values are");
    p.line("/// silently dropped rather than failing the call.");
    p.open("pub fn header(mut self, name: &str, value: &str) -> Self {");
    p.open("if let (Ok(name), Ok(value)) = (");
    p.line("name.parse::<::reqwest::header::HeaderName>(),");
    p.line("value.parse::<::reqwest::header::HeaderValue>(),");
    p.next(") {");
    p.line("self.headers.insert(name, value);");
    p.close("}");
    p.line("self");
    p.close("}");
    for header in declared_headers(service) {
        p.line("");
        if header.description.is_empty() {
            p.line(&format!("/// Set the `{}` header.", header.name));
        } else {
            p.line(&format!("/// Set the `{}` header: {}", header.name, header.description));
        }
        if header.deprecated {
            p.line("#[deprecated(note = \"the header is marked deprecated in the API definition\")]");
        }
        p.open(&format!(
            "pub fn with_{}(self, value: &str) -> Self {{",
            header_ident(&header.name),
        ));
        p.line(&format!("self.header(\"{}\", value)", str_lit(&header.name)));
        p.close("}");
    }
    p.close("}");
}

fn emit_service_client(p: &mut Printer, model: &Model, service: &Service) -> Result<(), GenerateError> {
    let name = &service.name;
    p.doc(&service.doc);
    if service.doc.is_empty() {
        p.line(&format!("/// HTTP client for `{name}`."));
    }
    p.open(&format!("pub struct {name}Client {{"));
    p.line("base_url: String,");
    p.line("http: ::reqwest::Client,");
    p.line("default_content_type: ::proto_rest::ContentType,");
    p.line("default_headers: ::reqwest::header::HeaderMap,");
    p.close("}");
    p.line("");
    p.open(&format!("impl {name}Client {{"));
    p.line("/// Create a client against `base_url` (scheme and authority; any");
    p.line("/// trailing slash is trimmed).");
    p.open("pub fn new(base_url: &str) -> Self {");
    p.open("Self {");
    p.line("base_url: base_url.trim_end_matches('/').to_string(),");
    p.line("http: ::reqwest::Client::new(),");
    p.line("default_content_type: ::proto_rest::ContentType::Json,");
    p.line("default_headers: ::reqwest::header::HeaderMap::new(),");
    p.close("}");
    p.close("}");
    p.line("");
    p.line("/// Use a preconfigured HTTP client (pools, proxies, TLS).");
    p.open("pub fn with_http_client(mut self, http: ::reqwest::Client) -> Self {");
    p.line("self.http = http;");
    p.line("self");
    p.close("}");
    p.line("");
    p.line("/// Wire format used when a call names none.");
    p.open("pub fn with_default_content_type(mut self, content_type: ::proto_rest::ContentType) -> Self {");
    p.line("self.default_content_type = content_type;");
    p.line("self");
    p.close("}");
    p.line("");
    p.line("/// Header sent on every call. Invalid names or values are silently");
    p.line("/// dropped.");
    p.open("pub fn with_default_header(mut self, name: &str, value: &str) -> Self {");
    p.open("if let (Ok(name), Ok(value)) = (");
    p.line("name.parse::<::reqwest::header::HeaderName>(),");
    p.line("value.parse::<::reqwest::header::HeaderValue>(),");
    p.next(") {");
    p.line("self.default_headers.insert(name, value);");
    p.close("}");
    p.line("self");
    p.close("}");

    for method in &service.methods {
        let Some(input) = model.message(&method.input) else {
            continue;
        };
        let route = Route::derive(service, method, input)?;
        p.line("");
        emit_method(p, model, service, method, input, &route);
    }
    p.close("}");
    Ok(())
}

fn emit_method(
    p: &mut Printer,
    model: &Model,
    service: &Service,
    method: &proto_rest_model::Method,
    input: &Message,
    route: &Route,
) {
    let name = &service.name;
    let snake = to_snake_case(&method.name);
    let input_type = input.type_name();
    let output_type = model
        .message(&method.output)
        .map_or_else(String::new, Message::type_name);

    p.doc(&method.doc);
    if method.doc.is_empty() {
        p.line(&format!("/// Call `{}.{}`.", service.name, method.name));
    }
    p.open(&format!(
        "pub async fn {snake}(&self, request: &{input_type}) -> Result<{output_type}, ::proto_rest::ClientError> {{",
    ));
    p.line(&format!(
        "self.{snake}_opts(request, &{name}CallOptions::default()).await",
    ));
    p.close("}");
    p.line("");

    p.line(&format!("/// `{}` with per-call options.", method.name));
    p.open(&format!(
        "pub async fn {snake}_opts(&self, request: &{input_type}, options: &{name}CallOptions) -> Result<{output_type}, ::proto_rest::ClientError> {{",
    ));
    p.line("let content_type = options.content_type.unwrap_or(self.default_content_type);");

    // URL with path variables substituted directly from request fields.
    let (template, args) = path_format(route, input);
    if args.is_empty() {
        p.line(&format!(
            "let url = format!(\"{{}}{}\", self.base_url);",
            str_lit(&template),
        ));
    } else {
        p.line(&format!(
            "let url = format!(\"{{}}{}\", self.base_url, {});",
            str_lit(&template),
            args.join(", "),
        ));
    }

    // Query parameters: serialized only when not at their proto zero value.
    if route.query_params.is_empty() {
        p.line("let query: Vec<(&str, String)> = Vec::new();");
    } else {
        p.line("let mut query: Vec<(&str, String)> = Vec::new();");
        for query_param in &route.query_params {
            let field = &input.fields[query_param.field];
            emit_query_push(p, field, &query_param.name);
        }
    }

    let verb = route.verb.as_verb().to_ascii_lowercase();
    p.line(&format!("let mut builder = self.http.{verb}(url);"));
    p.open("if !query.is_empty() {");
    p.line("builder = builder.query(&query);");
    p.close("}");
    p.line("builder = builder.headers(self.default_headers.clone());");
    p.line("builder = builder.headers(options.headers.clone());");
    p.line("builder = builder.header(::reqwest::header::ACCEPT, content_type.as_media_type());");

    if route.has_body() {
        p.open("builder = match content_type {");
        p.line("::proto_rest::ContentType::Json => builder.json(request),");
        p.line("::proto_rest::ContentType::Proto => builder");
        p.line("    .header(::reqwest::header::CONTENT_TYPE, ::proto_rest::ContentType::Proto.as_media_type())");
        p.line("    .body(::prost::Message::encode_to_vec(request)),");
        p.close("};");
    }

    p.line("let response = builder");
    p.line("    .send()");
    p.line("    .await");
    p.line("    .map_err(|e| ::proto_rest::ClientError::Transport(Box::new(e)))?;");
    p.line("let status = response.status();");
    p.line("let body = response");
    p.line("    .bytes()");
    p.line("    .await");
    p.line("    .map_err(|e| ::proto_rest::ClientError::Transport(Box::new(e)))?;");
    p.open("if !status.is_success() {");
    p.line("return Err(::proto_rest::decode_error_response(status.as_u16(), content_type, &body));");
    p.close("}");
    p.open("match content_type {");
    p.line("::proto_rest::ContentType::Json => ::serde_json::from_slice(&body)");
    p.line("    .map_err(|e| ::proto_rest::ClientError::Decode(e.to_string())),");
    p.line("::proto_rest::ContentType::Proto => ::prost::Message::decode(body.as_ref())");
    p.line("    .map_err(|e| ::proto_rest::ClientError::Decode(e.to_string())),");
    p.close("}");
    p.close("}");
}

/// Split a route path into a `format!` template plus the substituted field
/// accesses, in template order.
fn path_format(route: &Route, input: &Message) -> (String, Vec<String>) {
    let mut template = String::new();
    let mut args = Vec::new();
    let mut rest = route.path.as_str();
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        template.push_str(&rest[..start]);
        template.push_str("{}");
        let var = &rest[start + 1..start + end];
        if let Some(path_var) = route.path_vars.iter().find(|pv| pv.var == var) {
            let field = &input.fields[path_var.field];
            let ident = rust_field_ident(&field.name);
            if matches!(field.cardinality, Cardinality::Optional) {
                args.push(format!("request.{ident}.clone().unwrap_or_default()"));
            } else {
                args.push(format!("request.{ident}"));
            }
        }
        rest = &rest[start + end + 1..];
    }
    template.push_str(rest);
    (template, args)
}

/// Push a query pair unless the field sits at its proto zero value.
fn emit_query_push(p: &mut Printer, field: &Field, wire_name: &str) {
    let ident = rust_field_ident(&field.name);
    let name = str_lit(wire_name);
    if matches!(field.cardinality, Cardinality::Optional) {
        p.open(&format!("if let Some(value) = &request.{ident} {{"));
        p.line(&format!("query.push((\"{name}\", value.to_string()));"));
        p.close("}");
        return;
    }
    match field.kind {
        FieldKind::String => {
            p.open(&format!("if !request.{ident}.is_empty() {{"));
            p.line(&format!("query.push((\"{name}\", request.{ident}.clone()));"));
            p.close("}");
        }
        FieldKind::Bool => {
            p.open(&format!("if request.{ident} {{"));
            p.line(&format!("query.push((\"{name}\", request.{ident}.to_string()));"));
            p.close("}");
        }
        FieldKind::Double | FieldKind::Float => {
            p.open(&format!("if request.{ident} != 0.0 {{"));
            p.line(&format!("query.push((\"{name}\", request.{ident}.to_string()));"));
            p.close("}");
        }
        _ => {
            p.open(&format!("if request.{ident} != 0 {{"));
            p.line(&format!("query.push((\"{name}\", request.{ident}.to_string()));"));
            p.close("}");
        }
    }
}

#[cfg(test)]
mod tests {
    use proto_rest_core::HttpMethod;
    use proto_rest_model::{
        EncodingPolicy, File as ModelFile, HeaderType, Method, QueryBinding,
    };

    use super::*;

    fn field(name: &str, number: i32, kind: FieldKind) -> Field {
        Field {
            name: name.to_string(),
            json_name: crate::naming::to_camel_case(name),
            number,
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

    fn user_model() -> Model {
        let mut get_user_request = message(
            "shop.v1.GetUserRequest",
            vec![
                field("id", 1, FieldKind::String),
                field("page", 2, FieldKind::Int32),
            ],
        );
        get_user_request.fields[1].query = Some(QueryBinding::default());
        let user = message("shop.v1.User", vec![field("id", 1, FieldKind::String)]);
        let create_user_request = message(
            "shop.v1.CreateUserRequest",
            vec![field("name", 1, FieldKind::String)],
        );

        let service = Service {
            name: "UserService".to_string(),
            base_path: "/api/v1".to_string(),
            methods: vec![
                Method {
                    name: "GetUser".to_string(),
                    verb: HttpMethod::Get,
                    path: "/users/{id}".to_string(),
                    input: "shop.v1.GetUserRequest".to_string(),
                    output: "shop.v1.User".to_string(),
                    headers: vec![Header {
                        name: "X-Api-Key".to_string(),
                        description: "API key".to_string(),
                        ty: HeaderType::String,
                        format: None,
                        required: true,
                        example: None,
                        deprecated: false,
                    }],
                    doc: String::new(),
                },
                Method {
                    name: "CreateUser".to_string(),
                    verb: HttpMethod::Post,
                    path: "/users".to_string(),
                    input: "shop.v1.CreateUserRequest".to_string(),
                    output: "shop.v1.User".to_string(),
                    headers: vec![],
                    doc: String::new(),
                },
            ],
            headers: vec![],
            doc: String::new(),
        };

        let file = ModelFile {
            name: "shop.proto".to_string(),
            package: "shop.v1".to_string(),
            generate: true,
            messages: vec![
                "shop.v1.GetUserRequest".to_string(),
                "shop.v1.User".to_string(),
                "shop.v1.CreateUserRequest".to_string(),
            ],
            enums: vec![],
            services: vec![service],
        };

        Model::new(
            vec![file],
            vec![get_user_request, user, create_user_request],
            vec![],
        )
    }

    fn client_code(model: &Model) -> String {
        let files = generate_client(model, &ClientGenConfig::new()).unwrap();
        files
            .iter()
            .find(|f| f.name() == "shop_client.rs")
            .expect("client file")
            .content()
            .to_string()
    }

    #[test]
    fn emits_types_and_client_files() {
        let model = user_model();
        let files = generate_client(&model, &ClientGenConfig::new()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["shop_http.rs", "shop_client.rs"]);
    }

    #[test]
    fn types_file_matches_server_output() {
        let model = user_model();
        let client_files = generate_client(&model, &ClientGenConfig::new()).unwrap();
        let server_files =
            crate::server::generate_server(&model, &crate::config::ServerGenConfig::new()).unwrap();
        let client_types = client_files.iter().find(|f| f.name() == "shop_http.rs").unwrap();
        let server_types = server_files.iter().find(|f| f.name() == "shop_http.rs").unwrap();
        // Identical apart from the generator named in the header.
        assert_eq!(
            client_types.content().replace(TOOL, "TOOL"),
            server_types.content().replace("protoc-gen-rest-server", "TOOL"),
        );
    }

    #[test]
    fn client_substitutes_path_and_omits_zero_query() {
        let model = user_model();
        let code = client_code(&model);
        assert!(code.contains("pub struct UserServiceClient"));
        assert!(code.contains("pub async fn get_user(&self, request: &GetUserRequest)"));
        assert!(code.contains("format!(\"{}/api/v1/users/{}\", self.base_url, request.id)"));
        assert!(code.contains("if request.page != 0 {"));
        assert!(code.contains("query.push((\"page\", request.page.to_string()));"));
        syn::parse_file(&code).expect("client should be valid Rust");
    }

    #[test]
    fn post_method_sends_body_in_both_formats() {
        let model = user_model();
        let code = client_code(&model);
        let create = &code[code.find("pub async fn create_user_opts").unwrap()..];
        assert!(create.contains("builder.json(request)"));
        assert!(create.contains("encode_to_vec(request)"));
        assert!(create.contains("ACCEPT"));
    }

    #[test]
    fn declared_header_yields_helper() {
        let model = user_model();
        let code = client_code(&model);
        assert!(code.contains("pub fn with_api_key(self, value: &str) -> Self"));
        assert!(code.contains("self.header(\"X-Api-Key\", value)"));
    }

    #[test]
    fn non_2xx_goes_through_shared_error_decoding() {
        let model = user_model();
        let code = client_code(&model);
        assert!(code.contains("decode_error_response(status.as_u16(), content_type, &body)"));
    }

    #[test]
    fn deterministic_output() {
        let model = user_model();
        assert_eq!(client_code(&model), client_code(&model));
    }
}
