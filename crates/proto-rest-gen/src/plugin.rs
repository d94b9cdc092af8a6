//! Plugin protocol driver and standalone CLI mode.
//!
//! With no command-line arguments a binary speaks the protoc plugin
//! protocol: a serialized `CodeGeneratorRequest` on stdin, a serialized
//! `CodeGeneratorResponse` on stdout, diagnostics on stderr. Failures are
//! carried in the response's `error` field (the compiler prints it and
//! discards any partial output), and the process exits non-zero.
//!
//! With arguments, the binary runs standalone against a serialized
//! `FileDescriptorSet` file, writing generated files to an output directory.

use std::io::{Read, Write};

use prost::Message as _;
use proto_rest_core::plugin::{CodeGeneratorRequest, CodeGeneratorResponse, GeneratedFile};
use proto_rest_model::{validate, walk};

use crate::client::{generate_client, ClientGenConfig};
use crate::config::{GenerateError, Parameter, ServerGenConfig};
use crate::server::generate_server;
use crate::typescript::{generate_typescript, TsGenConfig};

/// Which back-end a binary drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// `protoc-gen-rest-server`
    Server,
    /// `protoc-gen-rest-client`
    Client,
    /// `protoc-gen-rest-ts`
    TypeScript,
}

/// Run the shared pipeline: parameters → walk → validate → emit.
///
/// # Errors
///
/// Returns [`GenerateError`] for malformed parameters, walk failures, or
/// violated annotation invariants.
pub fn generate(
    backend: Backend,
    request: &CodeGeneratorRequest,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let parameter = Parameter::parse(request.parameter_str())?;
    let model = walk(request)?;
    validate(&model)?;
    match backend {
        Backend::Server => generate_server(&model, &ServerGenConfig::from_parameter(&parameter)),
        Backend::Client => generate_client(&model, &ClientGenConfig::from_parameter(&parameter)),
        Backend::TypeScript => {
            generate_typescript(&model, &TsGenConfig::from_parameter(&parameter))
        }
    }
}

/// Speak the plugin protocol over the given streams.
///
/// Returns the process exit code: 0 when a file list was produced, 1 when
/// the response carries an error string.
///
/// # Errors
///
/// Returns `std::io::Error` only for transport failures on the streams;
/// generation failures become the response's `error` field.
pub fn run_plugin(
    backend: Backend,
    input: &mut impl Read,
    output: &mut impl Write,
) -> std::io::Result<i32> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;

    let response = match CodeGeneratorRequest::decode(buf.as_slice()) {
        Ok(request) => match generate(backend, &request) {
            Ok(files) => CodeGeneratorResponse::from_files(files),
            Err(e) => CodeGeneratorResponse::from_error(e.to_string()),
        },
        Err(e) => {
            CodeGeneratorResponse::from_error(format!("failed to decode CodeGeneratorRequest: {e}"))
        }
    };

    let exit = i32::from(response.error.is_some());
    output.write_all(&response.encode_to_vec())?;
    Ok(exit)
}

/// Standalone invocation against a descriptor-set file.
#[cfg(feature = "cli")]
#[derive(Debug, clap::Parser)]
pub struct StandaloneArgs {
    /// Path to a serialized `FileDescriptorSet` (`protoc -o descriptor.bin`).
    #[arg(short, long)]
    pub descriptor: std::path::PathBuf,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "gen")]
    pub out: std::path::PathBuf,

    /// Generate only these proto files (default: every file in the set).
    #[arg(long = "file")]
    pub files: Vec<String>,

    /// Plugin parameter string, e.g. `paths=import,generate_mock=true`.
    #[arg(short, long, default_value = "")]
    pub parameter: String,
}

/// Run a back-end standalone: read the descriptor set, generate, write files.
///
/// # Errors
///
/// Fails on unreadable inputs, generation errors, or unwritable outputs.
#[cfg(feature = "cli")]
pub fn run_standalone(backend: Backend, args: &StandaloneArgs) -> anyhow::Result<()> {
    use anyhow::Context as _;

    let bytes = std::fs::read(&args.descriptor)
        .with_context(|| format!("failed to read descriptor: {}", args.descriptor.display()))?;
    let fdset = proto_rest_core::descriptor::FileDescriptorSet::decode(bytes.as_slice())
        .context("failed to decode FileDescriptorSet")?;

    let file_to_generate = if args.files.is_empty() {
        fdset.file.iter().map(|f| f.name().to_string()).collect()
    } else {
        args.files.clone()
    };
    let request = CodeGeneratorRequest {
        file_to_generate,
        parameter: Some(args.parameter.clone()),
        proto_file: fdset.file,
    };

    let files = generate(backend, &request)?;
    for file in &files {
        let path = args.out.join(file.name());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, file.content())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    eprintln!("Wrote {} files to {}", files.len(), args.out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use proto_rest_core::descriptor::{
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto, MethodConfig,
        MethodDescriptorProto, MethodOptions, ServiceDescriptorProto,
    };
    use proto_rest_core::{field_label, field_type, HttpMethod};

    use super::*;

    fn request() -> CodeGeneratorRequest {
        let message = |name: &str, fields: Vec<FieldDescriptorProto>| DescriptorProto {
            name: Some(name.to_string()),
            field: fields,
            nested_type: vec![],
            enum_type: vec![],
            options: None,
            oneof_decl: vec![],
        };
        let string_field = |name: &str, number: i32| FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(field_label::OPTIONAL),
            r#type: Some(field_type::STRING),
            type_name: None,
            options: None,
            oneof_index: None,
            json_name: None,
            proto3_optional: None,
        };

        CodeGeneratorRequest {
            file_to_generate: vec!["shop.proto".to_string()],
            parameter: None,
            proto_file: vec![FileDescriptorProto {
                name: Some("shop.proto".to_string()),
                package: Some("shop.v1".to_string()),
                dependency: vec![],
                message_type: vec![
                    message("GetUserRequest", vec![string_field("id", 1)]),
                    message("User", vec![string_field("id", 1)]),
                ],
                enum_type: vec![],
                service: vec![ServiceDescriptorProto {
                    name: Some("UserService".to_string()),
                    method: vec![MethodDescriptorProto {
                        name: Some("GetUser".to_string()),
                        input_type: Some(".shop.v1.GetUserRequest".to_string()),
                        output_type: Some(".shop.v1.User".to_string()),
                        options: Some(MethodOptions {
                            config: Some(MethodConfig {
                                path: "/users/{id}".to_string(),
                                method: HttpMethod::Get as i32,
                            }),
                            method_headers: None,
                        }),
                        client_streaming: None,
                        server_streaming: None,
                    }],
                    options: None,
                }],
                source_code_info: None,
                syntax: Some("proto3".to_string()),
            }],
        }
    }

    #[test]
    fn end_to_end_server_pipeline() {
        let files = generate(Backend::Server, &request()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec!["shop_http.rs", "shop_http_config.rs", "shop_http_binding.rs"],
        );
    }

    #[test]
    fn end_to_end_typescript_pipeline() {
        let files = generate(Backend::TypeScript, &request()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name(), "shop_client.ts");
        assert!(files[0].content().contains("export class UserServiceClient"));
    }

    #[test]
    fn plugin_round_trip_over_streams() {
        let request_bytes = request().encode_to_vec();
        let mut input = request_bytes.as_slice();
        let mut output = Vec::new();

        let exit = run_plugin(Backend::Server, &mut input, &mut output).unwrap();
        assert_eq!(exit, 0);

        let response = CodeGeneratorResponse::decode(output.as_slice()).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.file.len(), 3);
    }

    #[test]
    fn invalid_annotation_becomes_response_error_and_exit_1() {
        let mut bad = request();
        // Path variable that matches no input field.
        bad.proto_file[0].service[0].method[0]
            .options
            .as_mut()
            .unwrap()
            .config
            .as_mut()
            .unwrap()
            .path = "/users/{missing}".to_string();

        let request_bytes = bad.encode_to_vec();
        let mut input = request_bytes.as_slice();
        let mut output = Vec::new();
        let exit = run_plugin(Backend::Server, &mut input, &mut output).unwrap();
        assert_eq!(exit, 1);

        let response = CodeGeneratorResponse::decode(output.as_slice()).unwrap();
        let error = response.error();
        assert!(error.contains("{missing}"), "actionable error: {error}");
        assert!(response.file.is_empty(), "no partial output on failure");
    }

    #[test]
    fn garbage_stdin_is_a_response_error() {
        let mut input: &[u8] = b"not a protobuf";
        let mut output = Vec::new();
        let exit = run_plugin(Backend::Client, &mut input, &mut output).unwrap();
        assert_eq!(exit, 1);
        let response = CodeGeneratorResponse::decode(output.as_slice()).unwrap();
        assert!(response.error().contains("CodeGeneratorRequest"));
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let mut bad = request();
        bad.parameter = Some("frobnicate=1".to_string());
        let err = generate(Backend::Server, &bad).unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn generate_mock_parameter_reaches_the_server_backend() {
        let mut with_mock = request();
        with_mock.parameter = Some("generate_mock=true".to_string());
        let files = generate(Backend::Server, &with_mock).unwrap();
        assert!(files.iter().any(|f| f.name() == "shop_http_mock.rs"));
    }
}
