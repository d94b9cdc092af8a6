//! OpenAPI 3.1 codegen plugin.
//!
//! With no arguments, speaks the protoc plugin protocol on stdin/stdout
//! (`format=yaml|json` via the plugin parameter). With arguments, runs
//! standalone against a serialized `FileDescriptorSet`:
//!
//! ```text
//! protoc-gen-rest-openapi --descriptor descriptor.bin --out api/ \
//!     --parameter format=json
//! ```

#![forbid(unsafe_code)]

use std::io::{Read as _, Write as _};

use anyhow::Context as _;
use clap::Parser as _;
use prost::Message as _;
use proto_rest_core::plugin::{CodeGeneratorRequest, CodeGeneratorResponse, GeneratedFile};
use proto_rest_gen::{GenerateError, Parameter, StandaloneArgs};
use proto_rest_openapi::{generate_openapi, OpenapiGenConfig};

fn main() -> anyhow::Result<()> {
    if std::env::args().len() > 1 {
        return run_standalone(&StandaloneArgs::parse());
    }

    let mut buf = Vec::new();
    std::io::stdin().lock().read_to_end(&mut buf)?;
    let response = match CodeGeneratorRequest::decode(buf.as_slice()) {
        Ok(request) => match generate(&request) {
            Ok(files) => CodeGeneratorResponse::from_files(files),
            Err(e) => CodeGeneratorResponse::from_error(e.to_string()),
        },
        Err(e) => {
            CodeGeneratorResponse::from_error(format!("failed to decode CodeGeneratorRequest: {e}"))
        }
    };
    let exit = i32::from(response.error.is_some());
    std::io::stdout().lock().write_all(&response.encode_to_vec())?;
    std::process::exit(exit);
}

/// The shared pipeline: parameters → walk → validate → emit documents.
fn generate(request: &CodeGeneratorRequest) -> Result<Vec<GeneratedFile>, GenerateError> {
    let parameter = Parameter::parse(request.parameter_str())?;
    let model = proto_rest_model::walk(request)?;
    proto_rest_model::validate(&model)?;
    generate_openapi(&model, &OpenapiGenConfig::from_parameter(&parameter))
}

fn run_standalone(args: &StandaloneArgs) -> anyhow::Result<()> {
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

    let files = generate(&request)?;
    for file in &files {
        let path = args.out.join(file.name());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, file.content())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    eprintln!("Wrote {} documents to {}", files.len(), args.out.display());
    Ok(())
}
