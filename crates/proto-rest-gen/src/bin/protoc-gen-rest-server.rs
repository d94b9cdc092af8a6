//! HTTP server codegen plugin.
//!
//! With no arguments, speaks the protoc plugin protocol on stdin/stdout.
//! With arguments, runs standalone against a serialized `FileDescriptorSet`:
//!
//! ```text
//! protoc-gen-rest-server --descriptor descriptor.bin --out gen/ \
//!     --parameter generate_mock=true
//! ```

#![forbid(unsafe_code)]

use clap::Parser as _;
use proto_rest_gen::{run_plugin, run_standalone, Backend, StandaloneArgs};

fn main() -> anyhow::Result<()> {
    if std::env::args().len() > 1 {
        return run_standalone(Backend::Server, &StandaloneArgs::parse());
    }
    let exit = run_plugin(
        Backend::Server,
        &mut std::io::stdin().lock(),
        &mut std::io::stdout().lock(),
    )?;
    std::process::exit(exit);
}
