#![allow(clippy::doc_markdown)] // README uses "TypeScript" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod config;
mod message_gen;
mod naming;
mod plugin;
mod printer;
mod server;
mod typescript;

pub use client::{generate_client, ClientGenConfig};
pub use config::{GenerateError, Parameter, PathsMode, ServerGenConfig};
#[cfg(feature = "cli")]
pub use plugin::{run_standalone, StandaloneArgs};
pub use plugin::{generate, run_plugin, Backend};
pub use server::generate_server;
pub use typescript::{generate_typescript, TsGenConfig};
