#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod document;
mod schema;

pub use config::OpenapiGenConfig;
pub use document::generate_openapi;

/// `snake_case` → `PascalCase`, for variant schema names.
pub(crate) fn naming_pascal(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}
