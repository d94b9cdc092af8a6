//! Back-end configuration and plugin parameter parsing.

use proto_rest_model::{File, RouteError, ValidateError, WalkError};

/// Error returned by the generators.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// The plugin request did not decode as a `CodeGeneratorRequest`.
    #[error("failed to decode CodeGeneratorRequest: {0}")]
    RequestDecode(#[from] prost::DecodeError),

    /// The descriptor walk failed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// An annotation invariant is violated.
    #[error(transparent)]
    Validate(#[from] ValidateError),

    /// Route derivation failed during emission (an unvalidated model).
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A document failed to serialize (OpenAPI back-end).
    #[error("failed to render document: {0}")]
    Render(String),

    /// An unrecognized or malformed plugin parameter.
    #[error("unrecognized plugin parameter '{parameter}'")]
    Parameter {
        /// The offending `key=value` pair.
        parameter: String,
    },
}

/// Generated-file path layout, from the `paths` plugin parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathsMode {
    /// Outputs mirror the proto file's directory (`shop/v1/shop.proto` →
    /// `shop/v1/shop_http.rs`). The default.
    #[default]
    SourceRelative,
    /// Outputs land in directories derived from the proto package
    /// (`package shop.v1` → `shop/v1/shop_http.rs` regardless of the source
    /// layout).
    Import,
}

impl PathsMode {
    /// Output path for `file_name` emitted next to proto file `file`.
    pub(crate) fn output_path(self, file: &File, file_name: &str) -> String {
        match self {
            Self::SourceRelative => match file.name.rsplit_once('/') {
                Some((dir, _)) => format!("{dir}/{file_name}"),
                None => file_name.to_string(),
            },
            Self::Import => {
                if file.package.is_empty() {
                    file_name.to_string()
                } else {
                    format!("{}/{file_name}", file.package.replace('.', "/"))
                }
            }
        }
    }
}

/// Parsed plugin parameter string (comma-separated `key=value` pairs).
#[derive(Debug, Clone, Default)]
pub struct Parameter {
    /// `paths=source_relative|import`.
    pub paths: PathsMode,
    /// `format=yaml|json` (OpenAPI plugin only); `true` means JSON.
    pub json_format: bool,
    /// `generate_mock=true|false` (server plugin only).
    pub generate_mock: bool,
}

impl Parameter {
    /// Parse a request's parameter string. Empty segments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Parameter`] on an unknown key or a malformed
    /// value for a known key.
    pub fn parse(raw: &str) -> Result<Self, GenerateError> {
        let mut parameter = Self::default();
        for segment in raw.split(',').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            match (key, value) {
                ("paths", "source_relative") => parameter.paths = PathsMode::SourceRelative,
                ("paths", "import") => parameter.paths = PathsMode::Import,
                ("format", "yaml") => parameter.json_format = false,
                ("format", "json") => parameter.json_format = true,
                ("generate_mock", "true") => parameter.generate_mock = true,
                ("generate_mock", "false") => parameter.generate_mock = false,
                _ => {
                    return Err(GenerateError::Parameter {
                        parameter: segment.to_string(),
                    })
                }
            }
        }
        Ok(parameter)
    }
}

/// Configuration for the HTTP server back-end.
///
/// # Examples
///
/// ```ignore
/// let config = ServerGenConfig::new().generate_mock(true);
/// let files = proto_rest_gen::generate_server(&model, &config)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServerGenConfig {
    pub(crate) paths: PathsMode,
    pub(crate) generate_mock: bool,
}

impl ServerGenConfig {
    /// Create a config with defaults (`paths=source_relative`, no mock).
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

    /// Also emit a deterministic mock implementation per service.
    #[must_use]
    pub fn generate_mock(mut self, enabled: bool) -> Self {
        self.generate_mock = enabled;
        self
    }

    pub(crate) fn from_parameter(parameter: &Parameter) -> Self {
        Self {
            paths: parameter.paths,
            generate_mock: parameter.generate_mock,
        }
    }
}
