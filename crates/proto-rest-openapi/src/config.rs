//! Configuration for the OpenAPI back-end.

use proto_rest_gen::Parameter;

/// Configuration for [`generate_openapi`](crate::generate_openapi).
#[derive(Debug, Clone, Default)]
pub struct OpenapiGenConfig {
    pub(crate) json_format: bool,
}

impl OpenapiGenConfig {
    /// Create a config with defaults (YAML output).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `.openapi.json` documents instead of YAML.
    #[must_use]
    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Build from a parsed plugin parameter string (`format=yaml|json`).
    #[must_use]
    pub fn from_parameter(parameter: &Parameter) -> Self {
        Self {
            json_format: parameter.json_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_yaml() {
        assert!(!OpenapiGenConfig::new().json_format);
    }

    #[test]
    fn format_parameter_switches_to_json() {
        let parameter = Parameter::parse("format=json").unwrap();
        assert!(OpenapiGenConfig::from_parameter(&parameter).json_format);
    }
}
